//! # Category Registry
//!
//! Single source of truth mapping arbitrary category strings (current
//! canonical names, legacy names, or garbage) to exactly one canonical
//! category, plus a stable display order for grouped views.

use serde::Serialize;

/// A canonical clothing category. The registry is fixed at build time and
/// totally ordered by `sort_order`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CanonicalCategory {
    pub id: &'static str,
    pub name: &'static str,
    pub icon: &'static str,
    pub sort_order: u8,
}

pub const CLOTHING_CATEGORIES: [CanonicalCategory; 7] = [
    CanonicalCategory { id: "hats", name: "Hats", icon: "🎩", sort_order: 1 },
    CanonicalCategory { id: "tops", name: "Tops", icon: "👕", sort_order: 2 },
    CanonicalCategory { id: "outerwear", name: "Outerwear", icon: "🧥", sort_order: 3 },
    CanonicalCategory { id: "bottoms", name: "Bottoms", icon: "👖", sort_order: 4 },
    CanonicalCategory { id: "dresses", name: "Dresses", icon: "👗", sort_order: 5 },
    CanonicalCategory { id: "shoes", name: "Shoes", icon: "👟", sort_order: 6 },
    CanonicalCategory { id: "accessories", name: "Accessories", icon: "👜", sort_order: 7 },
];

/// Category strings from the first schema version and where they map now.
const LEGACY_ALIASES: [(&str, &str); 5] = [
    ("shirts", "tops"),
    ("jackets", "outerwear"),
    ("pants", "bottoms"),
    ("shorts", "bottoms"),
    ("other", "accessories"),
];

/// The catch-all category. Historical data may carry strings from an older
/// schema; display code must never have to branch on an unknown category.
fn default_category() -> &'static CanonicalCategory {
    &CLOTHING_CATEGORIES[6]
}

fn by_id(id: &str) -> Option<&'static CanonicalCategory> {
    CLOTHING_CATEGORIES.iter().find(|c| c.id == id)
}

/// Resolves any category string to exactly one canonical category.
///
/// Total function: empty/absent input, legacy aliases, and garbage all map
/// to something; there is no error path.
pub fn normalize(raw: Option<&str>) -> &'static CanonicalCategory {
    let raw = match raw {
        Some(r) if !r.trim().is_empty() => r.trim(),
        _ => return default_category(),
    };

    let lowered = raw.to_lowercase();

    if let Some(cat) = CLOTHING_CATEGORIES
        .iter()
        .find(|c| c.name.to_lowercase() == lowered)
    {
        return cat;
    }

    if let Some((_, id)) = LEGACY_ALIASES.iter().find(|(legacy, _)| *legacy == lowered) {
        if let Some(cat) = by_id(id) {
            return cat;
        }
    }

    default_category()
}

/// Registry entries ordered by `sort_order` ascending.
pub fn sorted_categories() -> Vec<&'static CanonicalCategory> {
    let mut cats: Vec<_> = CLOTHING_CATEGORIES.iter().collect();
    cats.sort_by_key(|c| c.sort_order);
    cats
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_is_total() {
        // Garbage, empty, None, and mixed case all resolve to exactly one
        // canonical category.
        assert_eq!(normalize(None).id, "accessories");
        assert_eq!(normalize(Some("")).id, "accessories");
        assert_eq!(normalize(Some("   ")).id, "accessories");
        assert_eq!(normalize(Some("flux capacitor")).id, "accessories");
        assert_eq!(normalize(Some("ToPs")).id, "tops");
        assert_eq!(normalize(Some("  Shoes ")).id, "shoes");
    }

    #[test]
    fn legacy_aliases_map_to_canonical() {
        assert_eq!(normalize(Some("shirts")), normalize(Some("Tops")));
        assert_eq!(normalize(Some("jackets")), normalize(Some("Outerwear")));
        assert_eq!(normalize(Some("pants")), normalize(Some("shorts")));
        assert_eq!(normalize(Some("Pants")).id, "bottoms");
        assert_eq!(normalize(Some("other")).id, "accessories");
    }

    #[test]
    fn sorted_categories_follow_sort_order() {
        let cats = sorted_categories();
        assert_eq!(cats.len(), 7);
        assert!(cats.windows(2).all(|w| w[0].sort_order < w[1].sort_order));
        assert_eq!(cats[0].id, "hats");
        assert_eq!(cats[6].id, "accessories");
    }
}
