//! # Outfit Validation & Materialization
//!
//! Draft validation runs before any store mutation; materialization turns
//! an outfit's id references back into full clothing items.

use uuid::Uuid;

use crate::categories::normalize;
use crate::error::{AppError, FieldError, Result};
use crate::models::{ClothingItem, OutfitDraft, OutfitPatch};
use crate::traits::WardrobeRepo;

/// Field-level validation for a new outfit.
pub fn validate_draft(draft: &OutfitDraft) -> Result<()> {
    let mut errors = Vec::new();
    if draft.name.trim().is_empty() {
        errors.push(FieldError::new("name", "outfit name must not be empty"));
    }
    if draft.item_ids.is_empty() {
        errors.push(FieldError::new(
            "item_ids",
            "an outfit needs at least one clothing item",
        ));
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Field-level validation for an outfit update. Absent fields are fine;
/// present fields must still satisfy the creation rules.
pub fn validate_patch(patch: &OutfitPatch) -> Result<()> {
    let mut errors = Vec::new();
    if let Some(name) = &patch.name {
        if name.trim().is_empty() {
            errors.push(FieldError::new("name", "outfit name must not be empty"));
        }
    }
    if let Some(item_ids) = &patch.item_ids {
        if item_ids.is_empty() {
            errors.push(FieldError::new(
                "item_ids",
                "an outfit needs at least one clothing item",
            ));
        }
    }
    if errors.is_empty() {
        Ok(())
    } else {
        Err(AppError::Validation(errors))
    }
}

/// Resolves an outfit's item references against the wardrobe store.
///
/// References whose target was deleted after the outfit was saved are
/// silently omitted rather than failing the whole fetch. The per-id reads
/// carry no ordering guarantee, so the surviving items are re-sorted by
/// registry display order.
pub async fn materialize_items(
    repo: &dyn WardrobeRepo,
    item_ids: &[Uuid],
) -> anyhow::Result<Vec<ClothingItem>> {
    let mut items = Vec::with_capacity(item_ids.len());
    for id in item_ids {
        if let Some(item) = repo.get_item(*id).await? {
            items.push(item);
        }
    }
    items.sort_by_key(|item| normalize(Some(&item.category)).sort_order);
    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ClothingItemPatch;
    use async_trait::async_trait;
    use chrono::Utc;

    #[test]
    fn draft_validation_reports_every_bad_field() {
        let draft = OutfitDraft {
            name: "  ".to_string(),
            item_ids: vec![],
            notes: None,
        };
        let err = validate_draft(&draft).unwrap_err();
        match err {
            AppError::Validation(fields) => {
                assert_eq!(fields.len(), 2);
                assert_eq!(fields[0].field, "name");
                assert_eq!(fields[1].field, "item_ids");
            }
            other => panic!("expected validation error, got {other:?}"),
        }

        let ok = OutfitDraft {
            name: "Friday Night".to_string(),
            item_ids: vec![Uuid::now_v7()],
            notes: Some("rooftop bar".to_string()),
        };
        assert!(validate_draft(&ok).is_ok());
    }

    #[test]
    fn patch_validation_only_checks_present_fields() {
        assert!(validate_patch(&OutfitPatch::default()).is_ok());
        let patch = OutfitPatch {
            item_ids: Some(vec![]),
            ..Default::default()
        };
        assert!(matches!(
            validate_patch(&patch).unwrap_err(),
            AppError::Validation(_)
        ));
    }

    /// Minimal in-memory repo: knows a fixed set of items, everything else
    /// reads as deleted.
    struct FixedRepo(Vec<ClothingItem>);

    #[async_trait]
    impl WardrobeRepo for FixedRepo {
        async fn list_items(&self, _owner_id: &str) -> anyhow::Result<Vec<ClothingItem>> {
            Ok(self.0.clone())
        }
        async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<ClothingItem>> {
            Ok(self.0.iter().find(|i| i.id == id).cloned())
        }
        async fn create_item(&self, item: ClothingItem) -> anyhow::Result<ClothingItem> {
            Ok(item)
        }
        async fn update_item(
            &self,
            _id: Uuid,
            _patch: ClothingItemPatch,
        ) -> anyhow::Result<Option<ClothingItem>> {
            Ok(None)
        }
        async fn delete_item(&self, _id: Uuid) -> anyhow::Result<()> {
            Ok(())
        }
    }

    fn item(n: u128, category: &str) -> ClothingItem {
        ClothingItem {
            id: Uuid::from_u128(n),
            owner_id: "user-1".to_string(),
            name: format!("item-{n}"),
            category: category.to_string(),
            image_url: format!("/media/{n}"),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn materialization_omits_dangling_refs() {
        let a = item(1, "Shirts");
        let c = item(3, "Shoes");
        let repo = FixedRepo(vec![a.clone(), c.clone()]);

        // Item 2 was deleted after the outfit was created.
        let ids = [Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)];
        let items = materialize_items(&repo, &ids).await.unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].id, a.id);
        assert_eq!(items[1].id, c.id);
    }

    #[tokio::test]
    async fn materialization_resorts_by_display_order() {
        let shoes = item(1, "Shoes");
        let top = item(2, "shirts");
        let hat = item(3, "Hats");
        let repo = FixedRepo(vec![shoes.clone(), top.clone(), hat.clone()]);

        let ids = [shoes.id, top.id, hat.id];
        let items = materialize_items(&repo, &ids).await.unwrap();

        // Hats(1) < tops(2) < shoes(6) per registry order.
        assert_eq!(items[0].id, hat.id);
        assert_eq!(items[1].id, top.id);
        assert_eq!(items[2].id, shoes.id);
    }
}
