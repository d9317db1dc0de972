//! # Domain Models
//!
//! These structs represent the core entities of Fabriq.
//! We use UUID v7 for time-ordered, globally unique identification.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single catalogued piece of clothing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClothingItem {
    pub id: Uuid,
    /// Identifier minted by the external identity provider. Immutable after
    /// creation; update patches cannot touch it.
    pub owner_id: String,
    pub name: String,
    /// Free-text category label. Legacy spellings from the first schema
    /// version ("Shirts", "jackets", ...) are tolerated here and resolved
    /// through the category registry wherever classification matters.
    pub category: String,
    /// Locator produced by the media store; raw bytes are never stored here.
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

/// Partial update for a clothing item. `None` fields are left untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClothingItemPatch {
    pub name: Option<String>,
    pub category: Option<String>,
    pub image_url: Option<String>,
}

/// A named grouping of clothing-item references.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Outfit {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    /// May reference items deleted after the outfit was saved; the
    /// materialization step tolerates the dangling entries.
    pub item_ids: Vec<Uuid>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Caller-supplied fields for creating an outfit.
#[derive(Debug, Clone, Deserialize)]
pub struct OutfitDraft {
    pub name: String,
    #[serde(default)]
    pub item_ids: Vec<Uuid>,
    pub notes: Option<String>,
}

/// Partial update for an outfit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutfitPatch {
    pub name: Option<String>,
    pub item_ids: Option<Vec<Uuid>>,
    pub notes: Option<String>,
}

/// One record of the wardrobe snapshot handed to the stylist.
///
/// Deliberately lenient on deserialize: the selection call instructs the
/// model to copy these objects back verbatim, but partially-shaped output
/// must still parse instead of poisoning the whole candidate list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WardrobeEntry {
    #[serde(default)]
    pub id: Option<Uuid>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image_url: String,
}

impl From<&ClothingItem> for WardrobeEntry {
    fn from(item: &ClothingItem) -> Self {
        Self {
            id: Some(item.id),
            name: item.name.clone(),
            category: item.category.clone(),
            image_url: item.image_url.clone(),
        }
    }
}

/// Result of one stylist run. Consumed immediately by the UI, never stored.
#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    /// The inspiration image, re-encoded as a data URI for display.
    pub inspiration_image: String,
    pub prompt: String,
    /// Exactly three entries, one per role bucket, in display order.
    pub items: Vec<WardrobeEntry>,
}
