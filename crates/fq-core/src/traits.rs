//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{ClothingItem, ClothingItemPatch, Outfit, OutfitPatch};

/// Persistence contract for the clothing-item collection.
///
/// Every call may fail (network, store errors); such failures propagate to
/// the caller without retry.
#[async_trait]
pub trait WardrobeRepo: Send + Sync {
    async fn list_items(&self, owner_id: &str) -> anyhow::Result<Vec<ClothingItem>>;
    async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<ClothingItem>>;
    async fn create_item(&self, item: ClothingItem) -> anyhow::Result<ClothingItem>;
    /// Applies the patch and returns the updated record, or `None` when the
    /// item does not exist.
    async fn update_item(&self, id: Uuid, patch: ClothingItemPatch)
        -> anyhow::Result<Option<ClothingItem>>;
    async fn delete_item(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Persistence contract for saved outfits.
#[async_trait]
pub trait OutfitRepo: Send + Sync {
    async fn list_outfits(&self, owner_id: &str) -> anyhow::Result<Vec<Outfit>>;
    async fn get_outfit(&self, id: Uuid) -> anyhow::Result<Option<Outfit>>;
    async fn create_outfit(&self, outfit: Outfit) -> anyhow::Result<Outfit>;
    async fn update_outfit(&self, id: Uuid, patch: OutfitPatch) -> anyhow::Result<Option<Outfit>>;
    async fn delete_outfit(&self, id: Uuid) -> anyhow::Result<()>;
}

/// Media storage contract for wardrobe photos.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Saves raw bytes and returns a stable media_id for the item model.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String>;
    /// Returns the URL or path to the original photo.
    fn get_url(&self, media_id: &str) -> String;
    /// Returns the URL or path to the thumbnail used by the wardrobe grid.
    fn get_thumbnail_url(&self, media_id: &str) -> String;
}

/// One part of a chat message. The caption call mixes an image with text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Text(String),
    ImageUrl(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatMessage {
    pub role: String,
    pub parts: Vec<MessagePart>,
}

impl ChatMessage {
    pub fn text(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![MessagePart::Text(content.into())],
        }
    }

    pub fn with_image(role: &str, image_url: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.to_string(),
            parts: vec![
                MessagePart::ImageUrl(image_url.into()),
                MessagePart::Text(content.into()),
            ],
        }
    }
}

/// Vision-capable chat contract. One implementation serves both stylist
/// calls (caption, then selection).
#[async_trait]
pub trait ChatModel: Send + Sync {
    async fn chat(&self, messages: Vec<ChatMessage>) -> anyhow::Result<String>;
}
