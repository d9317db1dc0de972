//! fabriq/crates/fq-core/src/lib.rs
//!
//! The central domain logic and interface definitions for Fabriq.

pub mod auth;
pub mod categories;
pub mod error;
pub mod models;
pub mod outfits;
pub mod stylist;
pub mod traits;

// Re-exporting for easier access in other crates
pub use error::*;
pub use models::*;
pub use traits::*;

#[cfg(test)]
mod tests {
    use super::models::*;
    use uuid::Uuid;

    #[test]
    fn test_item_creation_v7() {
        let id = Uuid::now_v7();
        let item = ClothingItem {
            id,
            owner_id: "user-1".to_string(),
            name: "Red Hoodie".to_string(),
            category: "Tops".to_string(),
            image_url: "/static/uploads/ab/cd/abcd".to_string(),
            created_at: chrono::Utc::now(),
        };
        assert_eq!(item.id, id);
        assert_eq!(item.owner_id, "user-1");
    }
}
