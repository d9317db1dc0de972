//! # fq-db-sqlite Implementation
//!
//! Data mapping between the SQLite relational model and the `fq-core`
//! domain models. Implements both `WardrobeRepo` and `OutfitRepo` so the
//! binary can share one pool between them.

use std::str::FromStr;

use async_trait::async_trait;
use fq_core::models::{ClothingItem, ClothingItemPatch, Outfit, OutfitPatch};
use fq_core::traits::{OutfitRepo, WardrobeRepo};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use uuid::Uuid;

pub struct SqliteCloset {
    pool: SqlitePool,
}

// Helpers for UUID conversion
fn uuid_to_blob(id: Uuid) -> Vec<u8> {
    id.as_bytes().to_vec()
}

fn blob_to_uuid(blob: &[u8]) -> Uuid {
    Uuid::from_slice(blob).unwrap_or_default()
}

impl SqliteCloset {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        // A pooled ":memory:" database is a different database per
        // connection, so in-memory URLs get pinned to a single connection.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> anyhow::Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS clothing_items (
                id BLOB PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                category TEXT NOT NULL,
                image_url TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_clothing_owner ON clothing_items(owner_id)",
        )
        .execute(pool)
        .await?;
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS outfits (
                id BLOB PRIMARY KEY,
                owner_id TEXT NOT NULL,
                name TEXT NOT NULL,
                item_ids TEXT NOT NULL,
                notes TEXT,
                created_at TEXT NOT NULL
            )",
        )
        .execute(pool)
        .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_outfits_owner ON outfits(owner_id)")
            .execute(pool)
            .await?;
        Ok(())
    }
}

fn row_to_item(row: &sqlx::sqlite::SqliteRow) -> ClothingItem {
    ClothingItem {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        category: row.get("category"),
        image_url: row.get("image_url"),
        created_at: row.get("created_at"),
    }
}

fn row_to_outfit(row: &sqlx::sqlite::SqliteRow) -> Outfit {
    Outfit {
        id: blob_to_uuid(row.get::<Vec<u8>, _>("id").as_slice()),
        owner_id: row.get("owner_id"),
        name: row.get("name"),
        // item_ids is a JSON array of UUID strings
        item_ids: serde_json::from_str(&row.get::<String, _>("item_ids")).unwrap_or_default(),
        notes: row.get("notes"),
        created_at: row.get("created_at"),
    }
}

#[async_trait]
impl WardrobeRepo for SqliteCloset {
    async fn list_items(&self, owner_id: &str) -> anyhow::Result<Vec<ClothingItem>> {
        let rows = sqlx::query(
            "SELECT * FROM clothing_items WHERE owner_id = ? ORDER BY created_at ASC",
        )
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.iter().map(row_to_item).collect())
    }

    async fn get_item(&self, id: Uuid) -> anyhow::Result<Option<ClothingItem>> {
        let row = sqlx::query("SELECT * FROM clothing_items WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_item))
    }

    async fn create_item(&self, item: ClothingItem) -> anyhow::Result<ClothingItem> {
        sqlx::query(
            "INSERT INTO clothing_items (id, owner_id, name, category, image_url, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(item.id))
        .bind(&item.owner_id)
        .bind(&item.name)
        .bind(&item.category)
        .bind(&item.image_url)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;
        Ok(item)
    }

    /// Read-modify-write: `None` patch fields keep the stored value, and
    /// `owner_id` is deliberately untouchable.
    async fn update_item(
        &self,
        id: Uuid,
        patch: ClothingItemPatch,
    ) -> anyhow::Result<Option<ClothingItem>> {
        let Some(mut item) = self.get_item(id).await? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            item.name = name;
        }
        if let Some(category) = patch.category {
            item.category = category;
        }
        if let Some(image_url) = patch.image_url {
            item.image_url = image_url;
        }
        sqlx::query("UPDATE clothing_items SET name = ?, category = ?, image_url = ? WHERE id = ?")
            .bind(&item.name)
            .bind(&item.category)
            .bind(&item.image_url)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(Some(item))
    }

    async fn delete_item(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM clothing_items WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl OutfitRepo for SqliteCloset {
    async fn list_outfits(&self, owner_id: &str) -> anyhow::Result<Vec<Outfit>> {
        let rows =
            sqlx::query("SELECT * FROM outfits WHERE owner_id = ? ORDER BY created_at DESC")
                .bind(owner_id)
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.iter().map(row_to_outfit).collect())
    }

    async fn get_outfit(&self, id: Uuid) -> anyhow::Result<Option<Outfit>> {
        let row = sqlx::query("SELECT * FROM outfits WHERE id = ?")
            .bind(uuid_to_blob(id))
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(row_to_outfit))
    }

    async fn create_outfit(&self, outfit: Outfit) -> anyhow::Result<Outfit> {
        sqlx::query(
            "INSERT INTO outfits (id, owner_id, name, item_ids, notes, created_at)
             VALUES (?, ?, ?, ?, ?, ?)",
        )
        .bind(uuid_to_blob(outfit.id))
        .bind(&outfit.owner_id)
        .bind(&outfit.name)
        .bind(serde_json::to_string(&outfit.item_ids)?)
        .bind(&outfit.notes)
        .bind(outfit.created_at)
        .execute(&self.pool)
        .await?;
        Ok(outfit)
    }

    async fn update_outfit(&self, id: Uuid, patch: OutfitPatch) -> anyhow::Result<Option<Outfit>> {
        let Some(mut outfit) = self.get_outfit(id).await? else {
            return Ok(None);
        };
        if let Some(name) = patch.name {
            outfit.name = name;
        }
        if let Some(item_ids) = patch.item_ids {
            outfit.item_ids = item_ids;
        }
        if let Some(notes) = patch.notes {
            outfit.notes = Some(notes);
        }
        sqlx::query("UPDATE outfits SET name = ?, item_ids = ?, notes = ? WHERE id = ?")
            .bind(&outfit.name)
            .bind(serde_json::to_string(&outfit.item_ids)?)
            .bind(&outfit.notes)
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(Some(outfit))
    }

    async fn delete_outfit(&self, id: Uuid) -> anyhow::Result<()> {
        sqlx::query("DELETE FROM outfits WHERE id = ?")
            .bind(uuid_to_blob(id))
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
