//! # fq-storage-local
//!
//! Local filesystem implementation of `MediaStore` for wardrobe photos.
//! Features: content-addressable storage, directory sharding, and
//! thumbnailing for the wardrobe grid.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use anyhow::bail;
use async_trait::async_trait;
use fq_core::traits::MediaStore;
use sha2::{Digest, Sha256};
use tokio::fs;

/// Matches the upload cap the web client already enforces.
const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

const THUMBNAIL_EDGE: u32 = 320;

pub struct LocalMediaStore {
    /// Root directory for all uploads (e.g., "./data/uploads")
    root_path: PathBuf,
    /// Public URL prefix (e.g., "/static/uploads")
    url_prefix: String,
}

impl LocalMediaStore {
    pub fn new(root: PathBuf, url_prefix: String) -> Self {
        Self {
            root_path: root,
            url_prefix,
        }
    }

    /// Generates a sharded path: "ab/cd/abcdef...hash"
    fn sharded_path(&self, hash: &str) -> PathBuf {
        let mut path = self.root_path.clone();
        path.push(&hash[0..2]);
        path.push(&hash[2..4]);
        path.push(hash);
        path
    }

    /// 320px WebP thumbnail next to the original. A failure here is logged
    /// and swallowed: the full-size photo is still perfectly usable.
    async fn generate_thumbnail(&self, source_path: &Path, hash: &str) -> anyhow::Result<()> {
        let data = fs::read(source_path).await?;
        let img = image::io::Reader::new(Cursor::new(data))
            .with_guessed_format()?
            .decode()?;

        let thumb = img.thumbnail(THUMBNAIL_EDGE, THUMBNAIL_EDGE);
        let mut thumb_path = source_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();
        thumb_path.push(format!("thumb_{hash}.webp"));
        thumb.save_with_format(thumb_path, image::ImageFormat::WebP)?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for LocalMediaStore {
    /// Saves an upload under its SHA-256 hash, which deduplicates photos of
    /// the same garment for free. Validation runs before any write.
    async fn save_upload(&self, data: Vec<u8>, content_type: &str) -> anyhow::Result<String> {
        if !content_type.starts_with("image/") {
            bail!("unsupported content type: {content_type}");
        }
        if data.is_empty() {
            bail!("empty upload");
        }
        if data.len() > MAX_UPLOAD_BYTES {
            bail!("image larger than 10 MB");
        }

        let mut hasher = Sha256::new();
        hasher.update(&data);
        let hash = format!("{:x}", hasher.finalize());

        let target_path = self.sharded_path(&hash);
        if let Some(parent) = target_path.parent() {
            fs::create_dir_all(parent).await?;
        }

        if fs::try_exists(&target_path).await? {
            return Ok(hash);
        }
        fs::write(&target_path, &data).await?;

        if let Err(err) = self.generate_thumbnail(&target_path, &hash).await {
            log::warn!("thumbnail generation failed for {hash}: {err:#}");
        }

        Ok(hash)
    }

    fn get_url(&self, media_id: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.url_prefix,
            &media_id[0..2],
            &media_id[2..4],
            media_id
        )
    }

    fn get_thumbnail_url(&self, media_id: &str) -> String {
        format!(
            "{}/{}/{}/thumb_{}.webp",
            self.url_prefix,
            &media_id[0..2],
            &media_id[2..4],
            media_id
        )
    }
}
