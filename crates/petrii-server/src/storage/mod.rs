//! Blob storage for uploaded files
//!
//! Every upload is written under a freshly generated key, so two datasets
//! never share a file and an upload can never overwrite an unrelated one.

use anyhow::Result;
use async_trait::async_trait;
use std::{path::Path, sync::Arc};
use uuid::Uuid;

pub mod config;
pub mod local;
pub mod s3;

pub use config::{StorageBackend, StorageConfig};
pub use local::LocalBlobStore;
pub use s3::S3BlobStore;

/// Longest file extension carried over into a storage key.
const MAX_EXTENSION_LEN: usize = 16;

#[derive(Debug, Clone)]
pub struct StoredBlob {
    pub key: String,
    /// SHA-256 hex digest of the stored bytes
    pub checksum: String,
    pub size: i64,
}

#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Durably store `data` under `key`. Returns once the write is complete.
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> Result<StoredBlob>;

    async fn delete(&self, key: &str) -> Result<()>;

    /// Stable public path clients use to fetch the file.
    fn public_location(&self, key: &str) -> String;
}

/// Build the blob store selected by configuration.
pub async fn connect(config: &StorageConfig) -> Result<Arc<dyn BlobStore>> {
    Ok(match config.backend {
        StorageBackend::Local => Arc::new(
            LocalBlobStore::open(&config.uploads_dir, &config.public_base_url).await?,
        ),
        StorageBackend::S3 => Arc::new(S3BlobStore::new(&config.s3, &config.public_base_url)),
    })
}

/// Random key that keeps the original extension when it looks sane.
pub fn generate_key(original_filename: Option<&str>) -> String {
    let id = Uuid::new_v4();
    let extension = original_filename
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(str::to_ascii_lowercase);

    match extension {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

/// Keys are flat names; anything that could escape the storage root is refused.
pub(crate) fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && !key.starts_with('.')
        && key.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '.' | '_'))
}

pub(crate) fn join_public(base: &str, key: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), key)
}
