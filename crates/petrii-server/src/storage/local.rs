//! Local filesystem backend

use anyhow::{ensure, Context, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, instrument, warn};

use super::{is_safe_key, join_public, BlobStore, StoredBlob};

#[derive(Debug, Clone)]
pub struct LocalBlobStore {
    root: PathBuf,
    public_base_url: String,
}

impl LocalBlobStore {
    /// Open (and create if needed) the storage directory.
    pub async fn open(root: impl AsRef<Path>, public_base_url: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        tokio::fs::create_dir_all(&root)
            .await
            .with_context(|| format!("Failed to create uploads directory {}", root.display()))?;

        info!(root = %root.display(), "Local blob store ready");

        Ok(Self {
            root,
            public_base_url: public_base_url.to_string(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        ensure!(is_safe_key(key), "Refusing unsafe storage key");
        Ok(self.root.join(key))
    }
}

#[async_trait]
impl BlobStore for LocalBlobStore {
    #[instrument(skip(self, data, _content_type), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Vec<u8>, _content_type: Option<&str>) -> Result<StoredBlob> {
        let path = self.path_for(key)?;
        let partial = self.root.join(format!(".{}.partial", key));
        let checksum = petrii_common::sha256_hex(&data);
        let size = data.len() as i64;

        if let Err(err) = write_then_rename(&partial, &path, &data).await {
            if let Err(cleanup) = tokio::fs::remove_file(&partial).await {
                if cleanup.kind() != std::io::ErrorKind::NotFound {
                    warn!(error = %cleanup, partial = %partial.display(), "Failed to remove partial upload");
                }
            }
            return Err(err);
        }

        debug!(key, size, "Stored blob on local disk");

        Ok(StoredBlob {
            key: key.to_string(),
            checksum,
            size,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("Failed to delete {}", path.display()))?;

        debug!(key, "Deleted blob from local disk");
        Ok(())
    }

    fn public_location(&self, key: &str) -> String {
        join_public(&self.public_base_url, key)
    }
}

async fn write_then_rename(partial: &Path, path: &Path, data: &[u8]) -> Result<()> {
    let mut file = tokio::fs::File::create(partial)
        .await
        .with_context(|| format!("Failed to create {}", partial.display()))?;
    file.write_all(data).await.context("Failed to write upload")?;
    file.sync_all().await.context("Failed to flush upload")?;
    drop(file);

    tokio::fs::rename(partial, path)
        .await
        .with_context(|| format!("Failed to move upload into place at {}", path.display()))
}
