//! S3-compatible backend (AWS S3, MinIO)

use anyhow::{Context, Result};
use async_trait::async_trait;
use aws_sdk_s3::{
    config::{Credentials, Region},
    primitives::ByteStream,
    Client,
};
use tracing::{debug, info, instrument};

use super::{config::S3Config, join_public, BlobStore, StoredBlob};

#[derive(Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    public_base_url: String,
}

impl S3BlobStore {
    pub fn new(config: &S3Config, public_base_url: &str) -> Self {
        debug!("Initializing S3 blob store with config: {:?}", config);

        let credentials = Credentials::new(
            &config.access_key,
            &config.secret_key,
            None,
            None,
            "petrii-storage",
        );

        let mut builder = aws_sdk_s3::Config::builder()
            .credentials_provider(credentials)
            .region(Region::new(config.region.clone()))
            .force_path_style(config.path_style);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        info!(bucket = %config.bucket, "S3 blob store initialized");

        Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
            public_base_url: public_base_url.to_string(),
        }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    #[instrument(skip(self, data, content_type), fields(size = data.len()))]
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<&str>) -> Result<StoredBlob> {
        let checksum = petrii_common::sha256_hex(&data);
        let size = data.len() as i64;

        let mut request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data));

        if let Some(ct) = content_type {
            request = request.content_type(ct);
        }

        request.send().await.context("Failed to upload to S3")?;

        info!("Uploaded s3://{}/{}", self.bucket, key);

        Ok(StoredBlob {
            key: key.to_string(),
            checksum,
            size,
        })
    }

    #[instrument(skip(self))]
    async fn delete(&self, key: &str) -> Result<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .with_context(|| format!("Failed to delete from S3: {}", key))?;

        info!("Deleted s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn public_location(&self, key: &str) -> String {
        join_public(&self.public_base_url, key)
    }
}
