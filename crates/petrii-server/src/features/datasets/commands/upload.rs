use std::{fmt, sync::Arc};

use crate::{
    config::UploadConfig,
    error::AppError,
    features::shared::validation::{parse_tags, validate_required, FieldError},
    models::{DatasetView, FileRef, NewDataset, UserId},
    search::{build_indexed_text, decode_content, IndexFields},
    storage::{generate_key, BlobStore},
    store::{DatasetStore, StoreError},
};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_AUTHOR_LENGTH: usize = 200;
pub const MAX_EXPERIMENT_TYPE_LENGTH: usize = 100;
pub const MAX_FILENAME_LENGTH: usize = 255;

#[derive(Clone, Default)]
pub struct UploadDatasetCommand {
    pub owner_id: UserId,
    pub title: String,
    pub author: String,
    pub experiment_type: String,
    /// Comma-separated, as submitted
    pub tags: String,
    pub filename: Option<String>,
    pub content_type: Option<String>,
    /// `None` when the request carried no file part at all
    pub content: Option<Vec<u8>>,
}

impl fmt::Debug for UploadDatasetCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadDatasetCommand")
            .field("owner_id", &self.owner_id)
            .field("title", &self.title)
            .field("filename", &self.filename)
            .field("content_len", &self.content.as_ref().map(Vec::len))
            .finish_non_exhaustive()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadDatasetError {
    #[error(transparent)]
    Validation(#[from] FieldError),
    #[error("No file uploaded")]
    FileRequired,
    #[error("Uploaded file is empty")]
    ContentRequired,
    #[error("Dataset record of {size} bytes exceeds the {limit} byte limit")]
    ContentTooLarge { size: usize, limit: usize },
    #[error("Storage error: {0}")]
    Storage(#[from] anyhow::Error),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UploadDatasetError> for AppError {
    fn from(err: UploadDatasetError) -> Self {
        match err {
            UploadDatasetError::Validation(_)
            | UploadDatasetError::FileRequired
            | UploadDatasetError::ContentRequired => AppError::Validation(err.to_string()),
            UploadDatasetError::ContentTooLarge { .. } => AppError::ContentTooLarge(err.to_string()),
            UploadDatasetError::Storage(e) => AppError::internal(format!("{:#}", e)),
            UploadDatasetError::Store(e) => e.into(),
        }
    }
}

impl UploadDatasetCommand {
    /// Check the input and return the parsed tag list.
    pub fn validate(&self) -> Result<Vec<String>, UploadDatasetError> {
        validate_required("title", &self.title, MAX_TITLE_LENGTH)?;
        validate_required("author", &self.author, MAX_AUTHOR_LENGTH)?;
        validate_required("experimentType", &self.experiment_type, MAX_EXPERIMENT_TYPE_LENGTH)?;
        if let Some(filename) = &self.filename {
            if filename.chars().count() > MAX_FILENAME_LENGTH {
                return Err(FieldError::TooLong {
                    field: "filename",
                    max_length: MAX_FILENAME_LENGTH,
                }
                .into());
            }
        }
        match &self.content {
            None => return Err(UploadDatasetError::FileRequired),
            Some(content) if content.is_empty() => return Err(UploadDatasetError::ContentRequired),
            Some(_) => {},
        }
        Ok(parse_tags(&self.tags)?)
    }
}

/// Store the file, index it and commit the dataset record.
///
/// The blob is written first under a fresh key. If the record is then
/// refused, the blob is removed again on a best-effort basis.
#[tracing::instrument(skip(datasets, blobs, limits, command), fields(owner_id = %command.owner_id))]
pub async fn handle(
    datasets: Arc<dyn DatasetStore>,
    blobs: Arc<dyn BlobStore>,
    limits: UploadConfig,
    command: UploadDatasetCommand,
) -> Result<DatasetView, UploadDatasetError> {
    let tags = command.validate()?;
    let data = command.content.unwrap_or_default();
    let filename = command
        .filename
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty());

    let decoded = decode_content(&data);

    let key = generate_key(filename.as_deref());
    let stored = blobs.put(&key, data, command.content_type.as_deref()).await?;

    let indexed_text = build_indexed_text(IndexFields {
        title: &command.title,
        author: &command.author,
        experiment_type: &command.experiment_type,
        tags: &tags,
        content: decoded.as_deref(),
    });

    let record = NewDataset {
        owner_id: command.owner_id,
        title: command.title.trim().to_string(),
        author: command.author.trim().to_string(),
        experiment_type: command.experiment_type.trim().to_string(),
        tags,
        file: FileRef {
            location: blobs.public_location(&stored.key),
            key: stored.key.clone(),
            original_filename: filename,
            content_type: command.content_type,
            size_bytes: stored.size,
            checksum: stored.checksum,
        },
        content: decoded,
        indexed_text,
    };

    let size = record.record_size();
    if size > limits.max_record_bytes {
        discard_blob(blobs.as_ref(), &stored.key).await;
        return Err(UploadDatasetError::ContentTooLarge {
            size,
            limit: limits.max_record_bytes,
        });
    }

    let dataset = match datasets.insert(record).await {
        Ok(dataset) => dataset,
        Err(e) => {
            discard_blob(blobs.as_ref(), &stored.key).await;
            return Err(e.into());
        },
    };

    tracing::info!(
        dataset_id = %dataset.id,
        key = %dataset.file.key,
        size = dataset.file.size_bytes,
        indexed_content = dataset.content.is_some(),
        "Dataset uploaded"
    );

    Ok(DatasetView::from(&dataset))
}

async fn discard_blob(blobs: &dyn BlobStore, key: &str) {
    if let Err(e) = blobs.delete(key).await {
        tracing::warn!(key = %key, error = %e, "Failed to remove blob of rejected upload");
    }
}
