use serde::Serialize;
use std::sync::Arc;

use crate::{
    auth::{authorize, Check, GuardError, Identity},
    error::AppError,
    models::DatasetId,
    storage::BlobStore,
    store::{DatasetStore, StoreError},
};

#[derive(Debug, Clone, Copy)]
pub struct DeleteDatasetCommand {
    pub dataset_id: DatasetId,
    pub requester: Identity,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteDatasetResponse {
    pub id: DatasetId,
    pub deleted: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum DeleteDatasetError {
    #[error("Dataset not found")]
    NotFound,
    #[error("You can only delete your own datasets")]
    Forbidden(#[from] GuardError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<DeleteDatasetError> for AppError {
    fn from(err: DeleteDatasetError) -> Self {
        match err {
            DeleteDatasetError::NotFound => AppError::NotFound("Dataset not found".to_string()),
            DeleteDatasetError::Forbidden(_) => {
                AppError::Forbidden("You can only delete your own datasets".to_string())
            },
            DeleteDatasetError::Store(e) => e.into(),
        }
    }
}

/// Remove a dataset owned by the requester.
///
/// The blob goes first and its failure is only logged; the record is removed
/// regardless so the dataset disappears from every listing.
#[tracing::instrument(skip(datasets, blobs))]
pub async fn handle(
    datasets: Arc<dyn DatasetStore>,
    blobs: Arc<dyn BlobStore>,
    command: DeleteDatasetCommand,
) -> Result<DeleteDatasetResponse, DeleteDatasetError> {
    let dataset = datasets
        .find_by_id(command.dataset_id)
        .await?
        .ok_or(DeleteDatasetError::NotFound)?;

    authorize(command.requester, &[Check::OwnsResource(dataset.owner_id)])?;

    if let Err(e) = blobs.delete(&dataset.file.key).await {
        tracing::warn!(
            dataset_id = %dataset.id,
            key = %dataset.file.key,
            error = %e,
            "Failed to delete dataset blob; removing record anyway"
        );
    }

    // A concurrent delete may have won; the outcome is the same
    let removed = datasets.delete(dataset.id).await?;
    tracing::info!(dataset_id = %dataset.id, removed, "Dataset deleted");

    Ok(DeleteDatasetResponse {
        id: dataset.id,
        deleted: true,
    })
}
