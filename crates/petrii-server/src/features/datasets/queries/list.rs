use std::sync::Arc;

use crate::{
    error::AppError,
    models::{DatasetView, UserId},
    store::{DatasetStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum ListDatasetsError {
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<ListDatasetsError> for AppError {
    fn from(err: ListDatasetsError) -> Self {
        match err {
            ListDatasetsError::Store(e) => e.into(),
        }
    }
}

/// The caller's datasets, newest first
#[tracing::instrument(skip(datasets))]
pub async fn handle(
    datasets: Arc<dyn DatasetStore>,
    owner_id: UserId,
) -> Result<Vec<DatasetView>, ListDatasetsError> {
    let owned = datasets.list_by_owner(owner_id).await?;
    Ok(owned.iter().map(DatasetView::from).collect())
}
