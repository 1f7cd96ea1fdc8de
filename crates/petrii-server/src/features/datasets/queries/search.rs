use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{DatasetView, UserId},
    search::{rank, SearchQuery},
    store::{DatasetStore, StoreError},
};

/// Longest accepted raw query string.
pub const MAX_QUERY_LENGTH: usize = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct SearchDatasetsQuery {
    pub q: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum SearchDatasetsError {
    #[error("Query parameter q is required")]
    QueryRequired,
    #[error("Query must be at most 1000 characters")]
    QueryTooLong,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<SearchDatasetsError> for AppError {
    fn from(err: SearchDatasetsError) -> Self {
        match err {
            SearchDatasetsError::QueryRequired | SearchDatasetsError::QueryTooLong => {
                AppError::Validation(err.to_string())
            },
            SearchDatasetsError::Store(e) => e.into(),
        }
    }
}

impl SearchDatasetsQuery {
    pub fn validate(&self) -> Result<SearchQuery, SearchDatasetsError> {
        let raw = self.q.as_deref().ok_or(SearchDatasetsError::QueryRequired)?;
        if raw.chars().count() > MAX_QUERY_LENGTH {
            return Err(SearchDatasetsError::QueryTooLong);
        }
        Ok(SearchQuery::parse(raw))
    }
}

/// Search the caller's own datasets. A blank query lists them all.
#[tracing::instrument(skip(datasets, query))]
pub async fn handle(
    datasets: Arc<dyn DatasetStore>,
    owner_id: UserId,
    query: SearchDatasetsQuery,
) -> Result<Vec<DatasetView>, SearchDatasetsError> {
    let query = query.validate()?;

    let results = if query.is_empty() {
        datasets.list_by_owner(owner_id).await?
    } else {
        let candidates = datasets.search_candidates(owner_id, query.terms()).await?;
        rank(candidates, &query)
    };

    tracing::debug!(terms = query.terms().len(), hits = results.len(), "Dataset search");
    Ok(results.iter().map(DatasetView::from).collect())
}
