use serde::Serialize;
use std::{collections::HashMap, sync::Arc};

use crate::{
    error::AppError,
    models::{DatasetView, OwnerSummary, UserId},
    store::{CredentialStore, DatasetStore, StoreError},
};

/// Dataset plus a shallow view of its owner for moderation screens
#[derive(Debug, Clone, Serialize)]
pub struct AdminDatasetView {
    #[serde(flatten)]
    pub dataset: DatasetView,
    /// `None` when the owner record no longer resolves
    pub owner: Option<OwnerSummary>,
}

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

/// Every dataset in the system with its owner resolved
#[tracing::instrument(skip(users, datasets))]
pub async fn handle(
    users: Arc<dyn CredentialStore>,
    datasets: Arc<dyn DatasetStore>,
) -> Result<Vec<AdminDatasetView>, ListDatasetsError> {
    let all = datasets.list_all().await?;

    let mut owners: HashMap<UserId, Option<OwnerSummary>> = HashMap::new();
    let mut views = Vec::with_capacity(all.len());

    for dataset in &all {
        if !owners.contains_key(&dataset.owner_id) {
            let owner = users.find_by_id(dataset.owner_id).await?.map(|user| OwnerSummary {
                id: user.id,
                name: user.name,
                email: user.email,
            });
            if owner.is_none() {
                tracing::warn!(dataset_id = %dataset.id, owner_id = %dataset.owner_id, "Dataset owner not found");
            }
            owners.insert(dataset.owner_id, owner);
        }

        views.push(AdminDatasetView {
            dataset: DatasetView::from(dataset),
            owner: owners.get(&dataset.owner_id).cloned().flatten(),
        });
    }

    Ok(views)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        features::shared::test_helpers::TestContext,
        models::{FileRef, NewDataset, UserStatus},
    };

    fn dataset(owner: UserId, key: &str) -> NewDataset {
        NewDataset {
            owner_id: owner,
            title: "Growth curve".to_string(),
            author: "Ann".to_string(),
            experiment_type: "culture".to_string(),
            tags: vec![],
            file: FileRef {
                location: format!("/uploads/{key}"),
                key: key.to_string(),
                original_filename: None,
                content_type: None,
                size_bytes: 1,
                checksum: "00".to_string(),
            },
            content: None,
            indexed_text: "growth curve".to_string(),
        }
    }

    #[tokio::test]
    async fn test_owner_summary_is_attached() {
        let ctx = TestContext::new().await;
        let ann = ctx.user("ann@x.com", UserStatus::Approved).await;
        ctx.state.datasets.insert(dataset(ann.id, "a.csv")).await.unwrap();
        ctx.state.datasets.insert(dataset(ann.id, "b.csv")).await.unwrap();
        ctx.state.datasets.insert(dataset(UserId::new(), "c.csv")).await.unwrap();

        let views = handle(ctx.state.users.clone(), ctx.state.datasets.clone()).await.unwrap();
        assert_eq!(views.len(), 3);

        let orphan = views.iter().find(|v| v.dataset.file_key == "c.csv").unwrap();
        assert!(orphan.owner.is_none());

        let owned = views.iter().find(|v| v.dataset.file_key == "a.csv").unwrap();
        let owner = owned.owner.as_ref().unwrap();
        assert_eq!(owner.email, "ann@x.com");

        let json = serde_json::to_value(owned).unwrap();
        assert_eq!(json["owner"]["name"], "ann");
        assert_eq!(json["fileKey"], "a.csv");
    }
}
