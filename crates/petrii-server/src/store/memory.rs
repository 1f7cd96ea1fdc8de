//! In-process stores
//!
//! Records live in insertion order, so iterating in reverse yields newest
//! first without relying on timestamp resolution.

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{CredentialStore, DatasetStore, StoreError, StoreResult};
use crate::models::{
    Dataset, DatasetId, NewDataset, NewUser, Role, User, UserId, UserStatus,
};

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: RwLock<Vec<User>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn insert(&self, new: NewUser) -> StoreResult<User> {
        let mut users = self.users.write().await;
        if users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Duplicate("email"));
        }

        let user = User {
            id: UserId::new(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
            role: new.role,
            status: new.status,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.email == email).cloned())
    }

    async fn list_non_admin(&self) -> StoreResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.iter().rev().filter(|u| u.role != Role::Admin).cloned().collect())
    }

    async fn update_status(
        &self,
        id: UserId,
        expected: UserStatus,
        target: UserStatus,
    ) -> StoreResult<Option<User>> {
        let mut users = self.users.write().await;
        Ok(users
            .iter_mut()
            .find(|u| u.id == id && u.status == expected)
            .map(|user| {
                user.status = target;
                user.clone()
            }))
    }
}

#[derive(Default)]
pub struct MemoryDatasetStore {
    datasets: RwLock<Vec<Dataset>>,
}

impl MemoryDatasetStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DatasetStore for MemoryDatasetStore {
    async fn insert(&self, new: NewDataset) -> StoreResult<Dataset> {
        let mut datasets = self.datasets.write().await;
        if datasets.iter().any(|d| d.file.key == new.file.key) {
            return Err(StoreError::Duplicate("file_key"));
        }

        let dataset = Dataset {
            id: DatasetId(Uuid::new_v4()),
            owner_id: new.owner_id,
            title: new.title,
            author: new.author,
            experiment_type: new.experiment_type,
            tags: new.tags,
            file: new.file,
            content: new.content,
            indexed_text: new.indexed_text,
            created_at: Utc::now(),
        };
        datasets.push(dataset.clone());
        Ok(dataset)
    }

    async fn find_by_id(&self, id: DatasetId) -> StoreResult<Option<Dataset>> {
        let datasets = self.datasets.read().await;
        Ok(datasets.iter().find(|d| d.id == id).cloned())
    }

    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Dataset>> {
        let datasets = self.datasets.read().await;
        Ok(datasets.iter().rev().filter(|d| d.owner_id == owner).cloned().collect())
    }

    async fn list_all(&self) -> StoreResult<Vec<Dataset>> {
        let datasets = self.datasets.read().await;
        Ok(datasets.iter().rev().cloned().collect())
    }

    async fn delete(&self, id: DatasetId) -> StoreResult<bool> {
        let mut datasets = self.datasets.write().await;
        let before = datasets.len();
        datasets.retain(|d| d.id != id);
        Ok(datasets.len() != before)
    }
}
