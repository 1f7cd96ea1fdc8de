//! Persistence ports
//!
//! Feature handlers talk to these traits only. `postgres` backs them with
//! sqlx, `memory` with process-local maps for tests and throwaway runs.

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{
    Dataset, DatasetId, NewDataset, NewUser, UnknownVariant, User, UserId, UserStatus,
};

pub mod memory;
pub mod postgres;

pub use memory::{MemoryCredentialStore, MemoryDatasetStore};
pub use postgres::{PgCredentialStore, PgDatasetStore};

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write
    #[error("Duplicate {0}")]
    Duplicate(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Corrupt record: {0}")]
    Corrupt(#[from] UnknownVariant),
}

/// Accounts and their credentials
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Fails with `Duplicate("email")` when the email is taken.
    async fn insert(&self, user: NewUser) -> StoreResult<User>;

    async fn find_by_id(&self, id: UserId) -> StoreResult<Option<User>>;

    /// `email` must already be normalized.
    async fn find_by_email(&self, email: &str) -> StoreResult<Option<User>>;

    /// Every non-admin account, newest first
    async fn list_non_admin(&self) -> StoreResult<Vec<User>>;

    /// Compare-and-set: writes `target` only while the stored status is still
    /// `expected`. Returns `None` when no row matched.
    async fn update_status(
        &self,
        id: UserId,
        expected: UserStatus,
        target: UserStatus,
    ) -> StoreResult<Option<User>>;
}

/// Dataset metadata records
#[async_trait]
pub trait DatasetStore: Send + Sync {
    /// Fails with `Duplicate("file_key")` when the storage key is reused.
    async fn insert(&self, dataset: NewDataset) -> StoreResult<Dataset>;

    async fn find_by_id(&self, id: DatasetId) -> StoreResult<Option<Dataset>>;

    /// The owner's datasets, newest first
    async fn list_by_owner(&self, owner: UserId) -> StoreResult<Vec<Dataset>>;

    /// Every dataset, newest first
    async fn list_all(&self) -> StoreResult<Vec<Dataset>>;

    /// The owner's datasets that may match `terms`.
    ///
    /// Implementations may narrow the set; the search engine makes the final
    /// decision, so returning too many is fine and returning too few is not.
    async fn search_candidates(&self, owner: UserId, terms: &[String]) -> StoreResult<Vec<Dataset>> {
        let _ = terms;
        self.list_by_owner(owner).await
    }

    /// Returns whether a record was removed.
    async fn delete(&self, id: DatasetId) -> StoreResult<bool>;
}
