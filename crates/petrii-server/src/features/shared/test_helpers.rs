//! Fixtures for handler tests
//!
//! ```rust,ignore
//! let ctx = TestContext::new().await;
//! let ann = ctx.user("ann@x.com", UserStatus::Approved).await;
//! ```

use std::sync::Arc;
use tempfile::TempDir;

use crate::{
    auth::{password::hash_password, SessionManager},
    config::UploadConfig,
    db::Stores,
    features::FeatureState,
    models::{NewUser, Role, User, UserStatus},
    storage::LocalBlobStore,
};

pub const TEST_SECRET: &[u8] = b"test-secret-test-secret-test-sec";
pub const TEST_PASSWORD: &str = "secret1";

/// In-memory state plus the temporary upload directory it writes into
pub struct TestContext {
    pub state: FeatureState,
    pub uploads_dir: TempDir,
}

impl TestContext {
    pub async fn new() -> Self {
        Self::with_uploads(UploadConfig::default()).await
    }

    pub async fn with_uploads(uploads: UploadConfig) -> Self {
        let uploads_dir = tempfile::tempdir().unwrap();
        let blobs = LocalBlobStore::open(uploads_dir.path(), "/uploads").await.unwrap();
        let state = FeatureState::new(
            &Stores::in_memory(),
            Arc::new(blobs),
            Arc::new(SessionManager::new(TEST_SECRET, chrono::Duration::days(30))),
            uploads,
        );
        Self { state, uploads_dir }
    }

    /// Insert a researcher with [`TEST_PASSWORD`] directly into the store.
    pub async fn user(&self, email: &str, status: UserStatus) -> User {
        self.insert(email, Role::Researcher, status).await
    }

    pub async fn admin(&self, email: &str) -> User {
        self.insert(email, Role::Admin, UserStatus::Approved).await
    }

    async fn insert(&self, email: &str, role: Role, status: UserStatus) -> User {
        let name = email.split('@').next().unwrap_or(email).to_string();
        self.state
            .users
            .insert(NewUser {
                name,
                email: email.to_string(),
                password_hash: hash_password(TEST_PASSWORD).unwrap(),
                role,
                status,
            })
            .await
            .unwrap()
    }
}
