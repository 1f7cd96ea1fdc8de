use std::sync::Arc;

use crate::{
    error::AppError,
    models::{PublicProfile, UserId},
    store::{CredentialStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum MeError {
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<MeError> for AppError {
    fn from(err: MeError) -> Self {
        match err {
            MeError::NotFound => AppError::NotFound("User not found".to_string()),
            MeError::Store(e) => e.into(),
        }
    }
}

/// Public profile of the session's own account
#[tracing::instrument(skip(users))]
pub async fn handle(users: Arc<dyn CredentialStore>, user_id: UserId) -> Result<PublicProfile, MeError> {
    users
        .find_by_id(user_id)
        .await?
        .map(|user| PublicProfile::from(&user))
        .ok_or(MeError::NotFound)
}
