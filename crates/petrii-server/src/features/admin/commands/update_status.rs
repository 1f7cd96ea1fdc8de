use serde::Deserialize;
use std::sync::Arc;

use crate::{
    error::AppError,
    models::{PublicProfile, StatusTransitionError, UnknownVariant, UserId, UserStatus},
    store::{CredentialStore, StoreError},
};

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateStatusCommand {
    /// Raw target status, parsed in [`validate`](Self::validate)
    pub status: String,
}

#[derive(Debug, thiserror::Error)]
pub enum UpdateStatusError {
    #[error("Invalid status: {0}")]
    InvalidStatus(#[from] UnknownVariant),
    #[error(transparent)]
    Transition(#[from] StatusTransitionError),
    #[error("User not found")]
    NotFound,
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<UpdateStatusError> for AppError {
    fn from(err: UpdateStatusError) -> Self {
        match err {
            UpdateStatusError::InvalidStatus(_) | UpdateStatusError::Transition(_) => {
                AppError::Validation(err.to_string())
            },
            UpdateStatusError::NotFound => AppError::NotFound("User not found".to_string()),
            UpdateStatusError::Store(e) => e.into(),
        }
    }
}

impl UpdateStatusCommand {
    pub fn validate(&self) -> Result<UserStatus, UpdateStatusError> {
        let target: UserStatus = self.status.trim().parse()?;
        if target == UserStatus::Pending {
            return Err(StatusTransitionError::InvalidTarget.into());
        }
        Ok(target)
    }
}

/// Moderate an account: pending -> approved | rejected.
///
/// Repeating the current decision succeeds without a write. The store update
/// is conditional on the status read here; if another moderator got there
/// first, the fresh status decides between success and a rejected transition.
#[tracing::instrument(skip(users, command), fields(target = %command.status))]
pub async fn handle(
    users: Arc<dyn CredentialStore>,
    user_id: UserId,
    command: UpdateStatusCommand,
) -> Result<PublicProfile, UpdateStatusError> {
    let target = command.validate()?;

    let user = users.find_by_id(user_id).await?.ok_or(UpdateStatusError::NotFound)?;
    if !user.status.transition_to(target)? {
        return Ok(PublicProfile::from(&user));
    }

    if let Some(updated) = users.update_status(user_id, user.status, target).await? {
        tracing::info!(user_id = %user_id, from = %user.status, to = %target, "Account status changed");
        return Ok(PublicProfile::from(&updated));
    }

    let current = users.find_by_id(user_id).await?.ok_or(UpdateStatusError::NotFound)?;
    current.status.transition_to(target)?;
    Ok(PublicProfile::from(&current))
}
