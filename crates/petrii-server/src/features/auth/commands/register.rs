use serde::Deserialize;
use std::{fmt, sync::Arc};

use crate::{
    auth::password::{hash_password_blocking, PasswordError},
    error::AppError,
    features::shared::validation::{
        normalize_email, validate_password, validate_required, FieldError,
    },
    models::{NewUser, PublicProfile},
    store::{CredentialStore, StoreError},
};

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Clone, Deserialize)]
pub struct RegisterCommand {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl fmt::Debug for RegisterCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegisterCommand")
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterError {
    #[error(transparent)]
    Validation(#[from] FieldError),
    #[error("User already exists")]
    EmailTaken,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(StoreError),
}

impl From<StoreError> for RegisterError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Duplicate(_) => Self::EmailTaken,
            other => Self::Store(other),
        }
    }
}

impl From<RegisterError> for AppError {
    fn from(err: RegisterError) -> Self {
        match err {
            RegisterError::Validation(e) => AppError::Validation(e.to_string()),
            RegisterError::EmailTaken => AppError::Conflict("User already exists".to_string()),
            RegisterError::Password(e) => AppError::internal(e),
            RegisterError::Store(e) => e.into(),
        }
    }
}

impl RegisterCommand {
    /// Validate the input and return the normalized email.
    pub fn validate(&self) -> Result<String, RegisterError> {
        validate_required("name", &self.name, MAX_NAME_LENGTH)?;
        let email = normalize_email(&self.email)?;
        validate_password(&self.password)?;
        Ok(email)
    }
}

/// Create a pending researcher account. No session is issued.
#[tracing::instrument(skip(users, command), fields(email = %command.email))]
pub async fn handle(
    users: Arc<dyn CredentialStore>,
    command: RegisterCommand,
) -> Result<PublicProfile, RegisterError> {
    let email = command.validate()?;
    let password_hash = hash_password_blocking(command.password).await?;

    let user = users
        .insert(NewUser::researcher(command.name.trim().to_string(), email, password_hash))
        .await?;

    tracing::info!(user_id = %user.id, "Registered new researcher");
    Ok(PublicProfile::from(&user))
}
