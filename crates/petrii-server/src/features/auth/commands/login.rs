use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, sync::Arc};

use crate::{
    auth::{
        password::{dummy_hash, verify_password_blocking, PasswordError},
        SessionError, SessionManager,
    },
    error::AppError,
    features::shared::validation::{validate_required, FieldError, MAX_EMAIL_LENGTH, MAX_PASSWORD_LENGTH},
    models::{PublicProfile, UserStatus},
    store::{CredentialStore, StoreError},
};

#[derive(Clone, Deserialize)]
pub struct LoginCommand {
    pub email: String,
    pub password: String,
}

impl fmt::Debug for LoginCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCommand")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Public profile plus the session token
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    #[serde(flatten)]
    pub profile: PublicProfile,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginError {
    #[error(transparent)]
    Validation(#[from] FieldError),
    /// Unknown email and wrong password are indistinguishable
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Your account is not approved yet")]
    NotApproved,
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<LoginError> for AppError {
    fn from(err: LoginError) -> Self {
        match err {
            LoginError::Validation(e) => AppError::Validation(e.to_string()),
            LoginError::InvalidCredentials => AppError::AuthenticationFailed,
            LoginError::NotApproved => AppError::NotApproved,
            LoginError::Password(e) => AppError::internal(e),
            LoginError::Session(e) => AppError::internal(e),
            LoginError::Store(e) => e.into(),
        }
    }
}

impl LoginCommand {
    pub fn validate(&self) -> Result<(), LoginError> {
        validate_required("email", &self.email, MAX_EMAIL_LENGTH)?;
        validate_required("password", &self.password, MAX_PASSWORD_LENGTH)?;
        Ok(())
    }
}

/// Verify credentials and issue a session for an approved account.
///
/// The approval check runs only after the password matched, so a pending
/// account learns it is pending only when its owner knows the password.
#[tracing::instrument(skip(users, sessions, command))]
pub async fn handle(
    users: Arc<dyn CredentialStore>,
    sessions: &SessionManager,
    command: LoginCommand,
) -> Result<LoginResponse, LoginError> {
    command.validate()?;

    let email = command.email.trim().to_lowercase();
    let user = users.find_by_email(&email).await?;

    let hash = match &user {
        Some(user) => user.password_hash.clone(),
        None => dummy_hash().to_string(),
    };
    let verified = verify_password_blocking(command.password, hash).await?;

    let user = match user {
        Some(user) if verified => user,
        _ => {
            tracing::info!("Login rejected: bad credentials");
            return Err(LoginError::InvalidCredentials);
        },
    };

    if user.status != UserStatus::Approved {
        tracing::info!(user_id = %user.id, status = %user.status, "Login rejected: not approved");
        return Err(LoginError::NotApproved);
    }

    let session = sessions.issue(user.id)?;
    tracing::info!(user_id = %user.id, "User logged in");

    Ok(LoginResponse {
        profile: PublicProfile::from(&user),
        token: session.token,
        expires_at: session.expires_at,
    })
}
