use std::sync::Arc;

use crate::{
    auth::password::{hash_password_blocking, PasswordError},
    config::AdminSeed,
    features::shared::validation::{normalize_email, FieldError},
    models::{NewUser, Role, User, UserStatus},
    store::{CredentialStore, StoreError},
};

#[derive(Debug, thiserror::Error)]
pub enum SeedAdminError {
    #[error("Invalid admin email: {0}")]
    Email(#[from] FieldError),
    #[error("Admin email {0} belongs to a non-admin account")]
    NotAdmin(String),
    #[error(transparent)]
    Password(#[from] PasswordError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Create the bootstrap administrator unless the email is already registered.
///
/// An existing admin is left untouched, including its password. An existing
/// researcher with the same email is an error rather than a silent promotion.
#[tracing::instrument(skip(users, seed), fields(email = %seed.email))]
pub async fn ensure_admin(users: Arc<dyn CredentialStore>, seed: &AdminSeed) -> Result<User, SeedAdminError> {
    let email = normalize_email(&seed.email)?;

    if let Some(existing) = users.find_by_email(&email).await? {
        if existing.role != Role::Admin {
            return Err(SeedAdminError::NotAdmin(email));
        }
        tracing::debug!(user_id = %existing.id, "Admin account already present");
        return Ok(existing);
    }

    let password_hash = hash_password_blocking(seed.password.clone()).await?;
    let created = users
        .insert(NewUser {
            name: seed.name.clone(),
            email: email.clone(),
            password_hash,
            role: Role::Admin,
            status: UserStatus::Approved,
        })
        .await;

    match created {
        Ok(admin) => {
            tracing::info!(user_id = %admin.id, "Seeded admin account");
            Ok(admin)
        },
        // Another instance seeded it between the lookup and the insert
        Err(StoreError::Duplicate(field)) => users
            .find_by_email(&email)
            .await?
            .ok_or(SeedAdminError::Store(StoreError::Duplicate(field))),
        Err(e) => Err(e.into()),
    }
}
