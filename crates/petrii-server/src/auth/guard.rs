//! Authorization checks
//!
//! Each check is a pure function of the caller's [`Identity`]. They run in
//! order and stop at the first failure, so order changes only which message
//! the caller sees, never whether the call is allowed.

use serde::Serialize;
use thiserror::Error;

use crate::models::{Role, User, UserId};

/// Caller resolved from a verified session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub user_id: UserId,
    pub role: Role,
}

impl From<&User> for Identity {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id,
            role: user.role,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Check {
    HasRole(Role),
    /// Caller must be this resource owner. Admins get no exemption.
    OwnsResource(UserId),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GuardError {
    #[error("Requires the {0} role")]
    MissingRole(Role),
    #[error("Not the owner of this resource")]
    NotOwner,
}

impl Check {
    pub fn evaluate(&self, identity: &Identity) -> Result<(), GuardError> {
        match *self {
            Check::HasRole(role) if identity.role == role => Ok(()),
            Check::HasRole(role) => Err(GuardError::MissingRole(role)),
            Check::OwnsResource(owner) if identity.user_id == owner => Ok(()),
            Check::OwnsResource(_) => Err(GuardError::NotOwner),
        }
    }
}

/// Run `checks` left to right against `identity`.
pub fn authorize(identity: Identity, checks: &[Check]) -> Result<Identity, GuardError> {
    checks
        .iter()
        .try_for_each(|check| check.evaluate(&identity))
        .map(|()| identity)
}
