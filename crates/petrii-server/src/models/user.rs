//! Users, roles and the account approval state machine

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::{fmt, str::FromStr};
use uuid::Uuid;

use super::UnknownVariant;

/// Opaque user identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub Uuid);

impl UserId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for UserId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Researcher,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Researcher => "researcher",
            Role::Admin => "admin",
        }
    }
}

impl FromStr for Role {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "researcher" => Ok(Role::Researcher),
            "admin" => Ok(Role::Admin),
            other => Err(UnknownVariant {
                kind: "role",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Account approval status.
///
/// `Pending` is the only non-terminal state. Moderation moves it to
/// `Approved` or `Rejected` and nothing moves it back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StatusTransitionError {
    #[error("Status can only be set to approved or rejected")]
    InvalidTarget,
    #[error("Cannot change status from {from} to {to}")]
    Terminal { from: UserStatus, to: UserStatus },
}

impl UserStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Pending => "pending",
            UserStatus::Approved => "approved",
            UserStatus::Rejected => "rejected",
        }
    }

    /// Check a moderation decision against the current status.
    ///
    /// Returns `Ok(true)` when the status changes and `Ok(false)` when the
    /// account already holds `target`.
    pub fn transition_to(self, target: UserStatus) -> Result<bool, StatusTransitionError> {
        if target == UserStatus::Pending {
            return Err(StatusTransitionError::InvalidTarget);
        }
        match self {
            current if current == target => Ok(false),
            UserStatus::Pending => Ok(true),
            from => Err(StatusTransitionError::Terminal { from, to: target }),
        }
    }
}

impl FromStr for UserStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(UserStatus::Pending),
            "approved" => Ok(UserStatus::Approved),
            "rejected" => Ok(UserStatus::Rejected),
            other => Err(UnknownVariant {
                kind: "status",
                value: other.to_string(),
            }),
        }
    }
}

impl fmt::Display for UserStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stored account, including the credential hash
#[derive(Clone)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("email", &self.email)
            .field("password_hash", &"<redacted>")
            .field("role", &self.role)
            .field("status", &self.status)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Account to be inserted; the store assigns id and creation time
#[derive(Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub status: UserStatus,
}

impl NewUser {
    /// Self-registered accounts always start as pending researchers.
    pub fn researcher(name: String, email: String, password_hash: String) -> Self {
        Self {
            name,
            email,
            password_hash,
            role: Role::Researcher,
            status: UserStatus::Pending,
        }
    }
}

/// What clients see of an account
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PublicProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub status: UserStatus,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            status: user.status,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_can_be_approved_or_rejected() {
        assert_eq!(UserStatus::Pending.transition_to(UserStatus::Approved), Ok(true));
        assert_eq!(UserStatus::Pending.transition_to(UserStatus::Rejected), Ok(true));
    }

    #[test]
    fn test_same_target_is_a_no_op() {
        assert_eq!(UserStatus::Approved.transition_to(UserStatus::Approved), Ok(false));
        assert_eq!(UserStatus::Rejected.transition_to(UserStatus::Rejected), Ok(false));
    }

    #[test]
    fn test_terminal_states_do_not_move() {
        assert_eq!(
            UserStatus::Approved.transition_to(UserStatus::Rejected),
            Err(StatusTransitionError::Terminal {
                from: UserStatus::Approved,
                to: UserStatus::Rejected
            })
        );
        assert!(UserStatus::Rejected.transition_to(UserStatus::Approved).is_err());
    }

    #[test]
    fn test_pending_is_never_a_target() {
        for status in [UserStatus::Pending, UserStatus::Approved, UserStatus::Rejected] {
            assert_eq!(
                status.transition_to(UserStatus::Pending),
                Err(StatusTransitionError::InvalidTarget)
            );
        }
    }

    #[test]
    fn test_role_and_status_parse() {
        assert_eq!("admin".parse::<Role>().unwrap(), Role::Admin);
        assert_eq!("approved".parse::<UserStatus>().unwrap(), UserStatus::Approved);
        let err = "owner".parse::<Role>().unwrap_err();
        assert_eq!(err.kind, "role");
    }

    #[test]
    fn test_debug_redacts_hash() {
        let user = User {
            id: UserId::new(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "$argon2id$secret".into(),
            role: Role::Researcher,
            status: UserStatus::Pending,
            created_at: Utc::now(),
        };
        let rendered = format!("{:?}", user);
        assert!(!rendered.contains("argon2id"));
        assert!(rendered.contains("<redacted>"));
    }

    #[test]
    fn test_profile_serializes_camel_case_without_hash() {
        let user = User {
            id: UserId::new(),
            name: "Ann".into(),
            email: "ann@x.com".into(),
            password_hash: "hash".into(),
            role: Role::Researcher,
            status: UserStatus::Pending,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(PublicProfile::from(&user)).unwrap();
        assert_eq!(json["status"], "pending");
        assert_eq!(json["role"], "researcher");
        assert!(json.get("createdAt").is_some());
        assert!(json.get("passwordHash").is_none());
    }
}
