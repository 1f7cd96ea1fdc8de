//! Session tokens
//!
//! HS256 JWTs binding a user id, valid for a configured number of days.
//! Signature, shape and expiry are all checked on every request; any
//! failure is reported the same way so clients learn nothing about why.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{config::AuthConfig, models::UserId};

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    /// User id
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Invalid or expired session")]
    Invalid,
    #[error("Session lifetime is out of range")]
    Lifetime,
    #[error("Failed to sign session token: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Clone)]
pub struct SessionManager {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionManager {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            validation,
            ttl,
        }
    }

    pub fn from_config(config: &AuthConfig) -> Result<Self, SessionError> {
        let ttl = Duration::try_days(config.session_ttl_days).ok_or(SessionError::Lifetime)?;
        Ok(Self::new(config.jwt_secret.as_bytes(), ttl))
    }

    pub fn issue(&self, user_id: UserId) -> Result<IssuedSession, SessionError> {
        let now = Utc::now();
        let expires_at = now.checked_add_signed(self.ttl).ok_or(SessionError::Lifetime)?;
        let claims = SessionClaims {
            sub: user_id.to_string(),
            iat: now.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)?;
        tracing::debug!(user_id = %user_id, %expires_at, "Issued session token");

        Ok(IssuedSession { token, expires_at })
    }

    /// Resolve a token to the user id it was issued for.
    pub fn verify(&self, token: &str) -> Result<UserId, SessionError> {
        let data = decode::<SessionClaims>(token, &self.decoding, &self.validation).map_err(|e| {
            tracing::debug!(error = %e, "Session token rejected");
            SessionError::Invalid
        })?;

        data.claims.sub.parse().map_err(|_| SessionError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issue_then_verify() {
        let sessions = SessionManager::new(SECRET, Duration::days(30));
        let user = UserId::new();

        let issued = sessions.issue(user).unwrap();
        assert_eq!(sessions.verify(&issued.token).unwrap(), user);

        let remaining = issued.expires_at - Utc::now();
        assert!(remaining > Duration::days(29));
        assert!(remaining <= Duration::days(30));
    }

    #[test]
    fn test_unrepresentable_expiry_is_an_error() {
        let sessions = SessionManager::new(SECRET, Duration::try_days(100_000_000).unwrap());
        assert!(matches!(sessions.issue(UserId::new()), Err(SessionError::Lifetime)));
    }

    #[test]
    fn test_from_config_rejects_out_of_range_ttl() {
        let config = AuthConfig {
            jwt_secret: String::from_utf8(SECRET.to_vec()).unwrap(),
            session_ttl_days: i64::MAX,
        };
        assert!(matches!(SessionManager::from_config(&config), Err(SessionError::Lifetime)));
    }

    #[test]
    fn test_expired_token_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::seconds(-10));
        let issued = sessions.issue(UserId::new()).unwrap();
        assert!(matches!(sessions.verify(&issued.token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_foreign_signature_rejected() {
        let ours = SessionManager::new(SECRET, Duration::days(1));
        let theirs = SessionManager::new(b"another-secret-another-secret-00", Duration::days(1));
        let issued = theirs.issue(UserId::new()).unwrap();
        assert!(matches!(ours.verify(&issued.token), Err(SessionError::Invalid)));
    }

    #[test]
    fn test_malformed_token_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::days(1));
        assert!(sessions.verify("").is_err());
        assert!(sessions.verify("not.a.jwt").is_err());
    }

    #[test]
    fn test_non_uuid_subject_rejected() {
        let sessions = SessionManager::new(SECRET, Duration::days(1));
        let claims = SessionClaims {
            sub: "admin".into(),
            iat: Utc::now().timestamp(),
            exp: (Utc::now() + Duration::days(1)).timestamp(),
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(SECRET)).unwrap();
        assert!(matches!(sessions.verify(&token), Err(SessionError::Invalid)));
    }
}
