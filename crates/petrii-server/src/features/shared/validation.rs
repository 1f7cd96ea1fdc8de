//! Shared validation utilities
//!
//! Every command validates its input with these before touching a store.
//!
//! ```rust,ignore
//! use petrii_server::features::shared::validation::{normalize_email, validate_required};
//!
//! validate_required("title", &command.title, MAX_TITLE_LENGTH)?;
//! let email = normalize_email(&command.email)?;
//! ```

use thiserror::Error;

/// Longest accepted email address (RFC 5321 path limit).
pub const MAX_EMAIL_LENGTH: usize = 254;

/// Shortest accepted password.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Longest accepted password.
pub const MAX_PASSWORD_LENGTH: usize = 1024;

/// Longest single tag.
pub const MAX_TAG_LENGTH: usize = 64;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("{field} is required")]
    Required { field: &'static str },

    #[error("{field} must be at most {max_length} characters")]
    TooLong { field: &'static str, max_length: usize },

    #[error("email is not a valid email address")]
    InvalidEmail,

    #[error("password must be at least {min_length} characters")]
    PasswordTooShort { min_length: usize },
}

/// Require a non-blank value of bounded length.
pub fn validate_required(field: &'static str, value: &str, max_length: usize) -> Result<(), FieldError> {
    if value.trim().is_empty() {
        return Err(FieldError::Required { field });
    }
    if value.chars().count() > max_length {
        return Err(FieldError::TooLong { field, max_length });
    }
    Ok(())
}

/// Trim and lowercase an email, rejecting obviously malformed ones.
pub fn normalize_email(raw: &str) -> Result<String, FieldError> {
    let email = raw.trim().to_lowercase();
    if email.is_empty() {
        return Err(FieldError::Required { field: "email" });
    }
    if email.len() > MAX_EMAIL_LENGTH {
        return Err(FieldError::TooLong {
            field: "email",
            max_length: MAX_EMAIL_LENGTH,
        });
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.is_empty()
                && !domain.contains('@')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && !email.chars().any(char::is_whitespace)
        },
        None => false,
    };

    if valid {
        Ok(email)
    } else {
        Err(FieldError::InvalidEmail)
    }
}

pub fn validate_password(password: &str) -> Result<(), FieldError> {
    if password.is_empty() {
        return Err(FieldError::Required { field: "password" });
    }
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(FieldError::PasswordTooShort {
            min_length: MIN_PASSWORD_LENGTH,
        });
    }
    if password.len() > MAX_PASSWORD_LENGTH {
        return Err(FieldError::TooLong {
            field: "password",
            max_length: MAX_PASSWORD_LENGTH,
        });
    }
    Ok(())
}

/// Split a comma-separated tag list into trimmed, distinct, non-empty tags.
///
/// First occurrence wins, so the client's order is kept.
pub fn parse_tags(raw: &str) -> Result<Vec<String>, FieldError> {
    let mut tags: Vec<String> = Vec::new();
    for tag in raw.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        if tag.chars().count() > MAX_TAG_LENGTH {
            return Err(FieldError::TooLong {
                field: "tag",
                max_length: MAX_TAG_LENGTH,
            });
        }
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    Ok(tags)
}
