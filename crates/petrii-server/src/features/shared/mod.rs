//! Shared utilities for feature modules
//!
//! - **validation**: input checks run before any store write
//! - **test_helpers**: in-memory application state for handler tests

pub mod validation;

#[cfg(test)]
pub mod test_helpers;

pub use validation::{
    normalize_email, parse_tags, validate_password, validate_required, FieldError,
};
