//! Credentials, sessions and authorization
//!
//! - `password`: salted argon2 hashing
//! - `session`: signed, time-bounded session tokens
//! - `guard`: pure authorization checks over a resolved [`Identity`]

pub mod guard;
pub mod password;
pub mod session;

pub use guard::{authorize, Check, GuardError, Identity};
pub use session::{SessionError, SessionManager};
