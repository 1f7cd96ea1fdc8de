//! Domain models
//!
//! Records here are storage-agnostic; the `store` module maps them to rows.

pub mod dataset;
pub mod user;

pub use dataset::{Dataset, DatasetId, DatasetView, FileRef, NewDataset, OwnerSummary};
pub use user::{
    NewUser, PublicProfile, Role, StatusTransitionError, User, UserId, UserStatus,
};

/// A stored enum column held a value this build does not know.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown {kind}: {value}")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}
