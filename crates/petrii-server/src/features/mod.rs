//! Feature modules implementing the Petrii API
//!
//! Each feature is a vertical slice with its own commands, queries and
//! routes:
//!
//! - **auth**: registration, login and the caller's own profile
//! - **admin**: account moderation and the global dataset listing
//! - **datasets**: upload, listing, search and deletion of the caller's datasets
//!
//! # Architecture
//!
//! - `commands/` - write operations, each with a `handle` function and its own error enum
//! - `queries/` - read operations
//! - `routes.rs` - HTTP bindings; errors convert into [`AppError`](crate::AppError)

pub mod admin;
pub mod auth;
pub mod datasets;
pub mod shared;

use axum::Router;
use std::sync::Arc;

use crate::{
    auth::SessionManager,
    config::UploadConfig,
    db::Stores,
    storage::BlobStore,
    store::{CredentialStore, DatasetStore},
};

/// Shared state for all feature routes
#[derive(Clone)]
pub struct FeatureState {
    pub users: Arc<dyn CredentialStore>,
    pub datasets: Arc<dyn DatasetStore>,
    pub blobs: Arc<dyn BlobStore>,
    pub sessions: Arc<SessionManager>,
    pub uploads: UploadConfig,
}

impl FeatureState {
    pub fn new(
        stores: &Stores,
        blobs: Arc<dyn BlobStore>,
        sessions: Arc<SessionManager>,
        uploads: UploadConfig,
    ) -> Self {
        Self {
            users: stores.users.clone(),
            datasets: stores.datasets.clone(),
            blobs,
            sessions,
            uploads,
        }
    }
}

/// Mount every feature under its own prefix:
/// - `/auth` - register, login, me
/// - `/admin` - moderation (admin role required)
/// - `/datasets` - the caller's datasets (session required)
pub fn router(state: FeatureState) -> Router<()> {
    Router::new()
        .nest("/auth", auth::auth_routes(state.clone()))
        .nest("/admin", admin::admin_routes(state.clone()))
        .nest("/datasets", datasets::datasets_routes(state.clone()))
        .with_state(state)
}
