//! Petrii Server Library
//!
//! HTTP service behind the Petrii research data repository. Researchers
//! register, wait for an administrator to approve them, then upload labelled
//! files ("datasets") that they can list, search and delete.
//!
//! # Layout
//!
//! - **models**: users, datasets and the account status state machine
//! - **store**: persistence ports (`CredentialStore`, `DatasetStore`) with
//!   PostgreSQL and in-memory implementations
//! - **db**: connection handle that owns the store lifecycle
//! - **storage**: blob storage for uploaded files (local directory or S3)
//! - **auth**: password hashing, session tokens and authorization guards
//! - **search**: indexed-text construction and query matching
//! - **features**: vertical slices (`auth`, `admin`, `datasets`), each with
//!   `commands/`, `queries/` and `routes.rs`
//! - **api** / **middleware**: router assembly, response envelope, CORS,
//!   tracing and bearer-session resolution
//!
//! # Example
//!
//! ```no_run
//! use petrii_server::{api, config::Config};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     api::serve(config).await
//! }
//! ```

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;
pub mod models;
pub mod search;
pub mod storage;
pub mod store;

pub use error::{AppError, AppResult};
