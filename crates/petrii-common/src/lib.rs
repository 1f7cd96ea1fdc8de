//! Petrii Common Library
//!
//! Shared utilities for the Petrii workspace members:
//!
//! - **Logging**: tracing subscriber bootstrap driven by environment variables
//! - **Checksums**: content digests recorded alongside stored uploads
//!
//! # Example
//!
//! ```no_run
//! use petrii_common::logging::{init_logging, LogConfig};
//!
//! fn main() -> anyhow::Result<()> {
//!     let _guard = init_logging(&LogConfig::from_env()?)?;
//!     tracing::info!("ready");
//!     Ok(())
//! }
//! ```

#![deny(clippy::unwrap_used, clippy::expect_used)]

pub mod checksum;
pub mod logging;

pub use checksum::sha256_hex;
