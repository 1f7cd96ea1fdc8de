//! Petrii Server - Main entry point

use anyhow::Result;
use petrii_common::logging::{init_logging, LogConfig};
use tracing::info;

use petrii_server::{api, config::Config};

#[tokio::main]
async fn main() -> Result<()> {
    // Environment variables override these defaults
    let log_config = LogConfig::builder()
        .log_file_prefix("petrii-server")
        .filter_directives("petrii_server=debug,tower_http=info,sqlx=warn")
        .build()
        .merge_env()?;

    let _guard = init_logging(&log_config)?;

    info!(version = env!("CARGO_PKG_VERSION"), "Starting Petrii server");

    let config = Config::load()?;
    info!(
        host = %config.server.host,
        port = config.server.port,
        storage = ?config.storage.backend,
        "Configuration loaded"
    );

    api::serve(config).await
}
