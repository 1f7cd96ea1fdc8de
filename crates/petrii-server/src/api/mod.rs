//! Router assembly and the server lifecycle

pub mod response;

use anyhow::Context;
use axum::{
    extract::{DefaultBodyLimit, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use std::{future::IntoFuture, net::SocketAddr, sync::Arc, time::Duration};
use tokio::{signal, sync::Notify};
use tower_http::services::ServeDir;
use tracing::info;

use crate::{
    auth::SessionManager,
    config::Config,
    db::Stores,
    features::{self, admin::ensure_admin, FeatureState},
    middleware,
    storage::{self, StorageBackend},
};

use response::ErrorResponse;

/// Build the full application router.
///
/// - `GET /` banner, `GET /health` store connectivity
/// - `/api/...` feature routes
/// - `/uploads/...` stored files (local backend only)
pub fn create_router(stores: Stores, state: FeatureState, config: &Config) -> Router {
    let mut app = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .with_state(stores)
        .nest("/api", features::router(state));

    if config.storage.backend == StorageBackend::Local {
        app = app.nest_service("/uploads", ServeDir::new(&config.storage.uploads_dir));
    }

    // Layers apply innermost first
    app.layer(DefaultBodyLimit::max(config.uploads.max_upload_bytes))
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(&config.cors))
}

/// Connect everything described by `config` and serve until a shutdown signal.
pub async fn serve(config: Config) -> anyhow::Result<()> {
    let stores = Stores::connect(&config.database)
        .await
        .context("Failed to open the credential and dataset stores")?;

    let blobs = storage::connect(&config.storage)
        .await
        .context("Failed to initialize blob storage")?;
    info!(backend = ?config.storage.backend, "Blob storage ready");

    if let Some(seed) = &config.admin {
        ensure_admin(stores.users.clone(), seed)
            .await
            .context("Failed to seed the admin account")?;
    }

    let sessions = Arc::new(
        SessionManager::from_config(&config.auth).context("Invalid session configuration")?,
    );
    let state = FeatureState::new(&stores, blobs, sessions, config.uploads);
    let app = create_router(stores.clone(), state, &config);

    let addr: SocketAddr = format!("{}:{}", config.server.host, config.server.port)
        .parse()
        .context("Invalid listen address")?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!(%addr, "Petrii server listening");

    let signalled = Arc::new(Notify::new());
    let server = axum::serve(listener, app)
        .with_graceful_shutdown({
            let signalled = signalled.clone();
            async move {
                shutdown_signal().await;
                signalled.notify_one();
            }
        })
        .into_future();

    let grace = Duration::from_secs(config.server.shutdown_timeout_secs);
    let result = tokio::select! {
        result = server => result.context("Server error"),
        _ = async {
            signalled.notified().await;
            tokio::time::sleep(grace).await;
        } => {
            tracing::warn!(grace_secs = grace.as_secs(), "Connections still open after grace period; closing");
            Ok(())
        },
    };

    stores.close().await;
    info!("Server shut down");
    result
}

async fn root() -> impl IntoResponse {
    Json(json!({
        "name": "Petrii Server",
        "version": env!("CARGO_PKG_VERSION"),
        "status": "running"
    }))
}

async fn health(State(stores): State<Stores>) -> Response {
    match stores.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "status": "healthy",
                "database": "connected"
            })),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Store health check failed");
            let error = ErrorResponse::new("SERVICE_UNAVAILABLE", "Database unavailable");
            (StatusCode::SERVICE_UNAVAILABLE, Json(error)).into_response()
        },
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            },
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            },
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, starting graceful shutdown"),
        _ = terminate => info!("Received terminate signal, starting graceful shutdown"),
    }
}
