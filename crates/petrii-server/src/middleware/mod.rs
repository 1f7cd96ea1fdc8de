//! HTTP middleware
//!
//! [`cors_layer`] and [`tracing_layer`] wrap the whole router. The session
//! and admin gates in [`auth`] are attached per route group.

use axum::http::{header, HeaderName, HeaderValue, Method};
use std::time::Duration;
use tower_http::{
    classify::{ServerErrorsAsFailures, SharedClassifier},
    cors::{AllowOrigin, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::Level;

use crate::config::CorsConfig;

pub mod auth;

pub use auth::{require_admin, require_session};

const CORS_METHODS: [Method; 5] = [
    Method::GET,
    Method::POST,
    Method::PUT,
    Method::DELETE,
    Method::OPTIONS,
];

const CORS_HEADERS: [HeaderName; 3] = [header::ACCEPT, header::CONTENT_TYPE, header::AUTHORIZATION];

/// Browsers may cache a preflight answer for an hour.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(60 * 60);

/// `None` means any origin. Entries that are not valid header values are skipped.
fn explicit_origins(config: &CorsConfig) -> Option<Vec<HeaderValue>> {
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return None;
    }

    let origins = config
        .allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin.trim()) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(%origin, "Skipping unparsable CORS origin");
                None
            },
        })
        .collect();
    Some(origins)
}

/// CORS policy for the browser client.
///
/// Credentials are only ever allowed together with an explicit origin list.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods(CORS_METHODS)
        .allow_headers(CORS_HEADERS)
        .max_age(PREFLIGHT_MAX_AGE);

    match explicit_origins(config) {
        Some(origins) => layer
            .allow_origin(AllowOrigin::list(origins))
            .allow_credentials(config.allow_credentials),
        None => layer.allow_origin(AllowOrigin::any()),
    }
}

/// Request spans at INFO with latency in microseconds; 5xx responses are logged as failures.
pub fn tracing_layer() -> TraceLayer<SharedClassifier<ServerErrorsAsFailures>> {
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO).latency_unit(LatencyUnit::Micros))
        .on_failure(DefaultOnFailure::new().level(Level::ERROR).latency_unit(LatencyUnit::Micros))
}
