use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, post},
    Extension, Json, Router,
};

use crate::{
    api::response::ApiResponse,
    auth::Identity,
    error::AppResult,
    features::FeatureState,
    middleware::require_session,
};

use super::commands::{LoginCommand, RegisterCommand};

pub fn auth_routes(state: FeatureState) -> Router<FeatureState> {
    let protected = Router::new()
        .route("/me", get(me))
        .route_layer(middleware::from_fn_with_state(state, require_session));

    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .merge(protected)
}

/// Register a researcher account
///
/// # Endpoint
/// `POST /auth/register`
///
/// # Request Body
/// ```json
/// { "name": "Ann", "email": "ann@x.com", "password": "secret1" }
/// ```
///
/// # Response
/// - 201: profile with `status: "pending"`; no token
/// - 400: validation error
/// - 409: email already registered
async fn register(
    State(state): State<FeatureState>,
    payload: Result<Json<RegisterCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = payload?;
    let profile = super::commands::register::handle(state.users, command).await?;
    Ok(ApiResponse::success(profile).with_status(StatusCode::CREATED))
}

/// Log in
///
/// # Endpoint
/// `POST /auth/login`
///
/// # Response
/// - 200: profile plus `token` and `expiresAt`
/// - 401: bad credentials
/// - 403: account not approved
async fn login(
    State(state): State<FeatureState>,
    payload: Result<Json<LoginCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Json(command) = payload?;
    let response = super::commands::login::handle(state.users, &state.sessions, command).await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}

/// Current session's profile
///
/// # Endpoint
/// `GET /auth/me`
async fn me(
    State(state): State<FeatureState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Response> {
    let profile = super::queries::me::handle(state.users, identity.user_id).await?;
    Ok(ApiResponse::success(profile).with_status(StatusCode::OK))
}
