use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    middleware,
    response::Response,
    routing::{get, put},
    Json, Router,
};

use crate::{
    api::response::ApiResponse,
    error::AppResult,
    features::FeatureState,
    middleware::{require_admin, require_session},
    models::UserId,
};

use super::commands::UpdateStatusCommand;

/// Every route here requires an admin session.
pub fn admin_routes(state: FeatureState) -> Router<FeatureState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/:id/status", put(update_status))
        .route("/datasets", get(list_datasets))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

/// List non-admin accounts
///
/// # Endpoint
/// `GET /admin/users`
async fn list_users(State(state): State<FeatureState>) -> AppResult<Response> {
    let users = super::queries::list_users::handle(state.users).await?;
    Ok(ApiResponse::success(users).with_status(StatusCode::OK))
}

/// Approve or reject an account
///
/// # Endpoint
/// `PUT /admin/users/:id/status`
///
/// # Request Body
/// ```json
/// { "status": "approved" }
/// ```
///
/// # Response
/// - 200: the updated profile
/// - 400: unknown status or disallowed transition
/// - 404: no such user
async fn update_status(
    State(state): State<FeatureState>,
    id: Result<Path<UserId>, PathRejection>,
    payload: Result<Json<UpdateStatusCommand>, JsonRejection>,
) -> AppResult<Response> {
    let Path(user_id) = id?;
    let Json(command) = payload?;
    let profile = super::commands::update_status::handle(state.users, user_id, command).await?;
    Ok(ApiResponse::success(profile).with_status(StatusCode::OK))
}

/// List every dataset with its owner
///
/// # Endpoint
/// `GET /admin/datasets`
async fn list_datasets(State(state): State<FeatureState>) -> AppResult<Response> {
    let datasets = super::queries::list_datasets::handle(state.users, state.datasets).await?;
    Ok(ApiResponse::success(datasets).with_status(StatusCode::OK))
}
