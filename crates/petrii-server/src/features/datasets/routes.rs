use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        rejection::{PathRejection, QueryRejection},
        Multipart, Path, Query, State,
    },
    http::StatusCode,
    middleware,
    response::Response,
    routing::{delete, get, post},
    Extension, Router,
};

use crate::{
    api::response::ApiResponse,
    auth::Identity,
    error::{AppError, AppResult},
    features::FeatureState,
    middleware::require_session,
    models::DatasetId,
};

use super::{
    commands::{DeleteDatasetCommand, DeleteDatasetError, UploadDatasetCommand},
    queries::SearchDatasetsQuery,
};

/// Every route here requires a session.
pub fn datasets_routes(state: FeatureState) -> Router<FeatureState> {
    Router::new()
        .route("/", get(list_datasets))
        .route("/upload", post(upload_dataset))
        .route("/search", get(search_datasets))
        .route("/:id", delete(delete_dataset))
        .route_layer(middleware::from_fn_with_state(state, require_session))
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::ContentTooLarge(err.body_text())
    } else {
        AppError::Validation(err.body_text())
    }
}

/// Upload a dataset
///
/// # Endpoint
/// `POST /datasets/upload` (multipart/form-data)
///
/// # Fields
/// - `file`: the data file (required, non-empty)
/// - `title`, `author`, `experimentType`: required text
/// - `tags`: comma-separated, optional
///
/// # Response
/// - 201: the dataset record
/// - 400: missing field or empty file
/// - 413: request body or indexed record too large
async fn upload_dataset(
    State(state): State<FeatureState>,
    Extension(identity): Extension<Identity>,
    multipart: Result<Multipart, MultipartRejection>,
) -> AppResult<Response> {
    let mut multipart = multipart.map_err(|e| AppError::Validation(e.body_text()))?;
    let mut command = UploadDatasetCommand {
        owner_id: identity.user_id,
        ..Default::default()
    };

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                command.filename = field.file_name().map(str::to_string);
                command.content_type = field.content_type().map(str::to_string);
                command.content = Some(field.bytes().await.map_err(multipart_error)?.to_vec());
            },
            "title" => command.title = field.text().await.map_err(multipart_error)?,
            "author" => command.author = field.text().await.map_err(multipart_error)?,
            "experimentType" => {
                command.experiment_type = field.text().await.map_err(multipart_error)?
            },
            "tags" => command.tags = field.text().await.map_err(multipart_error)?,
            other => tracing::debug!(field = %other, "Ignoring unknown multipart field"),
        }
    }

    let view = super::commands::upload::handle(state.datasets, state.blobs, state.uploads, command).await?;
    Ok(ApiResponse::success(view).with_status(StatusCode::CREATED))
}

/// List the caller's datasets
///
/// # Endpoint
/// `GET /datasets`
async fn list_datasets(
    State(state): State<FeatureState>,
    Extension(identity): Extension<Identity>,
) -> AppResult<Response> {
    let views = super::queries::list::handle(state.datasets, identity.user_id).await?;
    Ok(ApiResponse::success(views).with_status(StatusCode::OK))
}

/// Search the caller's datasets
///
/// # Endpoint
/// `GET /datasets/search?q=gamma`
///
/// # Response
/// - 200: matching datasets, best match first
/// - 400: `q` missing
async fn search_datasets(
    State(state): State<FeatureState>,
    Extension(identity): Extension<Identity>,
    query: Result<Query<SearchDatasetsQuery>, QueryRejection>,
) -> AppResult<Response> {
    let Query(query) = query?;
    let views = super::queries::search::handle(state.datasets, identity.user_id, query).await?;
    Ok(ApiResponse::success(views).with_status(StatusCode::OK))
}

/// Delete one of the caller's datasets
///
/// # Endpoint
/// `DELETE /datasets/:id`
///
/// # Response
/// - 200: `{ "id": "...", "deleted": true }`
/// - 403: dataset belongs to someone else
/// - 404: no such dataset, or an id that is not a dataset id
async fn delete_dataset(
    State(state): State<FeatureState>,
    Extension(identity): Extension<Identity>,
    id: Result<Path<DatasetId>, PathRejection>,
) -> AppResult<Response> {
    // No dataset can carry an id that does not parse
    let Path(dataset_id) = id.map_err(|_| AppError::from(DeleteDatasetError::NotFound))?;
    let command = DeleteDatasetCommand {
        dataset_id,
        requester: identity,
    };
    let response = super::commands::delete::handle(state.datasets, state.blobs, command).await?;
    Ok(ApiResponse::success(response).with_status(StatusCode::OK))
}
