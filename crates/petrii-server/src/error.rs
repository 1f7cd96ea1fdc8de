//! Application error taxonomy and its HTTP mapping

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::api::response::ErrorResponse;

/// Result type alias for handlers
pub type AppResult<T> = std::result::Result<T, AppError>;

/// Every failure a client can observe.
///
/// Feature commands keep their own narrow error enums and convert into this
/// one at the route boundary.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("{0}")]
    Validation(String),

    #[error("Invalid email or password")]
    AuthenticationFailed,

    #[error("{0}")]
    Unauthenticated(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Your account is not approved yet")]
    NotApproved,

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    ContentTooLarge(String),

    /// Unclassified store or blob failure. The detail is logged, never sent.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::AuthenticationFailed | AppError::Unauthenticated(_) => {
                StatusCode::UNAUTHORIZED
            },
            AppError::Forbidden(_) | AppError::NotApproved => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ContentTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code carried in the error body
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::AuthenticationFailed => "AUTHENTICATION_FAILED",
            AppError::Unauthenticated(_) => "UNAUTHENTICATED",
            AppError::Forbidden(_) => "FORBIDDEN",
            AppError::NotApproved => "NOT_APPROVED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::ContentTooLarge(_) => "CONTENT_TOO_LARGE",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        AppError::Internal(err.to_string())
    }
}

impl From<crate::store::StoreError> for AppError {
    fn from(err: crate::store::StoreError) -> Self {
        AppError::internal(err)
    }
}

impl From<crate::auth::GuardError> for AppError {
    fn from(err: crate::auth::GuardError) -> Self {
        AppError::Forbidden(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let message = match &self {
            AppError::Internal(detail) => {
                tracing::error!(error = %detail, "Internal error");
                "An internal error occurred".to_string()
            },
            other => other.to_string(),
        };

        (status, Json(ErrorResponse::new(self.code(), message))).into_response()
    }
}
