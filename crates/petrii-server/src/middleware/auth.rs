//! Bearer session resolution
//!
//! `require_session` turns the `Authorization: Bearer <token>` header into an
//! [`Identity`] stored in request extensions. Handlers behind it read it with
//! `Extension<Identity>`. `require_admin` must run after it.

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{authorize, Check, Identity},
    error::AppError,
    features::FeatureState,
    models::{Role, UserStatus},
};

const NO_TOKEN: &str = "Not authorized, no token";
const BAD_TOKEN: &str = "Not authorized, token failed";

pub(crate) fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}

pub async fn require_session(
    State(state): State<FeatureState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(request.headers())
        .ok_or_else(|| AppError::Unauthenticated(NO_TOKEN.to_string()))?;

    let user_id = state
        .sessions
        .verify(token)
        .map_err(|_| AppError::Unauthenticated(BAD_TOKEN.to_string()))?;

    // The account may have been removed since the token was issued
    let user = state
        .users
        .find_by_id(user_id)
        .await?
        .ok_or_else(|| AppError::Unauthenticated(BAD_TOKEN.to_string()))?;

    if user.status != UserStatus::Approved {
        return Err(AppError::NotApproved);
    }

    request.extensions_mut().insert(Identity::from(&user));
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, AppError> {
    let identity = request
        .extensions()
        .get::<Identity>()
        .copied()
        .ok_or_else(|| AppError::Unauthenticated(NO_TOKEN.to_string()))?;

    authorize(identity, &[Check::HasRole(Role::Admin)])?;
    Ok(next.run(request).await)
}
