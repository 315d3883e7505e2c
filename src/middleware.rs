//! Authorization middleware for the `/api` routes

use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::database::AppState;
use crate::error::AppError;

/// Middleware to check the Authorization header on `/api` routes
///
/// When `Config::auth_token` is set, the request must carry an
/// `Authorization` header with exactly that value. Without a configured
/// token the check is skipped.
pub async fn auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, AppError> {
    if let Some(secret) = state.config.auth_token.as_deref() {
        let provided = headers.get(AUTHORIZATION).and_then(|v| v.to_str().ok());
        if provided != Some(secret) {
            tracing::debug!(path = %request.uri().path(), "rejected unauthorized api request");
            return Err(AppError::Unauthorized);
        }
    }

    Ok(next.run(request).await)
}
