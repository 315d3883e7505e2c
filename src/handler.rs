//! HTTP request handlers for the URL shortener API
//!
//! Handlers are thin: they unpack the request, call the [`LinkService`] and
//! turn its result into a response. Errors render through [`AppError`].
//!
//! [`LinkService`]: crate::service::LinkService

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Redirect},
    Json,
};
use chrono::Utc;
use serde_json::json;

use crate::database::AppState;
use crate::error::AppError;
use crate::model::{DeleteParams, ListParams, NewShortUrl, ShortUrlDto};

/// Creates a new short URL
///
/// # Request Body
///
/// ```json
/// {
///   "url": "https://example.com/very/long/url",
///   "ref_id": "user_123",
///   "is_private": false,
///   "expiration_in_days": 7
/// }
/// ```
///
/// # Response
///
/// - **201 Created** - `ShortUrlDto` of the new link
/// - **400 Bad Request** - `expiration_in_days` is zero or out of range
pub async fn create_short_url(
    State(state): State<AppState>,
    Json(payload): Json<NewShortUrl>,
) -> Result<impl IntoResponse, AppError> {
    let record = state.links.create(payload, Utc::now())?;
    let dto = ShortUrlDto::from_entity(&record, &state.config.base_url);

    Ok((StatusCode::CREATED, Json(dto)))
}

/// Redirects a short URL to its original destination
///
/// # Response
///
/// - **307 Temporary Redirect** - Redirects to the original URL
/// - **404 Not Found** - Key is malformed or unknown
/// - **410 Gone** - The link has expired
///
/// A temporary redirect keeps browsers from caching the target, so every
/// visit reaches the server and is counted.
pub async fn redirect_url(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Redirect, AppError> {
    let record = state.links.resolve(&key, Utc::now())?;
    Ok(Redirect::temporary(&record.original_url))
}

/// Returns the details of one short URL without counting a click
pub async fn get_short_url(
    Path(key): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ShortUrlDto>, AppError> {
    let record = state.links.find(&key)?;
    Ok(Json(ShortUrlDto::from_entity(&record, &state.config.base_url)))
}

/// Lists URLs with pagination, optionally filtered by ref_id
///
/// # Example Request
///
/// `GET /api/urls?ref_id=user_123&page=2&limit=20`
///
/// # Response
///
/// ```json
/// {
///   "page": 2,
///   "limit": 20,
///   "total_fetched": 15,
///   "data": [...]
/// }
/// ```
pub async fn list_urls(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let page = state.links.list(&params)?;
    let base_url = &state.config.base_url;

    Ok(Json(page.map(|record| ShortUrlDto::from_entity(&record, base_url))))
}

/// Deletes a short URL with optional ownership verification
///
/// # Example Request
///
/// `DELETE /api/bM?ref_id=user_123`
///
/// # Response
///
/// - **200 OK** - URL successfully deleted
/// - **404 Not Found** - URL does not exist
/// - **403 Forbidden** - ref_id does not match the owner
pub async fn delete_short_url(
    Path(key): Path<String>,
    State(state): State<AppState>,
    Query(params): Query<DeleteParams>,
) -> Result<impl IntoResponse, AppError> {
    let ref_id = params.ref_id.as_deref().filter(|r| !r.is_empty());
    let record = state.links.delete(&key, ref_id)?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "message": "Short link deleted successfully",
            "deleted_id": record.short_key
        })),
    ))
}
