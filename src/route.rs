//! Route definitions for the URL shortener API
//!
//! This module configures all HTTP routes and maps them to their respective handlers.

use axum::routing::{delete, get};
use axum::{middleware, Router};

use crate::database::AppState;
use crate::handler::{create_short_url, delete_short_url, get_short_url, list_urls, redirect_url};
use crate::middleware::auth_middleware;

/// Creates and configures the Axum application router with all routes
///
/// # Route Definitions
///
/// - `GET /{key}` - Redirects to the original URL (public endpoint)
/// - `GET /api/urls` - Lists URLs with pagination
/// - `POST /api/urls` - Creates a new short URL
/// - `GET /api/urls/{key}` - Shows one short URL without counting a click
/// - `DELETE /api/{key}` - Deletes a short URL (optional ref_id ownership check)
///
/// # Example Usage
///
/// ```no_run
/// # use shortlink::config::Config;
/// # use shortlink::database::{init_db, AppState};
/// # use shortlink::route::create_app;
/// # let db = init_db("data.db").unwrap();
/// let state = AppState::new(db, Config::default());
/// let app = create_app(state);
/// // axum::serve(listener, app).await.unwrap();
/// ```
pub fn create_app(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/urls", get(list_urls).post(create_short_url))
        .route("/urls/{key}", get(get_short_url))
        .route("/{key}", delete(delete_short_url))
        .layer(middleware::from_fn_with_state(state.clone(), auth_middleware));

    Router::new()
        .route("/{key}", get(redirect_url))
        .nest("/api", api_routes)
        .with_state(state)
}
