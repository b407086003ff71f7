//! Top-level router combining the API, redirect and health routes.
//!
//! # Route Structure
//!
//! - `GET  /{code}`                    - Short link redirect
//! - `GET  /health`                    - Health check: DB, cache, click queue, rate limiter
//! - `POST /api/v1/urls`               - Create a short link (rate limited)
//! - `GET  /api/v1/analytics/{code}`   - Link analytics
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, `GET`/`POST`/`OPTIONS`
//! - **Timeout** - Per-request deadline, `408` when exceeded
//! - **Rate limiting** - Fixed window per client, creation only
//!
//! Trailing slashes are trimmed by the server before routing, see
//! [`crate::server::run`].

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::timeout::TimeoutLayer;

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler};
use crate::api::middleware::{cors, tracing};
use crate::state::AppState;

/// Constructs the application router with all routes and middleware.
///
/// Requests running longer than `request_timeout` are aborted; dropping the
/// handler future cancels its in-flight database and cache calls.
pub fn app_router(state: AppState, request_timeout: Duration) -> Router {
    let timeout = TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout);

    Router::new()
        .route("/health", get(health_handler))
        .route("/{code}", get(redirect_handler))
        .nest("/api", api::routes::api_routes(state.clone()))
        .with_state(state)
        .layer(timeout)
        .layer(cors::layer())
        .layer(tracing::layer())
}
