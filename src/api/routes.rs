//! API route configuration.

use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::api::handlers::{analytics_handler, shorten_handler};
use crate::api::middleware::rate_limit;
use crate::state::AppState;

/// Versioned API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /v1/urls`                - Create a short link (rate limited)
/// - `GET  /v1/analytics/{code}`    - Click statistics for a link
pub fn api_routes(state: AppState) -> Router<AppState> {
    let create = Router::new()
        .route("/v1/urls", post(shorten_handler))
        .route_layer(middleware::from_fn_with_state(state, rate_limit::layer));

    Router::new()
        .merge(create)
        .route("/v1/analytics/{code}", get(analytics_handler))
}
