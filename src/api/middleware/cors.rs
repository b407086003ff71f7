//! CORS policy for browser clients.

use axum::http::{Method, header};
use tower_http::cors::{Any, CorsLayer};

/// Allows any origin to call the public API with `GET`, `POST` and `OPTIONS`.
///
/// No credentials are involved, so a wildcard origin is safe.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
}
