//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its target URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// Resolution goes through [`crate::application::services::LinkService::resolve`]:
/// cache first, then the database. The click is counted in the background.
///
/// # Errors
///
/// Returns 404 Not Found for unknown, expired or malformed codes.
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let target = state.link_service.resolve(&code).await?;

    Ok((StatusCode::FOUND, [(header::LOCATION, target)]))
}
