//! Handler for per-link analytics.

use axum::{
    Json,
    extract::{Path, State},
};

use crate::api::dto::analytics::AnalyticsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Returns click count and last access time of a short code.
///
/// # Endpoint
///
/// `GET /api/v1/analytics/{code}`
///
/// Read directly from the database; counters lag redirects slightly since
/// clicks are applied asynchronously.
///
/// # Errors
///
/// Returns 404 Not Found if the code does not exist.
pub async fn analytics_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let analytics = state.link_service.get_analytics(&code).await?;

    Ok(Json(analytics.into()))
}
