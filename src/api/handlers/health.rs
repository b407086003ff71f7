//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Database**: `SELECT 1`
/// 2. **Cache**: backend PING
/// 3. **Click Queue**: channel open, remaining capacity
/// 4. **Rate Limiter**: tracked client count
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let database = check_database(&state).await;
    let cache = check_cache(&state).await;
    let click_queue = check_click_queue(&state);
    let rate_limiter = check_rate_limiter(&state);

    let all_healthy =
        database.is_ok() && cache.is_ok() && click_queue.is_ok() && rate_limiter.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            database,
            cache,
            click_queue,
            rate_limiter,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

async fn check_database(state: &AppState) -> CheckStatus {
    match state.link_service.check_store().await {
        Ok(()) => CheckStatus::ok("Connected"),
        Err(e) => CheckStatus::error(format!("Database error: {e}")),
    }
}

async fn check_cache(state: &AppState) -> CheckStatus {
    if state.cache.health_check().await {
        CheckStatus::ok("Cache reachable")
    } else {
        CheckStatus::error("Cache connection failed")
    }
}

fn check_click_queue(state: &AppState) -> CheckStatus {
    if state.click_sender.is_closed() {
        CheckStatus::error("Click queue is closed")
    } else {
        CheckStatus::ok(format!(
            "Free capacity: {}/{}",
            state.click_sender.capacity(),
            state.click_sender.max_capacity()
        ))
    }
}

fn check_rate_limiter(state: &AppState) -> CheckStatus {
    CheckStatus::ok(format!(
        "Tracking {} clients, {} requests per {}s",
        state.rate_limiter.tracked_identities(),
        state.rate_limit.requests_per_window,
        state.rate_limiter.window().as_secs()
    ))
}
