//! Handler for link creation.

use axum::{Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{CreateUrlRequest, CreateUrlResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link.
///
/// # Endpoint
///
/// `POST /api/v1/urls` (rate limited per client)
///
/// # Request Body
///
/// ```json
/// { "long_url": "https://example.com/page", "custom_alias": "promo", "ttl_days": 30 }
/// ```
///
/// # Response
///
/// `201 Created`
///
/// ```json
/// { "code": "promo", "short_url": "http://localhost:8080/promo", "expires_at": "..." }
/// ```
///
/// # Errors
///
/// - 400 for invalid URL, alias or TTL
/// - 409 if the alias is taken
/// - 429 if the client exceeded its creation quota
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    payload.validate()?;

    let outcome = state.link_service.shorten(payload.into()).await?;

    Ok((StatusCode::CREATED, Json(outcome.into())))
}
