//! DTOs for link creation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::application::services::{ShortenInput, ShortenOutcome};

/// Request body of `POST /api/v1/urls`.
///
/// Only `owner_id` is bounded here; URL, alias and TTL rules are enforced by
/// the service so they report their own error codes.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateUrlRequest {
    pub long_url: String,

    /// Optional custom short code. Empty means "generate one".
    pub custom_alias: Option<String>,

    /// Link lifetime in days; absent or non-positive means no expiry.
    pub ttl_days: Option<i64>,

    #[validate(length(max = 64))]
    pub owner_id: Option<String>,
}

impl From<CreateUrlRequest> for ShortenInput {
    fn from(req: CreateUrlRequest) -> Self {
        Self {
            long_url: req.long_url,
            custom_alias: req.custom_alias,
            ttl_days: req.ttl_days,
            owner_id: req.owner_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateUrlResponse {
    pub code: String,
    pub short_url: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

impl From<ShortenOutcome> for CreateUrlResponse {
    fn from(outcome: ShortenOutcome) -> Self {
        Self {
            code: outcome.code,
            short_url: outcome.short_url,
            expires_at: outcome.expires_at,
        }
    }
}
