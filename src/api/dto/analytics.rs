//! DTOs for link analytics.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::entities::LinkAnalytics;

/// Response body of `GET /api/v1/analytics/{code}`.
#[derive(Debug, Serialize)]
pub struct AnalyticsResponse {
    pub short_code: String,
    pub click_count: i64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_accessed: Option<DateTime<Utc>>,
}

impl From<LinkAnalytics> for AnalyticsResponse {
    fn from(analytics: LinkAnalytics) -> Self {
        Self {
            short_code: analytics.code,
            click_count: analytics.click_count,
            last_accessed: analytics.last_accessed,
        }
    }
}
