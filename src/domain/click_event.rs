//! Click event model for asynchronous click tracking.

use chrono::{DateTime, Utc};

/// A successful resolution waiting to be counted.
///
/// Created by [`crate::application::services::LinkService::resolve`] and
/// handed to [`crate::domain::click_worker::run_click_worker`] over a bounded
/// channel, so the redirect never waits on the counter write.
#[derive(Debug, Clone)]
pub struct ClickEvent {
    pub code: String,
    pub accessed_at: DateTime<Utc>,
}

impl ClickEvent {
    pub fn new(code: impl Into<String>, accessed_at: DateTime<Utc>) -> Self {
        Self {
            code: code.into(),
            accessed_at,
        }
    }

    /// A click observed right now.
    pub fn now(code: impl Into<String>) -> Self {
        Self::new(code, Utc::now())
    }
}
