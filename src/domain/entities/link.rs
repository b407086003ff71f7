//! Short link entity and its insert/analytics companions.

use chrono::{DateTime, Utc};

/// A stored mapping from a short code to a target URL.
///
/// `id` is the row's surrogate key. For generated codes it is the counter
/// value the code was derived from, so `base62::decode(code) == id`.
#[derive(Debug, Clone)]
pub struct ShortLink {
    pub id: i64,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
    pub click_count: i64,
    pub last_accessed: Option<DateTime<Utc>>,
}

impl ShortLink {
    /// Creates a freshly inserted link with no recorded clicks.
    pub fn new(
        id: i64,
        code: String,
        long_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        owner_id: Option<String>,
    ) -> Self {
        Self {
            id,
            code,
            long_url,
            created_at,
            expires_at,
            owner_id,
            click_count: 0,
            last_accessed: None,
        }
    }

    /// Returns true once `now` has reached the expiry time.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|e| now >= e)
    }

    pub fn analytics(&self) -> LinkAnalytics {
        LinkAnalytics {
            code: self.code.clone(),
            click_count: self.click_count,
            last_accessed: self.last_accessed,
        }
    }
}

/// Input data for inserting a new link.
///
/// `id` is set for generated codes (the allocated counter value) and left
/// empty for custom aliases, which take the next sequence value.
#[derive(Debug, Clone)]
pub struct NewShortLink {
    pub id: Option<i64>,
    pub code: String,
    pub long_url: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    pub owner_id: Option<String>,
}

/// Usage counters for a short code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkAnalytics {
    pub code: String,
    pub click_count: i64,
    pub last_accessed: Option<DateTime<Utc>>,
}
