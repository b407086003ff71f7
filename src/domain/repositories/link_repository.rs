//! Repository trait for the durable link store.

use crate::domain::entities::{LinkAnalytics, NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Durable, authoritative storage for short links.
///
/// The store owns the two atomicity guarantees the service relies on: a
/// monotonically increasing id sequence and a uniqueness constraint on the
/// short code column.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Allocates the next surrogate id. Values are never reused.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Unavailable`] or [`AppError::Internal`] on database errors.
    async fn allocate_id(&self) -> Result<i64, AppError>;

    /// Inserts a new link and returns the stored row.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Conflict`] if the short code already exists.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Finds a link that has not expired at `now`.
    ///
    /// Expired rows that have not been purged yet are reported as `None`.
    async fn find_active(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError>;

    /// Checks whether a code is taken, expired rows included.
    async fn exists(&self, code: &str) -> Result<bool, AppError>;

    /// Adds one click and moves `last_accessed` forward to `accessed_at`.
    ///
    /// Concurrent increments for the same code commute.
    async fn increment_clicks(&self, code: &str, accessed_at: DateTime<Utc>)
    -> Result<(), AppError>;

    /// Reads the committed click counters of a code.
    async fn read_analytics(&self, code: &str) -> Result<Option<LinkAnalytics>, AppError>;

    /// Deletes every link expired at `now`, returning the removed codes.
    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError>;

    /// Verifies connectivity with the store.
    async fn ping(&self) -> Result<(), AppError>;
}
