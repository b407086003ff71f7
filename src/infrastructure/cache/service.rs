//! Cache service trait and error types.

use async_trait::async_trait;
use std::time::Duration;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),
    #[error("Cache operation error: {0}")]
    Operation(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Derived, non-authoritative store of `code -> target URL` mappings.
///
/// Callers treat every error as a miss: a cache failure must never fail a
/// request. Entries carry their own TTL, which the caller derives from the
/// link's expiry so a cached mapping never outlives its record.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::RedisCache`] - Redis-backed cache
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process moka cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Returns the cached target URL, `Ok(None)` on miss.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Stores a mapping that expires after `ttl`.
    ///
    /// A zero `ttl` stores nothing.
    async fn set_url(&self, short_code: &str, original_url: &str, ttl: Duration)
    -> CacheResult<()>;

    /// Removes a cached mapping. Removing a missing key is not an error.
    async fn invalidate(&self, short_code: &str) -> CacheResult<()>;

    async fn exists(&self, short_code: &str) -> CacheResult<bool>;

    /// Checks if the cache backend is reachable.
    async fn health_check(&self) -> bool;
}
