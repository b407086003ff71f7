//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

/// A cache that never stores anything.
///
/// Used when Redis is not configured or unreachable at startup. Every
/// lookup misses, so all resolutions go to the durable store.
pub struct NullCache;

impl NullCache {
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get_url(&self, _short_code: &str) -> CacheResult<Option<String>> {
        Ok(None)
    }

    async fn set_url(
        &self,
        _short_code: &str,
        _original_url: &str,
        _ttl: Duration,
    ) -> CacheResult<()> {
        Ok(())
    }

    async fn invalidate(&self, _short_code: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn exists(&self, _short_code: &str) -> CacheResult<bool> {
        Ok(false)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_null_cache_always_misses() {
        let cache = NullCache::new();
        cache
            .set_url("abc", "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.get_url("abc").await.unwrap(), None);
        assert!(!cache.exists("abc").await.unwrap());
        assert!(cache.health_check().await);
    }
}
