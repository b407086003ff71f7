//! In-process TTL cache backed by `moka`.

use super::service::{CacheResult, CacheService};
use async_trait::async_trait;
use moka::future::Cache;
use moka::policy::Expiry;
use std::time::{Duration, Instant};

/// Upper bound on cached mappings before size-based eviction kicks in.
pub const DEFAULT_MAX_CAPACITY: u64 = 100_000;

#[derive(Clone)]
struct CachedUrl {
    url: String,
    ttl: Duration,
}

/// Expires each entry after the TTL it was written with.
struct PerEntryTtl;

impl Expiry<String, CachedUrl> for PerEntryTtl {
    fn expire_after_create(
        &self,
        _key: &String,
        value: &CachedUrl,
        _created_at: Instant,
    ) -> Option<Duration> {
        Some(value.ttl)
    }

    fn expire_after_update(
        &self,
        _key: &String,
        value: &CachedUrl,
        _updated_at: Instant,
        _duration_until_expiry: Option<Duration>,
    ) -> Option<Duration> {
        Some(value.ttl)
    }
}

/// Bounded in-process cache for single-node deployments and tests.
///
/// Expired entries are evicted by moka's housekeeping whether or not they are
/// read again.
pub struct MemoryCache {
    inner: Cache<String, CachedUrl>,
}

impl Default for MemoryCache {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_CAPACITY)
    }
}

impl MemoryCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(max_capacity: u64) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_capacity)
            .expire_after(PerEntryTtl)
            .build();
        Self { inner }
    }

    /// Number of live entries, after applying pending evictions.
    pub async fn len(&self) -> u64 {
        self.inner.run_pending_tasks().await;
        self.inner.entry_count()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        Ok(self.inner.get(short_code).await.map(|entry| entry.url))
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        if ttl.is_zero() {
            return Ok(());
        }

        self.inner
            .insert(
                short_code.to_string(),
                CachedUrl {
                    url: original_url.to_string(),
                    ttl,
                },
            )
            .await;
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        self.inner.invalidate(short_code).await;
        Ok(())
    }

    async fn exists(&self, short_code: &str) -> CacheResult<bool> {
        Ok(self.inner.contains_key(short_code))
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_set_get_invalidate() {
        let cache = MemoryCache::new();
        cache
            .set_url("abc", "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(
            cache.get_url("abc").await.unwrap().as_deref(),
            Some("https://example.com")
        );
        assert!(cache.exists("abc").await.unwrap());

        cache.invalidate("abc").await.unwrap();
        assert_eq!(cache.get_url("abc").await.unwrap(), None);
        assert!(!cache.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_zero_ttl_is_not_stored() {
        let cache = MemoryCache::new();
        cache
            .set_url("abc", "https://example.com", Duration::ZERO)
            .await
            .unwrap();

        assert!(cache.is_empty().await);
    }

    #[tokio::test]
    async fn test_entries_expire() {
        let cache = MemoryCache::new();
        cache
            .set_url("abc", "https://example.com", Duration::from_millis(20))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(cache.get_url("abc").await.unwrap(), None);
        assert!(!cache.exists("abc").await.unwrap());
    }

    #[tokio::test]
    async fn test_expired_entries_are_released_without_reads() {
        let cache = MemoryCache::new();
        for i in 0..1_000 {
            cache
                .set_url(&format!("k{i}"), "https://example.com", Duration::from_millis(1))
                .await
                .unwrap();
        }

        tokio::time::sleep(Duration::from_millis(50)).await;
        cache
            .set_url("fresh", "https://example.com", Duration::from_secs(60))
            .await
            .unwrap();

        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test]
    async fn test_rewrite_resets_ttl() {
        let cache = MemoryCache::new();
        cache
            .set_url("abc", "https://old.example.com", Duration::from_millis(20))
            .await
            .unwrap();
        cache
            .set_url("abc", "https://new.example.com", Duration::from_secs(60))
            .await
            .unwrap();

        tokio::time::sleep(Duration::from_millis(60)).await;

        assert_eq!(
            cache.get_url("abc").await.unwrap().as_deref(),
            Some("https://new.example.com")
        );
    }

    #[tokio::test]
    async fn test_invalidate_missing_key_is_ok() {
        let cache = MemoryCache::new();
        assert!(cache.invalidate("nope").await.is_ok());
    }
}
