//! Redis-backed cache implementation.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use std::time::Duration;
use tracing::{debug, info};

const KEY_PREFIX: &str = "url:";

/// Redis cache for fast redirect lookups.
///
/// Uses `ConnectionManager`, which multiplexes a single connection and
/// reconnects transparently. Errors are returned to the caller, which
/// degrades them to a miss.
pub struct RedisCache {
    client: ConnectionManager,
}

impl RedisCache {
    /// Connects to Redis and validates the connection with a PING.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid, the connection cannot
    /// be established, or the PING fails.
    pub async fn connect(redis_url: &str) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Failed to create Redis client: {e}")))?;

        let manager = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {e}")))?;

        let mut test_conn = manager.clone();
        test_conn
            .ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {e}")))?;

        info!("✓ Connected to Redis");

        Ok(Self { client: manager })
    }

    fn build_key(short_code: &str) -> String {
        format!("{KEY_PREFIX}{short_code}")
    }
}

fn op_error(op: &str, e: redis::RedisError) -> CacheError {
    CacheError::Operation(format!("Redis {op} failed: {e}"))
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let mut conn = self.client.clone();
        let url: Option<String> = conn
            .get(Self::build_key(short_code))
            .await
            .map_err(|e| op_error("GET", e))?;

        debug!(code = short_code, hit = url.is_some(), "cache lookup");
        Ok(url)
    }

    async fn set_url(
        &self,
        short_code: &str,
        original_url: &str,
        ttl: Duration,
    ) -> CacheResult<()> {
        let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
        if ttl_ms == 0 {
            return Ok(());
        }

        let mut conn = self.client.clone();
        conn.pset_ex::<_, _, ()>(Self::build_key(short_code), original_url, ttl_ms)
            .await
            .map_err(|e| op_error("PSETEX", e))?;

        debug!(code = short_code, ttl_ms, "cache set");
        Ok(())
    }

    async fn invalidate(&self, short_code: &str) -> CacheResult<()> {
        let mut conn = self.client.clone();
        let deleted: i64 = conn
            .del(Self::build_key(short_code))
            .await
            .map_err(|e| op_error("DEL", e))?;

        if deleted > 0 {
            debug!(code = short_code, "cache invalidated");
        }
        Ok(())
    }

    async fn exists(&self, short_code: &str) -> CacheResult<bool> {
        let mut conn = self.client.clone();
        conn.exists(Self::build_key(short_code))
            .await
            .map_err(|e| op_error("EXISTS", e))
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.client.clone();
        conn.ping::<()>().await.is_ok()
    }
}
