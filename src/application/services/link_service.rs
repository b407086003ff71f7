//! Short link creation, resolution and analytics.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde_json::json;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::entities::{LinkAnalytics, NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::alias::{is_reserved, is_well_formed_code, validate_custom_alias};
use crate::utils::base62;
use crate::utils::url_validator::validate_target_url;

/// Longest accepted link lifetime.
pub const MAX_TTL_DAYS: i64 = 36_500;

/// Id allocations tried before giving up on a generated code.
pub const MAX_GENERATION_ATTEMPTS: usize = 8;

/// Parameters of a shorten request.
#[derive(Debug, Clone, Default)]
pub struct ShortenInput {
    pub long_url: String,
    pub custom_alias: Option<String>,
    pub ttl_days: Option<i64>,
    pub owner_id: Option<String>,
}

/// Result of a successful shorten request.
#[derive(Debug, Clone)]
pub struct ShortenOutcome {
    pub code: String,
    pub short_url: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Orchestrates the durable store, the cache and the click queue.
///
/// Generated codes are the Base62 encoding of an id taken from the store's
/// sequence, so they never repeat. Custom aliases rely on the store's
/// uniqueness constraint. Reads go cache first and repopulate the cache on a
/// store hit; a cached entry never outlives its link's expiry.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    click_sender: mpsc::Sender<ClickEvent>,
    base_url: String,
    cache_horizon: Duration,
}

impl LinkService {
    /// Creates a new link service.
    ///
    /// `cache_horizon` is the TTL of cached entries for links without expiry.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        click_sender: mpsc::Sender<ClickEvent>,
        base_url: impl Into<String>,
        cache_horizon: Duration,
    ) -> Self {
        Self {
            repository,
            cache,
            click_sender,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            cache_horizon,
        }
    }

    /// Creates a short link.
    ///
    /// Input is fully validated before any id is allocated or row written.
    ///
    /// # Errors
    ///
    /// - [`AppError::Validation`] with `invalid_url`, `invalid_alias` or `invalid_ttl`
    /// - [`AppError::Conflict`] with `alias_taken` if the custom alias exists
    /// - [`AppError::Internal`] if no free generated code was found
    /// - store errors from [`LinkRepository`]
    pub async fn shorten(&self, input: ShortenInput) -> Result<ShortenOutcome, AppError> {
        let long_url = input.long_url.trim();
        validate_target_url(long_url)?;

        let alias = input
            .custom_alias
            .as_deref()
            .map(str::trim)
            .filter(|a| !a.is_empty());
        if let Some(alias) = alias {
            validate_custom_alias(alias)?;
        }

        let now = Utc::now();
        let expires_at = expiry_from_ttl(input.ttl_days, now)?;

        let link = match alias {
            Some(alias) => {
                if self.repository.exists(alias).await? {
                    return Err(AppError::alias_taken(alias));
                }

                let new_link = NewShortLink {
                    id: None,
                    code: alias.to_string(),
                    long_url: long_url.to_string(),
                    created_at: now,
                    expires_at,
                    owner_id: input.owner_id,
                };

                // The pre-check can race with another request; the constraint decides.
                self.repository
                    .insert(new_link)
                    .await
                    .map_err(|e| match e {
                        AppError::Conflict { .. } => AppError::alias_taken(alias),
                        other => other,
                    })?
            }
            None => {
                self.insert_generated(long_url, now, expires_at, input.owner_id)
                    .await?
            }
        };

        metrics::counter!("shortener_links_created_total").increment(1);
        info!(code = %link.code, custom = alias.is_some(), "short link created");

        self.populate_cache(&link.code, &link.long_url, link.expires_at, now)
            .await;

        Ok(ShortenOutcome {
            short_url: self.short_url(&link.code),
            code: link.code,
            expires_at: link.expires_at,
        })
    }

    /// Resolves a short code to its target URL and queues a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown, expired or malformed codes.
    pub async fn resolve(&self, code: &str) -> Result<String, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        let now = Utc::now();
        let target = self
            .lookup_target(code, now)
            .await?
            .ok_or_else(|| AppError::link_not_found(code))?;

        self.record_click(code, now);
        Ok(target)
    }

    /// Reads the click counters of a code directly from the store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn get_analytics(&self, code: &str) -> Result<LinkAnalytics, AppError> {
        if !is_well_formed_code(code) {
            return Err(AppError::link_not_found(code));
        }

        self.repository
            .read_analytics(code)
            .await?
            .ok_or_else(|| AppError::link_not_found(code))
    }

    /// Verifies the durable store is reachable.
    pub async fn check_store(&self) -> Result<(), AppError> {
        self.repository.ping().await
    }

    /// Builds the public short URL for a code.
    pub fn short_url(&self, code: &str) -> String {
        format!("{}/{}", self.base_url, code)
    }

    /// Cache first, then the store. A store hit is written back to the cache.
    async fn lookup_target(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<String>, AppError> {
        match self.cache.get_url(code).await {
            Ok(Some(url)) => {
                metrics::counter!("shortener_cache_hits_total").increment(1);
                debug!(code, "cache hit");
                return Ok(Some(url));
            }
            Ok(None) => {}
            Err(e) => warn!(code, error = %e, "cache read failed, falling back to store"),
        }

        metrics::counter!("shortener_cache_misses_total").increment(1);

        let Some(link) = self
            .repository
            .find_active(code, now)
            .await?
            .filter(|link| !link.is_expired_at(now))
        else {
            return Ok(None);
        };

        self.populate_cache(&link.code, &link.long_url, link.expires_at, now)
            .await;

        Ok(Some(link.long_url))
    }

    async fn insert_generated(
        &self,
        long_url: &str,
        now: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
        owner_id: Option<String>,
    ) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let id = self.repository.allocate_id().await?;
            let Ok(counter) = u64::try_from(id) else {
                return Err(AppError::internal(
                    "Allocated id is negative",
                    json!({ "id": id }),
                ));
            };

            let code = base62::encode(counter);
            // Route names such as `health` would never reach the redirect.
            if is_reserved(&code) {
                warn!(attempt, id, code = %code, "generated code is a reserved route, skipping");
                continue;
            }

            let new_link = NewShortLink {
                id: Some(id),
                code,
                long_url: long_url.to_string(),
                created_at: now,
                expires_at,
                owner_id: owner_id.clone(),
            };

            match self.repository.insert(new_link).await {
                Ok(link) => return Ok(link),
                // A custom alias already holds this code; take the next id.
                Err(AppError::Conflict { details, .. }) => {
                    warn!(attempt, id, ?details, "generated code collides with an alias");
                }
                Err(e) => return Err(e),
            }
        }

        Err(AppError::internal(
            "Failed to generate unique code",
            json!({ "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }

    /// Writes a mapping to the cache. Failures are logged and ignored.
    async fn populate_cache(
        &self,
        code: &str,
        long_url: &str,
        expires_at: Option<DateTime<Utc>>,
        now: DateTime<Utc>,
    ) {
        let Some(ttl) = cache_ttl(expires_at, now, self.cache_horizon) else {
            return;
        };

        if let Err(e) = self.cache.set_url(code, long_url, ttl).await {
            warn!(code, error = %e, "failed to populate cache");
        }
    }

    fn record_click(&self, code: &str, accessed_at: DateTime<Utc>) {
        match self.click_sender.try_send(ClickEvent::new(code, accessed_at)) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                metrics::counter!("shortener_clicks_dropped_total").increment(1);
                warn!(code = %event.code, "click queue full, dropping event");
            }
            Err(TrySendError::Closed(event)) => {
                metrics::counter!("shortener_clicks_dropped_total").increment(1);
                warn!(code = %event.code, "click queue closed, dropping event");
            }
        }
    }
}

/// Turns a lifetime in days into an expiry timestamp.
///
/// Absent or non-positive values mean the link never expires.
fn expiry_from_ttl(
    ttl_days: Option<i64>,
    now: DateTime<Utc>,
) -> Result<Option<DateTime<Utc>>, AppError> {
    match ttl_days {
        Some(days) if days > MAX_TTL_DAYS => Err(AppError::invalid_ttl(days, MAX_TTL_DAYS)),
        Some(days) if days > 0 => Ok(Some(now + chrono::Duration::days(days))),
        _ => Ok(None),
    }
}

/// Remaining lifetime for a cache entry, `None` if the link is already expired.
fn cache_ttl(
    expires_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    horizon: Duration,
) -> Option<Duration> {
    match expires_at {
        Some(expiry) => (expiry - now).to_std().ok().filter(|ttl| !ttl.is_zero()),
        None => Some(horizon),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use std::sync::atomic::{AtomicI64, Ordering};

    const HORIZON: Duration = Duration::from_secs(86_400);

    fn stored(id: i64, code: &str, url: &str, expires_at: Option<DateTime<Utc>>) -> ShortLink {
        ShortLink::new(
            id,
            code.to_string(),
            url.to_string(),
            Utc::now(),
            expires_at,
            None,
        )
    }

    fn echo_insert(new_link: NewShortLink) -> Result<ShortLink, AppError> {
        Ok(ShortLink::new(
            new_link.id.unwrap_or(1000),
            new_link.code,
            new_link.long_url,
            new_link.created_at,
            new_link.expires_at,
            new_link.owner_id,
        ))
    }

    fn service(
        repo: MockLinkRepository,
        cache: MockCacheService,
    ) -> (LinkService, mpsc::Receiver<ClickEvent>) {
        let (tx, rx) = mpsc::channel(16);
        let service = LinkService::new(
            Arc::new(repo),
            Arc::new(cache),
            tx,
            "http://sho.rt/",
            HORIZON,
        );
        (service, rx)
    }

    fn input(url: &str) -> ShortenInput {
        ShortenInput {
            long_url: url.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_shorten_generates_code_from_allocated_id() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        repo.expect_allocate_id().times(1).returning(|| Ok(125));
        repo.expect_insert()
            .withf(|new_link| new_link.id == Some(125) && new_link.code == "21")
            .times(1)
            .returning(echo_insert);
        cache
            .expect_set_url()
            .withf(|code, url, ttl| code == "21" && url == "https://example.com" && *ttl == HORIZON)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let outcome = service.shorten(input("  https://example.com ")).await.unwrap();

        assert_eq!(outcome.code, "21");
        assert_eq!(outcome.short_url, "http://sho.rt/21");
        assert!(outcome.expires_at.is_none());
    }

    #[tokio::test]
    async fn test_shorten_with_ttl_sets_expiry_and_bounded_cache_ttl() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        repo.expect_allocate_id().returning(|| Ok(1));
        repo.expect_insert().returning(echo_insert);
        cache
            .expect_set_url()
            .withf(|_, _, ttl| *ttl <= Duration::from_secs(2 * 86_400) && *ttl > HORIZON)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let before = Utc::now();
        let outcome = service
            .shorten(ShortenInput {
                ttl_days: Some(2),
                ..input("https://example.com")
            })
            .await
            .unwrap();

        let expires_at = outcome.expires_at.unwrap();
        assert!(expires_at >= before + chrono::Duration::days(2));
    }

    #[tokio::test]
    async fn test_shorten_with_custom_alias() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        repo.expect_exists()
            .withf(|code| code == "promo")
            .times(1)
            .returning(|_| Ok(false));
        repo.expect_allocate_id().times(0);
        repo.expect_insert()
            .withf(|new_link| new_link.id.is_none() && new_link.code == "promo")
            .times(1)
            .returning(echo_insert);
        cache.expect_set_url().returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let outcome = service
            .shorten(ShortenInput {
                custom_alias: Some("promo".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap();

        assert_eq!(outcome.code, "promo");
        assert_eq!(outcome.short_url, "http://sho.rt/promo");
    }

    #[tokio::test]
    async fn test_empty_alias_counts_as_absent() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        repo.expect_exists().times(0);
        repo.expect_allocate_id().times(1).returning(|| Ok(10));
        repo.expect_insert().returning(echo_insert);
        cache.expect_set_url().returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let outcome = service
            .shorten(ShortenInput {
                custom_alias: Some(String::new()),
                ..input("https://example.com")
            })
            .await
            .unwrap();

        assert_eq!(outcome.code, "a");
    }

    #[tokio::test]
    async fn test_shorten_existing_alias_is_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().times(1).returning(|_| Ok(true));
        repo.expect_insert().times(0);

        let (service, _rx) = service(repo, MockCacheService::new());
        let err = service
            .shorten(ShortenInput {
                custom_alias: Some("taken".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "alias_taken");
    }

    #[tokio::test]
    async fn test_alias_race_on_insert_maps_to_alias_taken() {
        let mut repo = MockLinkRepository::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_insert()
            .times(1)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));

        let (service, _rx) = service(repo, MockCacheService::new());
        let err = service
            .shorten(ShortenInput {
                custom_alias: Some("racer".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();

        assert_eq!(err.code(), "alias_taken");
    }

    #[tokio::test]
    async fn test_shorten_rejects_bad_input_before_any_io() {
        let (service, _rx) = service(MockLinkRepository::new(), MockCacheService::new());

        let err = service.shorten(input("example.com")).await.unwrap_err();
        assert_eq!(err.code(), "invalid_url");

        let err = service.shorten(input("")).await.unwrap_err();
        assert_eq!(err.code(), "invalid_url");

        let err = service
            .shorten(ShortenInput {
                custom_alias: Some("ab".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_alias");

        let err = service
            .shorten(ShortenInput {
                custom_alias: Some("health".to_string()),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_alias");

        let err = service
            .shorten(ShortenInput {
                ttl_days: Some(MAX_TTL_DAYS + 1),
                ..input("https://example.com")
            })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "invalid_ttl");
    }

    #[tokio::test]
    async fn test_generated_code_collision_takes_next_id() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        let next = AtomicI64::new(10);
        repo.expect_allocate_id()
            .times(2)
            .returning(move || Ok(next.fetch_add(1, Ordering::SeqCst)));
        repo.expect_insert()
            .withf(|new_link| new_link.code == "a")
            .times(1)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));
        repo.expect_insert()
            .withf(|new_link| new_link.code == "b")
            .times(1)
            .returning(echo_insert);
        cache.expect_set_url().returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let outcome = service.shorten(input("https://example.com")).await.unwrap();

        assert_eq!(outcome.code, "b");
    }

    #[tokio::test]
    async fn test_generated_reserved_code_takes_next_id() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        let health = base62::decode("health").unwrap() as i64;
        let next = AtomicI64::new(health);
        repo.expect_allocate_id()
            .times(2)
            .returning(move || Ok(next.fetch_add(1, Ordering::SeqCst)));
        repo.expect_insert()
            .withf(|new_link| new_link.code == "healti")
            .times(1)
            .returning(echo_insert);
        cache.expect_set_url().returning(|_, _, _| Ok(()));

        let (service, _rx) = service(repo, cache);
        let outcome = service.shorten(input("https://example.com")).await.unwrap();

        assert_eq!(outcome.code, "healti");
    }

    #[tokio::test]
    async fn test_generation_gives_up_after_bounded_attempts() {
        let mut repo = MockLinkRepository::new();

        let next = AtomicI64::new(1);
        repo.expect_allocate_id()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(move || Ok(next.fetch_add(1, Ordering::SeqCst)));
        repo.expect_insert()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|_| Err(AppError::conflict("Short code already exists", json!({}))));

        let (service, _rx) = service(repo, MockCacheService::new());
        let err = service.shorten(input("https://example.com")).await.unwrap_err();

        assert!(matches!(err, AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_cache_write_failure_does_not_fail_shorten() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        repo.expect_allocate_id().returning(|| Ok(1));
        repo.expect_insert().returning(echo_insert);
        cache
            .expect_set_url()
            .times(1)
            .returning(|_, _, _| Err(CacheError::Operation("down".to_string())));

        let (service, _rx) = service(repo, cache);
        assert!(service.shorten(input("https://example.com")).await.is_ok());
    }

    #[tokio::test]
    async fn test_resolve_cache_hit_skips_store_and_queues_click() {
        let repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        cache
            .expect_get_url()
            .withf(|code| code == "abc")
            .times(1)
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let (service, mut rx) = service(repo, cache);
        let target = service.resolve("abc").await.unwrap();

        assert_eq!(target, "https://example.com");
        assert_eq!(rx.try_recv().unwrap().code, "abc");
    }

    #[tokio::test]
    async fn test_resolve_cache_miss_reads_store_and_repopulates() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        cache.expect_get_url().times(1).returning(|_| Ok(None));
        repo.expect_find_active()
            .withf(|code, _| code == "abc")
            .times(1)
            .returning(|_, _| Ok(Some(stored(1, "abc", "https://example.com", None))));
        cache
            .expect_set_url()
            .withf(|code, url, ttl| code == "abc" && url == "https://example.com" && *ttl == HORIZON)
            .times(1)
            .returning(|_, _, _| Ok(()));

        let (service, mut rx) = service(repo, cache);
        assert_eq!(service.resolve("abc").await.unwrap(), "https://example.com");
        assert!(rx.try_recv().is_ok());
    }

    #[tokio::test]
    async fn test_resolve_cache_error_falls_back_to_store() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        cache
            .expect_get_url()
            .returning(|_| Err(CacheError::Connection("refused".to_string())));
        repo.expect_find_active()
            .times(1)
            .returning(|_, _| Ok(Some(stored(1, "abc", "https://example.com", None))));
        cache
            .expect_set_url()
            .returning(|_, _, _| Err(CacheError::Connection("refused".to_string())));

        let (service, _rx) = service(repo, cache);
        assert_eq!(service.resolve("abc").await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn test_resolve_expired_row_is_not_found_and_not_cached() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        cache.expect_get_url().returning(|_| Ok(None));
        let expired = Utc::now() - chrono::Duration::seconds(1);
        repo.expect_find_active()
            .returning(move |_, _| Ok(Some(stored(1, "old", "https://example.com", Some(expired)))));
        cache.expect_set_url().times(0);

        let (service, mut rx) = service(repo, cache);
        let err = service.resolve("old").await.unwrap_err();

        assert!(matches!(err, AppError::NotFound { .. }));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_resolve_unknown_code_is_not_found() {
        let mut repo = MockLinkRepository::new();
        let mut cache = MockCacheService::new();

        cache.expect_get_url().returning(|_| Ok(None));
        repo.expect_find_active().returning(|_, _| Ok(None));

        let (service, _rx) = service(repo, cache);
        let err = service.resolve("missing").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_resolve_malformed_code_does_no_io() {
        let (service, _rx) = service(MockLinkRepository::new(), MockCacheService::new());

        let too_long = "x".repeat(21);
        for code in ["", "has space", "bad/slash", too_long.as_str()] {
            let err = service.resolve(code).await.unwrap_err();
            assert!(matches!(err, AppError::NotFound { .. }), "{code:?}");
        }
    }

    #[tokio::test]
    async fn test_resolve_succeeds_when_click_queue_is_full() {
        let mut cache = MockCacheService::new();
        cache
            .expect_get_url()
            .returning(|_| Ok(Some("https://example.com".to_string())));

        let (tx, _rx) = mpsc::channel(1);
        tx.try_send(ClickEvent::now("filler")).unwrap();
        let service = LinkService::new(
            Arc::new(MockLinkRepository::new()),
            Arc::new(cache),
            tx,
            "http://sho.rt",
            HORIZON,
        );

        assert_eq!(service.resolve("abc").await.unwrap(), "https://example.com");
    }

    #[tokio::test]
    async fn test_get_analytics_fresh_and_missing() {
        let mut repo = MockLinkRepository::new();
        repo.expect_read_analytics()
            .withf(|code| code == "fresh")
            .returning(|_| Ok(Some(stored(1, "fresh", "https://example.com", None).analytics())));
        repo.expect_read_analytics()
            .withf(|code| code == "gone")
            .returning(|_| Ok(None));

        let (service, _rx) = service(repo, MockCacheService::new());

        let analytics = service.get_analytics("fresh").await.unwrap();
        assert_eq!(analytics.click_count, 0);
        assert!(analytics.last_accessed.is_none());

        let err = service.get_analytics("gone").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound { .. }));
    }

    #[test]
    fn test_cache_ttl_policy() {
        let now = Utc::now();

        assert_eq!(cache_ttl(None, now, HORIZON), Some(HORIZON));
        assert_eq!(
            cache_ttl(Some(now + chrono::Duration::seconds(30)), now, HORIZON),
            Some(Duration::from_secs(30))
        );
        assert_eq!(cache_ttl(Some(now), now, HORIZON), None);
        assert_eq!(
            cache_ttl(Some(now - chrono::Duration::seconds(5)), now, HORIZON),
            None
        );
    }

    #[test]
    fn test_expiry_from_ttl() {
        let now = Utc::now();

        assert_eq!(expiry_from_ttl(None, now).unwrap(), None);
        assert_eq!(expiry_from_ttl(Some(0), now).unwrap(), None);
        assert_eq!(
            expiry_from_ttl(Some(1), now).unwrap(),
            Some(now + chrono::Duration::days(1))
        );
        assert!(expiry_from_ttl(Some(MAX_TTL_DAYS), now).is_ok());
        assert!(expiry_from_ttl(Some(MAX_TTL_DAYS + 1), now).is_err());
    }
}
