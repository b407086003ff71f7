#![allow(dead_code)]

use async_trait::async_trait;
use axum::extract::ConnectInfo;
use axum_test::TestServer;
use chrono::{DateTime, Utc};
use serde_json::json;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::mpsc;
use tower::Layer;

use shortener::application::services::LinkService;
use shortener::domain::click_event::ClickEvent;
use shortener::domain::entities::{LinkAnalytics, NewShortLink, ShortLink};
use shortener::domain::repositories::LinkRepository;
use shortener::error::AppError;
use shortener::infrastructure::cache::MemoryCache;
use shortener::rate_limiter::FixedWindowRateLimiter;
use shortener::routes::app_router;
use shortener::state::{AppState, RateLimitSettings};

pub const BASE_URL: &str = "http://sho.rt";

/// `LinkRepository` backed by a `HashMap`, mirroring the PostgreSQL semantics:
/// a monotonic id sequence and a unique short code.
#[derive(Default)]
pub struct InMemoryLinkRepository {
    links: Mutex<HashMap<String, ShortLink>>,
    sequence: AtomicI64,
    unavailable: AtomicBool,
    delay_ms: AtomicU64,
}

impl InMemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            sequence: AtomicI64::new(1),
            ..Default::default()
        }
    }

    /// Makes every call fail as if the database were unreachable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Makes every call take at least `delay`.
    pub fn set_delay(&self, delay: Duration) {
        self.delay_ms.store(delay.as_millis() as u64, Ordering::SeqCst);
    }

    /// Stores a row directly, bypassing the service.
    pub fn seed(&self, code: &str, url: &str, expires_at: Option<DateTime<Utc>>) {
        let id = self.sequence.fetch_add(1, Ordering::SeqCst);
        let link = ShortLink::new(
            id,
            code.to_string(),
            url.to_string(),
            Utc::now(),
            expires_at,
            None,
        );
        self.links.lock().unwrap().insert(code.to_string(), link);
    }

    pub fn contains(&self, code: &str) -> bool {
        self.links.lock().unwrap().contains_key(code)
    }

    async fn check(&self) -> Result<(), AppError> {
        let delay = self.delay_ms.load(Ordering::SeqCst);
        if delay > 0 {
            tokio::time::sleep(Duration::from_millis(delay)).await;
        }
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(AppError::unavailable("Database unavailable", json!({})));
        }
        Ok(())
    }
}

#[async_trait]
impl LinkRepository for InMemoryLinkRepository {
    async fn allocate_id(&self) -> Result<i64, AppError> {
        self.check().await?;
        Ok(self.sequence.fetch_add(1, Ordering::SeqCst))
    }

    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        self.check().await?;
        let mut links = self.links.lock().unwrap();

        if links.contains_key(&new_link.code) {
            return Err(AppError::conflict(
                "Short code already exists",
                json!({ "code": new_link.code }),
            ));
        }

        let id = match new_link.id {
            Some(id) => id,
            None => self.sequence.fetch_add(1, Ordering::SeqCst),
        };
        let link = ShortLink::new(
            id,
            new_link.code.clone(),
            new_link.long_url,
            new_link.created_at,
            new_link.expires_at,
            new_link.owner_id,
        );
        links.insert(new_link.code, link.clone());
        Ok(link)
    }

    async fn find_active(
        &self,
        code: &str,
        now: DateTime<Utc>,
    ) -> Result<Option<ShortLink>, AppError> {
        self.check().await?;
        Ok(self
            .links
            .lock()
            .unwrap()
            .get(code)
            .filter(|link| link.expires_at.is_none_or(|e| e > now))
            .cloned())
    }

    async fn exists(&self, code: &str) -> Result<bool, AppError> {
        self.check().await?;
        Ok(self.contains(code))
    }

    async fn increment_clicks(
        &self,
        code: &str,
        accessed_at: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.check().await?;
        if let Some(link) = self.links.lock().unwrap().get_mut(code) {
            link.click_count += 1;
            link.last_accessed = Some(link.last_accessed.map_or(accessed_at, |t| t.max(accessed_at)));
        }
        Ok(())
    }

    async fn read_analytics(&self, code: &str) -> Result<Option<LinkAnalytics>, AppError> {
        self.check().await?;
        Ok(self.links.lock().unwrap().get(code).map(ShortLink::analytics))
    }

    async fn purge_expired(&self, now: DateTime<Utc>) -> Result<Vec<String>, AppError> {
        self.check().await?;
        let mut links = self.links.lock().unwrap();
        let expired: Vec<String> = links
            .values()
            .filter(|link| link.is_expired_at(now))
            .map(|link| link.code.clone())
            .collect();
        for code in &expired {
            links.remove(code);
        }
        Ok(expired)
    }

    async fn ping(&self) -> Result<(), AppError> {
        self.check().await
    }
}

/// Everything a handler test needs to drive and inspect the service.
pub struct TestContext {
    pub state: AppState,
    pub repo: Arc<InMemoryLinkRepository>,
    pub cache: Arc<MemoryCache>,
    pub click_rx: mpsc::Receiver<ClickEvent>,
}

impl TestContext {
    /// Full application router with a fixed peer address for every request.
    pub fn server(&self) -> TestServer {
        self.server_with_timeout(Duration::from_secs(5))
    }

    pub fn server_with_timeout(&self, request_timeout: Duration) -> TestServer {
        let app = app_router(self.state.clone(), request_timeout).layer(MockConnectInfoLayer);
        TestServer::new(app).unwrap()
    }
}

pub fn create_test_context() -> TestContext {
    create_test_context_with(RateLimitSettings {
        requests_per_window: 1000,
        behind_proxy: false,
    })
}

pub fn create_test_context_with(rate_limit: RateLimitSettings) -> TestContext {
    let repo = Arc::new(InMemoryLinkRepository::new());
    let cache = Arc::new(MemoryCache::new());
    let (tx, rx) = mpsc::channel(100);

    let link_service = Arc::new(LinkService::new(
        repo.clone(),
        cache.clone(),
        tx.clone(),
        BASE_URL,
        Duration::from_secs(3600),
    ));

    let state = AppState {
        link_service,
        cache: cache.clone(),
        click_sender: tx,
        rate_limiter: Arc::new(FixedWindowRateLimiter::new(Duration::from_secs(60))),
        rate_limit,
    };

    TestContext {
        state,
        repo,
        cache,
        click_rx: rx,
    }
}

/// Inserts the `ConnectInfo` extension normally provided by
/// `into_make_service_with_connect_info`.
#[derive(Clone)]
pub struct MockConnectInfoLayer;

impl<S> Layer<S> for MockConnectInfoLayer {
    type Service = MockConnectInfoService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        MockConnectInfoService { inner }
    }
}

#[derive(Clone)]
pub struct MockConnectInfoService<S> {
    inner: S,
}

impl<S, B> tower::Service<axum::http::Request<B>> for MockConnectInfoService<S>
where
    S: tower::Service<axum::http::Request<B>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    B: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(
        &mut self,
        cx: &mut std::task::Context<'_>,
    ) -> std::task::Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: axum::http::Request<B>) -> Self::Future {
        let addr: SocketAddr = "127.0.0.1:12345".parse().unwrap();
        req.extensions_mut().insert(ConnectInfo(addr));
        self.inner.call(req)
    }
}
