//! Shared application state injected into every handler.

use std::sync::Arc;
use tokio::sync::mpsc;

use crate::application::services::LinkService;
use crate::domain::click_event::ClickEvent;
use crate::infrastructure::cache::CacheService;
use crate::rate_limiter::FixedWindowRateLimiter;

/// Rate limit policy applied to link creation.
#[derive(Debug, Clone, Copy)]
pub struct RateLimitSettings {
    pub requests_per_window: u32,
    /// Trust `X-Forwarded-For` / `X-Real-IP` for client identity.
    pub behind_proxy: bool,
}

/// Process-wide state. Cloning is cheap: every field is reference-counted or `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService>,
    pub cache: Arc<dyn CacheService>,
    pub click_sender: mpsc::Sender<ClickEvent>,
    pub rate_limiter: Arc<FixedWindowRateLimiter>,
    pub rate_limit: RateLimitSettings,
}
