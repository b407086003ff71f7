//! Per-client fixed-window rate limiting for the write path.
//!
//! Each identity (usually a client IP) owns one window holding a token
//! count and the instant the window opened. A window admits up to `limit`
//! requests; once more than one window length has elapsed since it opened,
//! the next check resets it to the full allotment. This keeps memory and
//! per-request cost O(1) at the price of allowing up to twice the nominal
//! rate across a window boundary.
//!
//! # Locking
//!
//! - The identity table is an `RwLock<HashMap>`; requests only take the read
//!   lock unless the identity is new.
//! - Each identity's window has its own `Mutex`, so concurrent checks for one
//!   client serialize while different clients never contend.
//!
//! # Reclamation
//!
//! A background task ([`FixedWindowRateLimiter::spawn_reclaimer`]) drops
//! identities whose window opened more than [`STALE_WINDOWS`] window lengths
//! ago. Such a window would have been reset on its next check anyway, so
//! dropping it grants nothing extra.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, RwLock, Weak};
use std::time::{Duration, Instant};

use tokio::task::JoinHandle;
use tracing::debug;

/// Number of window lengths after which an idle identity is reclaimed.
pub const STALE_WINDOWS: u32 = 2;

#[derive(Debug)]
struct RateWindow {
    tokens: u32,
    started_at: Instant,
    /// Set when the reclaimer removed this window from the table.
    evicted: bool,
}

impl RateWindow {
    fn open(limit: u32, now: Instant) -> Self {
        Self {
            tokens: limit,
            started_at: now,
            evicted: false,
        }
    }

    fn try_consume(&mut self, limit: u32, window: Duration, now: Instant) -> bool {
        if now.saturating_duration_since(self.started_at) > window {
            self.tokens = limit;
            self.started_at = now;
        }

        if self.tokens > 0 {
            self.tokens -= 1;
            true
        } else {
            false
        }
    }
}

type Slot = Arc<Mutex<RateWindow>>;

/// Fixed-window request counter keyed by client identity.
///
/// `allow` never fails: a poisoned lock is recovered, since the protected
/// state is a plain counter that cannot be left half-updated.
#[derive(Debug)]
pub struct FixedWindowRateLimiter {
    window: Duration,
    windows: RwLock<HashMap<String, Slot>>,
}

impl FixedWindowRateLimiter {
    /// Creates a limiter with the given window length.
    ///
    /// # Panics
    ///
    /// Panics if `window` is zero.
    pub fn new(window: Duration) -> Self {
        assert!(!window.is_zero(), "rate limit window must be non-zero");

        Self {
            window,
            windows: RwLock::new(HashMap::new()),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Consumes one token for `identity`, returning whether the request is admitted.
    pub fn allow(&self, identity: &str, limit: u32) -> bool {
        self.allow_at(identity, limit, Instant::now())
    }

    /// Like [`Self::allow`] with an explicit clock reading.
    pub fn allow_at(&self, identity: &str, limit: u32, now: Instant) -> bool {
        loop {
            let slot = self.slot(identity, limit, now);
            let mut window = lock(&slot);

            // Lost a race with the reclaimer; look the identity up again.
            if window.evicted {
                continue;
            }

            return window.try_consume(limit, self.window, now);
        }
    }

    /// Number of identities currently tracked.
    pub fn tracked_identities(&self) -> usize {
        self.windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Removes identities whose window opened more than
    /// [`STALE_WINDOWS`] window lengths before `now`. Returns how many were removed.
    pub fn reclaim_at(&self, now: Instant) -> usize {
        let stale_after = self.window * STALE_WINDOWS;
        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);
        let before = windows.len();

        windows.retain(|_, slot| {
            let mut window = lock(slot);
            if now.saturating_duration_since(window.started_at) > stale_after {
                window.evicted = true;
                false
            } else {
                true
            }
        });

        before - windows.len()
    }

    /// Spawns the periodic reclamation task.
    ///
    /// The task holds only a weak reference and stops once the limiter is dropped.
    pub fn spawn_reclaimer(self: &Arc<Self>, every: Duration) -> JoinHandle<()> {
        let limiter: Weak<Self> = Arc::downgrade(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;

            loop {
                ticker.tick().await;

                let Some(limiter) = limiter.upgrade() else {
                    break;
                };

                let removed = limiter.reclaim_at(Instant::now());
                if removed > 0 {
                    debug!(
                        removed,
                        remaining = limiter.tracked_identities(),
                        "reclaimed idle rate limit windows"
                    );
                }
            }
        })
    }

    fn slot(&self, identity: &str, limit: u32, now: Instant) -> Slot {
        if let Some(slot) = self
            .windows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(identity)
        {
            return Arc::clone(slot);
        }

        let mut windows = self.windows.write().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(
            windows
                .entry(identity.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(RateWindow::open(limit, now)))),
        )
    }
}

fn lock(slot: &Mutex<RateWindow>) -> MutexGuard<'_, RateWindow> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}
