//! Periodic removal of expired links.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;

/// Deletes expired rows and drops their cache entries.
///
/// Returns the number of purged links. Cache invalidation failures are
/// logged only: cache TTLs already end at the link's expiry.
pub async fn sweep_expired(
    repo: &dyn LinkRepository,
    cache: &dyn CacheService,
) -> Result<usize, AppError> {
    let purged = repo.purge_expired(Utc::now()).await?;

    for code in &purged {
        if let Err(e) = cache.invalidate(code).await {
            warn!(code = %code, error = %e, "failed to invalidate purged link");
        }
    }

    Ok(purged.len())
}

/// Runs [`sweep_expired`] every `interval` until the task is aborted.
pub async fn run_expiry_sweeper(
    repo: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    info!(interval_secs = interval.as_secs(), "Expiry sweeper started");

    loop {
        ticker.tick().await;

        match sweep_expired(repo.as_ref(), cache.as_ref()).await {
            Ok(0) => debug!("no expired links"),
            Ok(purged) => info!(purged, "purged expired links"),
            Err(e) => warn!(error = %e, "expiry sweep failed"),
        }
    }
}
