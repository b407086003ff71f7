//! Background consumer that applies click events to the link store.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Upper bound on a single counter update.
pub const INCREMENT_TIMEOUT: Duration = Duration::from_secs(5);

/// Drains the click channel, running at most `concurrency` increments at once.
///
/// Each increment is bounded by [`INCREMENT_TIMEOUT`]. Failures are logged
/// and the click is dropped; counters are best-effort by contract. Returns
/// after every sender is gone and all in-flight increments have finished.
pub async fn run_click_worker(
    mut rx: mpsc::Receiver<ClickEvent>,
    repo: Arc<dyn LinkRepository>,
    concurrency: usize,
) {
    let permits = Arc::new(Semaphore::new(concurrency.max(1)));
    let mut in_flight = JoinSet::new();

    info!(concurrency, "Click worker started");

    while let Some(event) = rx.recv().await {
        let Ok(permit) = Arc::clone(&permits).acquire_owned().await else {
            break;
        };
        let repo = Arc::clone(&repo);

        in_flight.spawn(async move {
            let _permit = permit;
            record(repo.as_ref(), event).await;
        });

        // Reap finished tasks so the set does not grow with the queue.
        while in_flight.try_join_next().is_some() {}
    }

    while in_flight.join_next().await.is_some() {}

    info!("Click worker stopped");
}

async fn record(repo: &dyn LinkRepository, event: ClickEvent) {
    match tokio::time::timeout(
        INCREMENT_TIMEOUT,
        repo.increment_clicks(&event.code, event.accessed_at),
    )
    .await
    {
        Ok(Ok(())) => debug!(code = %event.code, "click recorded"),
        Ok(Err(e)) => warn!(code = %event.code, error = %e, "failed to record click"),
        Err(_) => warn!(code = %event.code, "click increment timed out"),
    }
}
