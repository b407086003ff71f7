//! HTTP server initialization and runtime setup.
//!
//! Handles database connections, cache setup, background tasks, and the Axum
//! server lifecycle including graceful shutdown.

use crate::application::services::LinkService;
use crate::config::Config;
use crate::domain::click_worker::run_click_worker;
use crate::domain::expiry_sweeper::run_expiry_sweeper;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache, RedisCache};
use crate::infrastructure::persistence::PgLinkRepository;
use crate::rate_limiter::FixedWindowRateLimiter;
use crate::routes::app_router;
use crate::state::{AppState, RateLimitSettings};

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::signal;
use tokio::sync::mpsc;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{error, info, warn};

/// Upper bound on draining queued clicks after the listener closes.
const SHUTDOWN_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Opens the PostgreSQL pool with the configured limits.
///
/// # Errors
///
/// Returns an error if no connection can be established.
pub async fn connect_database(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Connects to Redis if configured, falling back to [`NullCache`].
pub async fn connect_cache(config: &Config) -> Arc<dyn CacheService> {
    let Some(redis_url) = &config.redis_url else {
        info!("Cache disabled (NullCache)");
        return Arc::new(NullCache::new());
    };

    match RedisCache::connect(redis_url).await {
        Ok(redis) => {
            info!("Cache enabled (Redis)");
            Arc::new(redis)
        }
        Err(e) => {
            warn!(error = %e, "Failed to connect to Redis, using NullCache");
            Arc::new(NullCache::new())
        }
    }
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool and migrations
/// - Redis cache (or NullCache fallback)
/// - Background click worker, expiry sweeper and rate limit reclaimer
/// - Axum HTTP server
///
/// On SIGINT/SIGTERM the listener stops accepting connections, in-flight
/// requests finish, and the click worker drains the remaining queue.
///
/// # Errors
///
/// Returns an error if the database is unreachable, migrations fail, or the
/// listener cannot bind.
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_database(&config).await?;
    info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run migrations")?;

    let cache = connect_cache(&config).await;

    let repository: Arc<dyn LinkRepository> = Arc::new(PgLinkRepository::new(Arc::new(pool)));

    let (click_tx, click_rx) = mpsc::channel(config.click_queue_capacity);
    let click_worker = tokio::spawn(run_click_worker(
        click_rx,
        Arc::clone(&repository),
        config.click_worker_concurrency,
    ));

    let sweeper = config.expiry_sweep_interval().map(|every| {
        tokio::spawn(run_expiry_sweeper(
            Arc::clone(&repository),
            Arc::clone(&cache),
            every,
        ))
    });

    let rate_limiter = Arc::new(FixedWindowRateLimiter::new(config.rate_limit_window()));
    let reclaimer =
        rate_limiter.spawn_reclaimer(Duration::from_secs(config.rate_limit_reclaim_seconds));

    let link_service = Arc::new(LinkService::new(
        repository,
        Arc::clone(&cache),
        click_tx.clone(),
        config.base_url.clone(),
        config.cache_horizon(),
    ));

    let state = AppState {
        link_service,
        cache,
        click_sender: click_tx,
        rate_limiter,
        rate_limit: RateLimitSettings {
            requests_per_window: config.rate_limit_requests,
            behind_proxy: config.behind_proxy,
        },
    };

    let app = NormalizePathLayer::trim_trailing_slash()
        .layer(app_router(state, config.request_timeout()));

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    info!("Server stopped, draining click queue");

    // The router (and every sender clone in it) is gone now; the worker
    // finishes once the queue is empty.
    reclaimer.abort();
    if let Some(sweeper) = sweeper {
        sweeper.abort();
    }

    match tokio::time::timeout(SHUTDOWN_DRAIN_TIMEOUT, click_worker).await {
        Ok(Ok(())) => info!("Click queue drained"),
        Ok(Err(e)) => error!(error = %e, "Click worker panicked"),
        Err(_) => warn!(
            timeout_secs = SHUTDOWN_DRAIN_TIMEOUT.as_secs(),
            "Click queue not drained in time, remaining clicks dropped"
        ),
    }

    Ok(())
}

/// Resolves on Ctrl+C or, on Unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    info!("Shutdown signal received");
}
