//! Per-client rate limiting for link creation.

use axum::{
    extract::{ConnectInfo, Request, State},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use std::net::SocketAddr;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_identity;

/// Admits or rejects a request against the shared fixed-window limiter.
///
/// The client is identified by its peer address, or by forwarding headers
/// when the service runs behind a trusted proxy. Requests over the quota
/// receive `429 Too Many Requests` and never reach the handler.
///
/// # Example
///
/// ```rust,ignore
/// let routes = Router::new()
///     .route("/v1/urls", post(shorten_handler))
///     .route_layer(middleware::from_fn_with_state(state.clone(), rate_limit::layer));
/// ```
pub async fn layer(
    State(st): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let identity = client_identity(req.headers(), peer, st.rate_limit.behind_proxy);

    if !st
        .rate_limiter
        .allow(&identity, st.rate_limit.requests_per_window)
    {
        metrics::counter!("shortener_rate_limited_total").increment(1);
        warn!(client = %identity, "rate limit exceeded");

        return Err(AppError::too_many_requests(
            "Rate limit exceeded",
            json!({
                "limit": st.rate_limit.requests_per_window,
                "window_seconds": st.rate_limiter.window().as_secs(),
            }),
        ));
    }

    Ok(next.run(req).await)
}
