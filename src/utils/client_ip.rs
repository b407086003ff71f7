//! Client identity extraction for rate limiting.

use axum::http::HeaderMap;
use std::net::IpAddr;

/// Identity used when neither headers nor the peer address are available.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Resolves the rate-limit identity of a request.
///
/// With `behind_proxy` set, the first `X-Forwarded-For` entry wins, then
/// `X-Real-IP`. Otherwise only the socket peer address is trusted, since
/// forwarding headers are client-controlled.
pub fn client_identity(headers: &HeaderMap, peer: Option<IpAddr>, behind_proxy: bool) -> String {
    if behind_proxy {
        let forwarded = headers
            .get("x-forwarded-for")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').map(str::trim).find(|ip| !ip.is_empty()));

        let real_ip = || {
            headers
                .get("x-real-ip")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|ip| !ip.is_empty())
        };

        if let Some(ip) = forwarded.or_else(real_ip) {
            return ip.to_string();
        }
    }

    peer.map(|ip| ip.to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
