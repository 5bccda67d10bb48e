//! Client identity used to bucket rate-limit state.

use std::net::SocketAddr;

use axum::http::HeaderMap;

/// Bucket shared by every client we cannot identify.
pub const UNKNOWN_CLIENT: &str = "unknown";

// checked in order, first non-empty value wins
const IDENTITY_HEADERS: [&str; 3] = ["cf-connecting-ip", "x-forwarded-for", "x-real-ip"];

/// Best-effort identity from proxy headers, then the socket peer.
///
/// Values are not validated as IP addresses. Only the first entry of a
/// comma-separated `X-Forwarded-For` is used.
pub fn client_identity(headers: &HeaderMap, peer: Option<SocketAddr>) -> String {
    for name in IDENTITY_HEADERS {
        let value = headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(value) = value {
            return value.to_string();
        }
    }

    peer.map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}
