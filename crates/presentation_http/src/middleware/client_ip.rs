//! Client address resolution
//!
//! The peer address comes from axum's `ConnectInfo`. `X-Forwarded-For` is
//! honoured only when the peer is a configured trusted proxy.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use axum::{
    extract::{ConnectInfo, Request},
    http::HeaderMap,
};

/// Resolve the client IP for a request
///
/// Without `ConnectInfo` (e.g. in tests) the peer is taken to be loopback.
pub fn client_ip(req: &Request, trusted_proxies: &[IpAddr]) -> IpAddr {
    let peer = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map_or(IpAddr::V4(Ipv4Addr::LOCALHOST), |info| info.0.ip());

    if trusted_proxies.contains(&peer) {
        if let Some(forwarded) = forwarded_for(req.headers()) {
            return forwarded;
        }
    }

    peer
}

/// First parseable address in `X-Forwarded-For` (the original client)
fn forwarded_for(headers: &HeaderMap) -> Option<IpAddr> {
    headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|ip| ip.trim().parse().ok())
}
