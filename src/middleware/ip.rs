//! Client address extraction for middleware.
//!
//! The accept loop stores the peer address of every connection as an
//! [`axum::extract::ConnectInfo`] request extension. Forwarding headers such
//! as `X-Forwarded-For` are deliberately not consulted: the logged address is
//! the TCP peer, which is what the service can actually verify.
//!
//! Requests that did not come through the accept loop (router tests driven
//! with `oneshot`) have no peer address and fall back to [`UNKNOWN_ADDR`].

use std::borrow::Cow;
use std::net::SocketAddr;

use axum::extract::ConnectInfo;
use axum::http::Request;

/// Fallback value when no peer address is attached to the request.
pub const UNKNOWN_ADDR: &str = "unknown";

/// Peer socket address of the connection that carried `req`, if known.
#[inline]
pub fn peer_addr<B>(req: &Request<B>) -> Option<SocketAddr> {
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr)
}

/// Peer address formatted as `ip:port`, or [`UNKNOWN_ADDR`].
///
/// Returns `Cow<'static, str>` so the common fallback does not allocate.
#[inline]
pub fn remote_addr<B>(req: &Request<B>) -> Cow<'static, str> {
    match peer_addr(req) {
        Some(addr) => Cow::Owned(addr.to_string()),
        None => Cow::Borrowed(UNKNOWN_ADDR),
    }
}
