#![allow(clippy::single_call_fn, reason = "HTTP handlers are called once from router")]

use std::net::SocketAddr;

use axum::http::HeaderMap;

use crate::AppState;
use crate::api_error::ApiError;

pub mod attempts;
pub mod packages;
pub mod tracking;

/// Header a trusted gateway sets to the authenticated user id. Honoured only
/// when [`AppState::trust_user_header`] is set; otherwise the player's
/// `p`/`hash` pair is checked.
pub const TRUSTED_USER_HEADER: &str = "x-authenticated-user";

/// User id established by the gateway, if the deployment trusts one.
pub(crate) fn trusted_user(state: &AppState, headers: &HeaderMap) -> Option<i64> {
    if !state.trust_user_header {
        if headers.contains_key(TRUSTED_USER_HEADER) {
            tracing::debug!(header = TRUSTED_USER_HEADER, "user header not trusted, ignoring");
        }
        return None;
    }
    header_user(headers)
}

/// Unparseable values count as absent.
pub(crate) fn header_user(headers: &HeaderMap) -> Option<i64> {
    let raw = headers.get(TRUSTED_USER_HEADER)?;
    let parsed = raw.to_str().ok().and_then(|s| s.trim().parse::<i64>().ok());
    if parsed.is_none() {
        tracing::warn!(header = TRUSTED_USER_HEADER, "ignoring unparseable trusted user header");
    }
    parsed
}

fn is_localhost(addr: &SocketAddr) -> bool {
    addr.ip().is_loopback()
}

/// Session issuing, package settings and inspection are for the host
/// platform on the same machine.
pub(crate) fn require_local(addr: &SocketAddr) -> Result<(), ApiError> {
    if is_localhost(addr) {
        return Ok(());
    }
    tracing::warn!(%addr, "refusing non-local caller");
    Err(ApiError::Forbidden)
}
