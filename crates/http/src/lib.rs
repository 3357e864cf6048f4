//! HTTP API server for scorm-sync.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(unreachable_pub, reason = "pub items are re-exported")]
#![allow(clippy::absolute_paths, reason = "Explicit paths for clarity")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::min_ident_chars, reason = "Short closure params are idiomatic")]
#![allow(clippy::exhaustive_structs, reason = "HTTP types are stable")]
#![allow(clippy::single_call_fn, reason = "Helper functions improve readability")]

pub mod api_error;
mod api_types;
mod handlers;

#[cfg(test)]
mod handler_tests;

use std::sync::Arc;

use axum::{
    Json, Router,
    routing::{get, post, put},
};
use scorm_sync_service::TrackingService;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use api_types::{PackageSettingsRequest, TrackingQuery, VersionResponse};
pub use handlers::TRUSTED_USER_HEADER;

/// Shared application state for all HTTP handlers.
pub struct AppState {
    pub tracking: Arc<TrackingService>,
    /// Accept [`TRUSTED_USER_HEADER`] as the caller's identity. Only safe
    /// behind a gateway that strips the header from client requests.
    pub trust_user_header: bool,
}

/// The router needs the peer address for its local-only routes; serve it
/// with `into_make_service_with_connect_info::<SocketAddr>()`.
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/version", get(version))
        .route("/api/packages/{package_id}", put(handlers::packages::save_package))
        .route("/api/packages/{package_id}/unload", post(handlers::tracking::post_unload))
        .route("/api/packages/{package_id}/cmi", post(handlers::tracking::post_cmi))
        .route(
            "/api/packages/{package_id}/attempts/{user_id}",
            get(handlers::attempts::get_attempt),
        )
        .route(
            "/api/packages/{package_id}/attempts/{user_id}/session",
            post(handlers::attempts::open_session),
        )
        .route(
            "/api/packages/{package_id}/nodes/{cp_node_id}/users/{user_id}",
            get(handlers::tracking::get_node),
        )
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}

async fn version() -> Json<VersionResponse> {
    Json(VersionResponse { version: env!("CARGO_PKG_VERSION") })
}
