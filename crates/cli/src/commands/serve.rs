use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use scorm_sync_core::env_parse_with_default;
use scorm_sync_http::{AppState, TRUSTED_USER_HEADER, create_router};

pub(crate) async fn run(port: u16, host: String) -> Result<()> {
    let tracking = Arc::new(crate::tracking_service().await?);
    let trust_user_header = env_parse_with_default("SCORM_SYNC_TRUST_USER_HEADER", false);
    if trust_user_header {
        tracing::warn!(header = TRUSTED_USER_HEADER, "trusting gateway user header");
    }
    let state = Arc::new(AppState { tracking, trust_user_header });

    let router = create_router(state);
    let addr = format!("{host}:{port}");
    tracing::info!("Starting HTTP server on {}", addr);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let service = router.into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, service).await?;

    Ok(())
}
