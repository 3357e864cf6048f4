use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
};
use scorm_sync_core::AttemptSummary;
use scorm_sync_service::SessionToken;

use crate::AppState;
use crate::api_error::ApiError;
use crate::handlers::require_local;

pub async fn get_attempt(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    Path((package_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<AttemptSummary>, ApiError> {
    require_local(&addr)?;
    state.tracking.get_attempt(package_id, user_id).await?.map(Json).ok_or_else(|| {
        ApiError::NotFound(format!("attempt of user {user_id} in package {package_id} not found"))
    })
}

/// Called by the host platform when it launches the player.
pub async fn open_session(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    Path((package_id, user_id)): Path<(i64, i64)>,
) -> Result<Json<SessionToken>, ApiError> {
    require_local(&addr)?;
    Ok(Json(state.tracking.open_session(package_id, user_id).await?))
}
