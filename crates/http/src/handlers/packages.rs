use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    extract::{ConnectInfo, Path, State},
};
use scorm_sync_core::PackageSettings;

use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::PackageSettingsRequest;
use crate::handlers::require_local;

pub async fn save_package(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    Path(package_id): Path<i64>,
    Json(req): Json<PackageSettingsRequest>,
) -> Result<Json<PackageSettings>, ApiError> {
    require_local(&addr)?;
    let settings = req.into_settings(package_id);
    state.tracking.save_package(&settings).await?;
    Ok(Json(settings))
}
