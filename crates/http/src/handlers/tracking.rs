use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::{ConnectInfo, Path, Query, State},
    http::{
        HeaderMap, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use scorm_sync_core::cmi::NodeSnapshot;
use scorm_sync_service::CmiSyncResult;

use super::{require_local, trusted_user};
use crate::AppState;
use crate::api_error::ApiError;
use crate::api_types::TrackingQuery;

pub async fn post_unload(
    State(state): State<Arc<AppState>>,
    Path(package_id): Path<i64>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    state
        .tracking
        .record_unload(package_id, query.ref_id, trusted_user(&state, &headers), &body)
        .await?;
    Ok(blank())
}

/// Replies with JSON to players that accept `text/javascript`, otherwise
/// with a readable dump of the same map.
pub async fn post_cmi(
    State(state): State<Arc<AppState>>,
    Path(package_id): Path<i64>,
    Query(query): Query<TrackingQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Response, ApiError> {
    let result = state
        .tracking
        .persist_cmi_data(package_id, query.ref_id, trusted_user(&state, &headers), &body)
        .await?;
    let Some(result) = result else {
        return Ok(blank());
    };
    render_result(&result, wants_javascript(&headers))
}

pub async fn get_node(
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    State(state): State<Arc<AppState>>,
    Path((_package_id, cp_node_id, user_id)): Path<(i64, i64, i64)>,
) -> Result<Json<NodeSnapshot>, ApiError> {
    require_local(&addr)?;
    state
        .tracking
        .node_snapshot(cp_node_id, user_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("node {cp_node_id} of user {user_id} not found")))
}

fn wants_javascript(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .any(|v| v.contains("text/javascript"))
}

fn render_result(result: &CmiSyncResult, javascript: bool) -> Result<Response, ApiError> {
    if javascript {
        let json = serde_json::to_string(result).map_err(anyhow::Error::from)?;
        return Ok((StatusCode::OK, [(CONTENT_TYPE, "text/javascript")], json).into_response());
    }
    let dump = serde_json::to_string_pretty(result).map_err(anyhow::Error::from)?;
    Ok((StatusCode::OK, [(CONTENT_TYPE, "text/html")], format!("<pre>{dump}</pre>"))
        .into_response())
}

fn blank() -> Response {
    (StatusCode::OK, [(CONTENT_TYPE, "text/plain")], "").into_response()
}
