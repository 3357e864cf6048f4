use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json,
    body::{Bytes, to_bytes},
    extract::{ConnectInfo, Path, Query, State},
    http::{
        HeaderMap, HeaderValue, StatusCode,
        header::{ACCEPT, CONTENT_TYPE},
    },
    response::{IntoResponse, Response},
};
use scorm_sync_core::PackageSettings;
use scorm_sync_service::{Collaborators, TrackingService};
use scorm_sync_storage::StorageBackend;
use serde_json::{Value, json};

use crate::api_types::{PackageSettingsRequest, TrackingQuery};
use crate::handlers::{TRUSTED_USER_HEADER, attempts, header_user, packages, tracking, trusted_user};
use crate::{AppState, create_router};

const PACKAGE: i64 = 100;
const USER: i64 = 7;

/// State behind a gateway that sets [`TRUSTED_USER_HEADER`].
async fn test_state() -> Arc<AppState> {
    state_with_trust(true).await
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn state_with_trust(trust_user_header: bool) -> Arc<AppState> {
    let storage = Arc::new(StorageBackend::new_memory());
    let tracking = TrackingService::new(storage, Collaborators::noop(), 5);
    tracking.save_package(&PackageSettings::new(PACKAGE)).await.unwrap();
    Arc::new(AppState { tracking: Arc::new(tracking), trust_user_header })
}

fn local() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([127, 0, 0, 1], 50_000)))
}

fn remote() -> ConnectInfo<SocketAddr> {
    ConnectInfo(SocketAddr::from(([203, 0, 113, 9], 50_000)))
}

fn trusted(accept: Option<&'static str>) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(TRUSTED_USER_HEADER, HeaderValue::from(USER));
    if let Some(accept) = accept {
        headers.insert(ACCEPT, HeaderValue::from_static(accept));
    }
    headers
}

fn node_commit() -> Bytes {
    let mut row = vec![Value::Null; 41];
    row[19] = json!(42);
    Bytes::from(json!({"node": [row], "now_global_status": 1}).to_string())
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn read(response: Response) -> (StatusCode, Option<String>, String) {
    let status = response.status();
    let content_type =
        response.headers().get(CONTENT_TYPE).map(|v| v.to_str().unwrap().to_owned());
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
}

async fn post_cmi(state: &Arc<AppState>, headers: HeaderMap, body: Bytes) -> Response {
    tracking::post_cmi(
        State(Arc::clone(state)),
        Path(PACKAGE),
        Query(TrackingQuery::default()),
        headers,
        body,
    )
    .await
    .into_response()
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn cmi_replies_with_javascript_map() {
    let state = test_state().await;

    let response = post_cmi(&state, trusted(Some("text/javascript, */*")), node_commit()).await;
    let (status, content_type, body) = read(response).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/javascript"));
    let map: Value = serde_json::from_str(&body).unwrap();
    assert!(map["42"].is_i64());
    assert_eq!(map["new_global_status"], json!(1));
}

#[tokio::test]
async fn cmi_without_javascript_gets_debug_dump() {
    let state = test_state().await;

    let (status, content_type, body) =
        read(post_cmi(&state, trusted(None), node_commit()).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/html"));
    assert!(body.starts_with("<pre>"));
    assert!(body.contains("\"new_global_status\": 1"));
}

#[tokio::test]
async fn cmi_with_bad_session_is_forbidden() {
    let state = test_state().await;
    let body = Bytes::from(json!({"p": USER, "hash": 1, "node": []}).to_string());

    let (status, _, text) = read(post_cmi(&state, HeaderMap::new(), body).await).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text, "not allowed");
}

#[tokio::test]
async fn malformed_cmi_gets_blank_success() {
    let state = test_state().await;

    let (status, content_type, body) =
        read(post_cmi(&state, trusted(None), Bytes::from_static(b"garbage")).await).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(content_type.as_deref(), Some("text/plain"));
    assert!(body.is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn session_then_unload_updates_attempt() {
    let state = test_state().await;
    let Json(token) =
        attempts::open_session(local(), State(Arc::clone(&state)), Path((PACKAGE, USER)))
            .await
            .unwrap();

    let beacon = json!({"p": USER, "hash": token.hash, "last": "sco-1", "total_time_sec": 60});
    let response = tracking::post_unload(
        State(Arc::clone(&state)),
        Path(PACKAGE),
        Query(TrackingQuery { ref_id: 3 }),
        HeaderMap::new(),
        Bytes::from(beacon.to_string()),
    )
    .await
    .into_response();
    let (status, _, body) = read(response).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty());

    let Json(attempt) =
        attempts::get_attempt(local(), State(Arc::clone(&state)), Path((PACKAGE, USER)))
            .await
            .unwrap();
    assert_eq!(attempt.total_time_sec, Some(60));
    assert_eq!(attempt.last_visited.as_deref(), Some("sco-1"));
    assert_eq!(attempt.hash, Some(token.hash));
}

#[tokio::test]
async fn missing_attempt_is_not_found() {
    let state = test_state().await;
    let response =
        attempts::get_attempt(local(), State(state), Path((PACKAGE, 99))).await.into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_package_is_not_found() {
    let state = test_state().await;
    let response = tracking::post_cmi(
        State(state),
        Path(PACKAGE + 1),
        Query(TrackingQuery::default()),
        trusted(None),
        node_commit(),
    )
    .await
    .into_response();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn saved_package_settings_apply() {
    let state = test_state().await;
    let request: PackageSettingsRequest =
        serde_json::from_value(json!({"default_lesson_mode": "browse"})).unwrap();

    let Json(saved) =
        packages::save_package(local(), State(Arc::clone(&state)), Path(PACKAGE), Json(request))
            .await
            .unwrap();
    assert_eq!(saved.sco_count, 1);
    assert!(saved.comments);

    let (status, _, body) = read(post_cmi(&state, trusted(None), node_commit()).await).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.is_empty(), "browse mode tracks nothing");
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn node_snapshot_after_commit() {
    let state = test_state().await;
    let missing =
        tracking::get_node(local(), State(Arc::clone(&state)), Path((PACKAGE, 42, USER))).await;
    assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

    post_cmi(&state, trusted(None), node_commit()).await;

    let Json(snapshot) =
        tracking::get_node(local(), State(state), Path((PACKAGE, 42, USER))).await.unwrap();
    assert_eq!(snapshot.node.node.cp_node_id, Some(42));
    assert!(snapshot.comments.is_empty());
}

#[test]
fn trusted_user_header_parsing() {
    assert_eq!(header_user(&trusted(None)), Some(USER));
    assert_eq!(header_user(&HeaderMap::new()), None);

    let mut headers = HeaderMap::new();
    headers.insert(TRUSTED_USER_HEADER, HeaderValue::from_static("alice"));
    assert_eq!(header_user(&headers), None);
}

#[tokio::test]
async fn user_header_is_ignored_unless_trusted() {
    let state = state_with_trust(false).await;
    assert_eq!(trusted_user(&state, &trusted(None)), None);

    let (status, _, text) = read(post_cmi(&state, trusted(None), node_commit()).await).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text, "not allowed");

    let trusting = test_state().await;
    assert_eq!(trusted_user(&trusting, &trusted(None)), Some(USER));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn untrusted_player_still_writes_with_its_session() {
    let state = state_with_trust(false).await;
    let Json(token) =
        attempts::open_session(local(), State(Arc::clone(&state)), Path((PACKAGE, USER)))
            .await
            .unwrap();
    let mut row = vec![Value::Null; 41];
    row[19] = json!(42);
    let body = json!({"p": USER, "hash": token.hash, "node": [row]});

    let response = post_cmi(&state, HeaderMap::new(), Bytes::from(body.to_string())).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn remote_caller_cannot_open_a_session() {
    let state = test_state().await;
    let response =
        attempts::open_session(remote(), State(Arc::clone(&state)), Path((PACKAGE, USER)))
            .await
            .into_response();
    let (status, _, text) = read(response).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(text, "not allowed");

    let response =
        attempts::get_attempt(remote(), State(state), Path((PACKAGE, USER))).await.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn remote_caller_cannot_change_package_settings() {
    let state = test_state().await;
    let request: PackageSettingsRequest =
        serde_json::from_value(json!({"default_lesson_mode": "browse"})).unwrap();

    let response =
        packages::save_package(remote(), State(Arc::clone(&state)), Path(PACKAGE), Json(request))
            .await
            .into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let (_, _, body) = read(post_cmi(&state, trusted(None), node_commit()).await).await;
    assert!(!body.is_empty(), "package is still tracked");

    let response =
        tracking::get_node(remote(), State(state), Path((PACKAGE, 42, USER))).await.into_response();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn router_builds_with_state() {
    let state = test_state().await;
    let _router = create_router(state);
    assert_eq!(crate::health().await, "ok");
    assert_eq!(crate::version().await.0.version, env!("CARGO_PKG_VERSION"));
}
