use chrono::{Duration, Utc};
use scorm_sync_core::PackageSettings;
use serde_json::json;

use super::{HASH, Harness, PACKAGE, PlatformCall, REF, USER, body};

#[expect(clippy::unwrap_used, reason = "test code")]
async fn authoritative_harness() -> Harness {
    let mut settings = PackageSettings::new(PACKAGE);
    settings.time_from_lms = true;
    let h = Harness::with_package(settings).await;
    assert!(h.service.get_attempt(PACKAGE, USER).await.unwrap().is_some());
    h
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unload_with_authoritative_time() {
    let h = authoritative_harness().await;
    let beacon = json!({"p": USER, "hash": HASH, "last": "sco-3", "total_time_sec": "120"});

    h.service.record_unload(PACKAGE, REF, None, &body(&beacon)).await.unwrap();

    let attempt = h.service.get_attempt(PACKAGE, USER).await.unwrap().unwrap();
    assert_eq!(attempt.total_time_sec, Some(120));
    assert_eq!(attempt.last_visited.as_deref(), Some("sco-3"));
    let hash_end = attempt.hash_end.unwrap();
    assert!(hash_end > Utc::now() + Duration::minutes(4));
    assert!(hash_end <= Utc::now() + Duration::minutes(5));
    assert!(attempt.last_access.is_some());

    assert_eq!(
        h.platform.read_events(),
        vec![PlatformCall::ReadEvent {
            package_id: PACKAGE,
            user_id: USER,
            event_type: "sahs".to_owned(),
            ref_id: REF,
            time_from_lms: true,
        }]
    );
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unload_without_time_keeps_total_and_sends_no_event() {
    let h = authoritative_harness().await;
    let beacon = json!({"last": "", "total_time_sec": ""});

    h.service.record_unload(PACKAGE, REF, Some(USER), &body(&beacon)).await.unwrap();

    let attempt = h.service.get_attempt(PACKAGE, USER).await.unwrap().unwrap();
    assert_eq!(attempt.total_time_sec, None);
    assert_eq!(attempt.last_visited, None, "empty last is stored as NULL");
    assert!(attempt.last_access.is_some());
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unparsable_time_keeps_total_but_sends_event() {
    let h = authoritative_harness().await;
    let first = json!({"total_time_sec": 90});
    h.service.record_unload(PACKAGE, REF, Some(USER), &body(&first)).await.unwrap();

    let beacon = json!({"last": "sco-1", "total_time_sec": "1:30"});
    h.service.record_unload(PACKAGE, REF, Some(USER), &body(&beacon)).await.unwrap();

    let attempt = h.service.get_attempt(PACKAGE, USER).await.unwrap().unwrap();
    assert_eq!(attempt.total_time_sec, Some(90));
    assert_eq!(attempt.last_visited.as_deref(), Some("sco-1"));
    assert_eq!(h.platform.read_events().len(), 2);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unload_when_content_measures_time_sends_no_event() {
    let h = Harness::new().await;
    let beacon = json!({"last": "x", "total_time_sec": 30});

    h.service.record_unload(PACKAGE, REF, Some(USER), &body(&beacon)).await.unwrap();

    let attempt = h.service.get_attempt(PACKAGE, USER).await.unwrap().unwrap();
    assert_eq!(attempt.total_time_sec, Some(30));
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn malformed_unload_is_a_no_op() {
    let h = authoritative_harness().await;
    let before = h.service.get_attempt(PACKAGE, USER).await.unwrap();

    for raw in [&b""[..], b"not json", b"[1,2]"] {
        h.service.record_unload(PACKAGE, REF, None, raw).await.unwrap();
    }

    assert_eq!(h.service.get_attempt(PACKAGE, USER).await.unwrap(), before);
    assert!(h.platform.calls().is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn unload_with_wrong_hash_writes_nothing() {
    let h = authoritative_harness().await;
    let before = h.service.get_attempt(PACKAGE, USER).await.unwrap();
    let beacon = json!({"p": USER, "hash": HASH + 1, "last": "x", "total_time_sec": 5});

    let result = h.service.record_unload(PACKAGE, REF, None, &body(&beacon)).await;

    assert!(result.is_err_and(|e| e.is_unauthorized()));
    assert_eq!(h.service.get_attempt(PACKAGE, USER).await.unwrap(), before);
    assert!(h.platform.calls().is_empty());
}
