use serde_json::{Value, json};
use scorm_sync_core::PackageSettings;
use scorm_sync_storage::traits::TrackingStore;

use super::{Harness, PACKAGE, REF, USER, body, node_row};
use crate::ObjectiveMerger;

fn rollups(measure: f64) -> Value {
    json!({
        "status": {
            "-course_overall_status-": {
                "7": {"completed": "completed", "satisfied": "passed", "measure": measure}
            }
        },
        "measure": {"obj-a": {"7": {"100": measure}}},
        "satisfied": {"obj-a": {"7": {"100": true}}}
    })
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn first_merge_inserts_second_updates() {
    let h = Harness::new().await;
    let merger = ObjectiveMerger::new(std::sync::Arc::clone(&h.storage));
    let package = PackageSettings::new(PACKAGE);

    let overall = merger.merge(USER, &package, &rollups(0.5)).await.unwrap();
    assert_eq!(overall.completed.as_deref(), Some("completed"));
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 2);

    merger.merge(USER, &package, &rollups(0.75)).await.unwrap();
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 2);

    let row = h.storage.get_global_objective("obj-a", USER, PACKAGE).await.unwrap().unwrap();
    assert_eq!(row.values.measure.as_deref(), Some("0.75"));
    assert_eq!(row.values.satisfied.as_deref(), Some("true"));
    assert_eq!(row.status, None);

    let status = h
        .storage
        .get_global_objective("-course_overall_status-", USER, PACKAGE)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(status.status.as_deref(), Some("completed"));
    assert_eq!(status.values.satisfied.as_deref(), Some("passed"));
    assert_eq!(status.values.measure.as_deref(), Some("0.75"));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn system_wide_objectives_use_scope_zero() {
    let mut package = PackageSettings::new(PACKAGE);
    package.global_to_system = true;
    let h = Harness::with_package(package.clone()).await;
    let merger = ObjectiveMerger::new(std::sync::Arc::clone(&h.storage));

    merger.merge(USER, &package, &rollups(0.5)).await.unwrap();

    assert_eq!(h.storage.count_global_objectives(USER, 0).await.unwrap(), 2);
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 0);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn merge_runs_only_when_flagged() {
    let h = Harness::new().await;
    let mut commit = json!({
        "node": [node_row(42, Value::Null)],
        "adl_seq_utilities": rollups(0.5),
        "changed_seq_utilities": 0
    });
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&commit)).await.unwrap();
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 0);

    commit["changed_seq_utilities"] = json!(1);
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&commit)).await.unwrap();
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 2);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn merge_failure_rolls_back_status_row() {
    let h = Harness::new().await;
    let merger = ObjectiveMerger::new(std::sync::Arc::clone(&h.storage));
    h.memory.fail_inserts_into("cmi_gobjective").await;

    let result = merger.merge(USER, &PackageSettings::new(PACKAGE), &rollups(0.5)).await;

    assert!(result.is_err());
    assert_eq!(h.storage.count_global_objectives(USER, PACKAGE).await.unwrap(), 0);
}
