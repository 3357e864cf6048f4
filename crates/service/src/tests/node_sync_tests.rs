use serde_json::{Value, json};
use scorm_sync_core::cmi::NodeSnapshot;

use super::{HASH, Harness, PACKAGE, REF, USER, body, node_row};

/// A commit for node 42 with one row in every child table.
fn full_commit(i_set: i64) -> Value {
    json!({
        "p": USER,
        "hash": HASH,
        "i_check": 15,
        "i_set": i_set,
        "node": [node_row(42, Value::Null)],
        "comment": [[0, 0, "nice", "2024-01-01", "p1", 0]],
        "interaction": [[1, 0, "d", "q1", "PT1S", "a", "correct", "t", "choice", 1.0]],
        "objective": [
            [1, 0, 0, "completed", "", "o1"],
            [99, 0, 0, "incomplete", "", "o2"]
        ],
        "correct_response": [[0, 1, "a"], [0, 99, "b"], [0, null, "c"]]
    })
}

#[expect(clippy::unwrap_used, reason = "test code")]
async fn snapshot(h: &Harness) -> NodeSnapshot {
    h.service.node_snapshot(42, USER).await.unwrap().unwrap()
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn first_commit_inserts_node_and_returns_its_id() {
    let h = Harness::new().await;
    let commit = json!({"p": USER, "hash": HASH, "i_set": 0, "node": [node_row(42, Value::Null)]});

    let result = h.service.persist_cmi_data(PACKAGE, REF, None, &body(&commit)).await.unwrap();
    let result = result.unwrap();

    assert_eq!(result.nodes.len(), 1);
    let id = result.nodes["42"];
    let stored = snapshot(&h).await;
    assert_eq!(stored.node.cmi_node_id, id);
    assert_eq!(stored.node.user_id, USER);
    assert_eq!(stored.node.node.completion_status.as_deref(), Some("incomplete"));
    assert!(stored.comments.is_empty());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn resync_keeps_the_same_node_id() {
    let h = Harness::new().await;
    let commit = json!({"p": USER, "hash": HASH, "node": [node_row(42, Value::Null)]});

    let first = h.service.persist_cmi_data(PACKAGE, REF, None, &body(&commit)).await.unwrap();
    let second = h.service.persist_cmi_data(PACKAGE, REF, None, &body(&commit)).await.unwrap();

    assert_eq!(first.unwrap().nodes["42"], second.unwrap().nodes["42"]);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn children_link_to_node_and_interactions() {
    let h = Harness::new().await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();

    let stored = snapshot(&h).await;
    let node_id = stored.node.cmi_node_id;
    assert_eq!(stored.node.additional_tables, Some(15));

    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.comments[0].cmi_node_id, node_id);
    assert_eq!(stored.comments[0].comment.comment.as_deref(), Some("nice"));

    assert_eq!(stored.interactions.len(), 1);
    let interaction_id = stored.interactions[0].cmi_interaction_id;

    let linked = stored.objectives.iter().find(|o| o.objective.id.as_deref() == Some("o1"));
    assert_eq!(linked.unwrap().cmi_interaction_id, Some(interaction_id));
    let dangling = stored.objectives.iter().find(|o| o.objective.id.as_deref() == Some("o2"));
    assert_eq!(dangling.unwrap().cmi_interaction_id, None, "unresolved reference is NULL");

    assert_eq!(stored.correct_responses.len(), 1, "unresolved correct responses are skipped");
    assert_eq!(stored.correct_responses[0].cmi_interaction_id, interaction_id);
    assert_eq!(stored.correct_responses[0].response.pattern.as_deref(), Some("a"));
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn full_instruction_mask_replaces_children() {
    let h = Harness::new().await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(15))).await.unwrap();

    let stored = snapshot(&h).await;
    assert_eq!(stored.comments.len(), 1);
    assert_eq!(stored.interactions.len(), 1);
    assert_eq!(stored.objectives.len(), 2);
    assert_eq!(stored.correct_responses.len(), 1);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn empty_instruction_mask_appends_children() {
    let h = Harness::new().await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();

    let stored = snapshot(&h).await;
    assert_eq!(stored.comments.len(), 2);
    assert_eq!(stored.interactions.len(), 2);
    assert_eq!(stored.objectives.len(), 4);
    assert_eq!(stored.correct_responses.len(), 2);
}

/// Row counts after two commits of [`full_commit`], the second with `i_set`.
#[expect(clippy::unwrap_used, reason = "test code")]
async fn counts_after_resync(i_set: i64) -> [usize; 4] {
    let h = Harness::new().await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(i_set))).await.unwrap();
    let stored = snapshot(&h).await;
    [
        stored.comments.len(),
        stored.interactions.len(),
        stored.objectives.len(),
        stored.correct_responses.len(),
    ]
}

#[tokio::test]
async fn partial_instruction_masks_replace_only_their_tables() {
    // [comments, interactions, objectives, correct responses]
    assert_eq!(counts_after_resync(2).await, [2, 1, 4, 1]);
    assert_eq!(counts_after_resync(4).await, [2, 2, 4, 1]);
    assert_eq!(counts_after_resync(6).await, [2, 1, 4, 1]);
    assert_eq!(counts_after_resync(8).await, [1, 2, 4, 2]);
    assert_eq!(counts_after_resync(1).await, [2, 2, 2, 2]);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn concurrent_first_commits_share_one_node() {
    let h = Harness::new().await;
    let commit = body(&json!({"i_set": 0, "node": [node_row(42, Value::Null)]}));

    let (a, b) = tokio::join!(
        h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &commit),
        h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &commit),
    );

    let (a, b) = (a.unwrap().unwrap(), b.unwrap().unwrap());
    assert_eq!(a.nodes["42"], b.nodes["42"]);
    assert_eq!(snapshot(&h).await.node.cmi_node_id, a.nodes["42"]);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn want_flags_protect_unwanted_collections() {
    let mut settings = scorm_sync_core::PackageSettings::new(PACKAGE);
    settings.comments = false;
    let h = Harness::with_package(settings).await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(15))).await.unwrap();

    let stored = snapshot(&h).await;
    assert_eq!(stored.comments.len(), 2, "comments are not purged when unwanted");
    assert_eq!(stored.interactions.len(), 1);
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn children_without_node_are_ignored() {
    let h = Harness::new().await;
    let commit = json!({
        "comment": [[0, 0, "orphan", "", "", 0]],
        "interaction": [[1, 0, "d", "q1"]]
    });

    let result = h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&commit)).await;

    assert!(result.unwrap().unwrap().nodes.is_empty());
    assert!(h.service.node_snapshot(42, USER).await.unwrap().is_none());
}

#[tokio::test]
#[expect(clippy::unwrap_used, reason = "test code")]
async fn store_failure_rolls_back_the_whole_sync() {
    let h = Harness::new().await;
    h.memory.fail_inserts_into("cmi_interaction").await;

    let result = h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await;

    assert!(result.is_err());
    assert!(h.service.node_snapshot(42, USER).await.unwrap().is_none());
    assert!(h.platform.calls().is_empty(), "nothing reported after a failed sync");

    h.memory.clear_failures().await;
    h.service.persist_cmi_data(PACKAGE, REF, Some(USER), &body(&full_commit(0))).await.unwrap();
    assert_eq!(snapshot(&h).await.interactions.len(), 1);
}
