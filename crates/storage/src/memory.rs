//! In-process storage backend.
//!
//! Used when no database is configured and by tests. A transaction holds the
//! state lock, writes in place and keeps an undo log that is replayed when it
//! is dropped without commit.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorm_sync_core::cmi::{
    CmiComment, CmiCorrectResponse, CmiInteraction, CmiNode, CmiObjective, StoredComment,
    StoredCorrectResponse, StoredInteraction, StoredNode, StoredObjective,
};
use scorm_sync_core::{
    AttemptSummary, GlobalObjective, GlobalObjectiveValues, OVERALL_STATUS_OBJECTIVE_ID,
    OverallStatus, PackageSettings, StatusUpdate, UnloadUpdate,
};
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::error::StorageError;
use crate::traits::{AttemptStore, NodeUpsert, PackageStore, TrackingStore, TrackingTx};

type GlobalKey = (String, i64, i64);

#[derive(Debug, Clone, Default)]
struct Sequences {
    node: i64,
    comment: i64,
    interaction: i64,
    objective: i64,
    correct_response: i64,
}

fn next(counter: &mut i64) -> i64 {
    *counter = counter.saturating_add(1);
    *counter
}

/// Child tables are keyed by surrogate id, so iteration follows insert order.
#[derive(Debug, Default)]
struct MemoryState {
    packages: BTreeMap<i64, PackageSettings>,
    attempts: BTreeMap<(i64, i64), AttemptSummary>,
    nodes: BTreeMap<i64, StoredNode>,
    comments: BTreeMap<i64, StoredComment>,
    interactions: BTreeMap<i64, StoredInteraction>,
    objectives: BTreeMap<i64, StoredObjective>,
    correct_responses: BTreeMap<i64, StoredCorrectResponse>,
    global_objectives: BTreeMap<GlobalKey, GlobalObjective>,
    seq: Sequences,
    /// Tables whose inserts fail, for exercising rollback.
    failing: BTreeSet<&'static str>,
}

impl MemoryState {
    fn check(&self, table: &'static str) -> Result<(), StorageError> {
        if self.failing.contains(table) {
            return Err(StorageError::Database(sqlx::Error::Protocol(format!(
                "injected failure on {table}"
            ))));
        }
        Ok(())
    }

    fn node_id(&self, cp_node_id: i64, user_id: i64) -> Option<i64> {
        self.nodes
            .values()
            .find(|n| n.node.cp_node_id == Some(cp_node_id) && n.user_id == user_id)
            .map(|n| n.cmi_node_id)
    }

    fn interaction_ids(&self, cmi_node_id: i64) -> BTreeSet<i64> {
        self.interactions
            .values()
            .filter(|i| i.cmi_node_id == cmi_node_id)
            .map(|i| i.cmi_interaction_id)
            .collect()
    }

    fn undo(&mut self, entry: Undo) {
        match entry {
            Undo::Node(id, prior) => restore(&mut self.nodes, id, prior),
            Undo::Comment(id, prior) => restore(&mut self.comments, id, prior),
            Undo::Interaction(id, prior) => restore(&mut self.interactions, id, prior),
            Undo::Objective(id, prior) => restore(&mut self.objectives, id, prior),
            Undo::CorrectResponse(id, prior) => restore(&mut self.correct_responses, id, prior),
            Undo::Global(key, prior) => restore(&mut self.global_objectives, key, prior),
        }
    }
}

/// A row as it was before the transaction touched it; `None` if it did not
/// exist.
enum Undo {
    Node(i64, Option<StoredNode>),
    Comment(i64, Option<StoredComment>),
    Interaction(i64, Option<StoredInteraction>),
    Objective(i64, Option<StoredObjective>),
    CorrectResponse(i64, Option<StoredCorrectResponse>),
    Global(GlobalKey, Option<GlobalObjective>),
}

fn restore<K: Ord, V>(table: &mut BTreeMap<K, V>, key: K, prior: Option<V>) {
    match prior {
        Some(row) => {
            table.insert(key, row);
        },
        None => {
            table.remove(&key);
        },
    }
}

/// Remove every row matching `doomed`, logging each for rollback.
fn purge<V>(
    table: &mut BTreeMap<i64, V>,
    log: &mut Vec<Undo>,
    wrap: fn(i64, Option<V>) -> Undo,
    doomed: impl Fn(&V) -> bool,
) -> u64 {
    let ids: Vec<i64> = table.iter().filter(|(_, row)| doomed(row)).map(|(id, _)| *id).collect();
    for id in &ids {
        if let Some(row) = table.remove(id) {
            log.push(wrap(*id, Some(row)));
        }
    }
    u64::try_from(ids.len()).unwrap_or(u64::MAX)
}

#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every insert into `table` fail until cleared.
    pub async fn fail_inserts_into(&self, table: &'static str) {
        self.state.lock().await.failing.insert(table);
    }

    pub async fn clear_failures(&self) {
        self.state.lock().await.failing.clear();
    }
}

#[async_trait]
impl AttemptStore for MemoryStorage {
    async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
        hash: i64,
        hash_end: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        let mut state = self.state.lock().await;
        let attempt = state
            .attempts
            .entry((package_id, user_id))
            .or_insert_with(|| AttemptSummary::new(package_id, user_id));
        attempt.hash = Some(hash);
        attempt.hash_end = Some(hash_end);
        Ok(())
    }

    async fn live_session_hash(
        &self,
        package_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.attempts.get(&(package_id, user_id)).and_then(|a| a.live_hash(now)))
    }

    async fn get_attempt(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<Option<AttemptSummary>, StorageError> {
        Ok(self.state.lock().await.attempts.get(&(package_id, user_id)).cloned())
    }

    async fn record_unload(
        &self,
        package_id: i64,
        user_id: i64,
        update: &UnloadUpdate,
    ) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        let Some(attempt) = state.attempts.get_mut(&(package_id, user_id)) else {
            return Ok(false);
        };
        if let Some(total) = update.total_time_sec {
            attempt.total_time_sec = Some(total);
        }
        attempt.last_visited.clone_from(&update.last_visited);
        attempt.hash_end = Some(update.hash_end);
        attempt.last_access = Some(update.last_access);
        Ok(true)
    }

    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        update: &StatusUpdate,
    ) -> Result<bool, StorageError> {
        let mut state = self.state.lock().await;
        let Some(attempt) = state.attempts.get_mut(&(package_id, user_id)) else {
            return Ok(false);
        };
        attempt.sco_total_time_sec = Some(update.sco_total_time_sec);
        attempt.status = update.status;
        attempt.percentage_completed = update.percentage_completed;
        if let Some(hash_end) = update.hash_end {
            attempt.hash_end = Some(hash_end);
        }
        Ok(true)
    }
}

#[async_trait]
impl PackageStore for MemoryStorage {
    async fn save_package(&self, settings: &PackageSettings) -> Result<(), StorageError> {
        self.state.lock().await.packages.insert(settings.package_id, settings.clone());
        Ok(())
    }

    async fn get_package(&self, package_id: i64) -> Result<Option<PackageSettings>, StorageError> {
        Ok(self.state.lock().await.packages.get(&package_id).cloned())
    }
}

#[async_trait]
impl TrackingStore for MemoryStorage {
    async fn begin(&self) -> Result<Box<dyn TrackingTx>, StorageError> {
        let state = Arc::clone(&self.state).lock_owned().await;
        Ok(Box::new(MemoryTx { state, undo: Vec::new() }))
    }

    async fn get_node(
        &self,
        cp_node_id: i64,
        user_id: i64,
    ) -> Result<Option<StoredNode>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.node_id(cp_node_id, user_id).and_then(|id| state.nodes.get(&id)).cloned())
    }

    async fn list_comments(&self, cmi_node_id: i64) -> Result<Vec<StoredComment>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.comments.values().filter(|c| c.cmi_node_id == cmi_node_id).cloned().collect())
    }

    async fn list_interactions(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredInteraction>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.interactions.values().filter(|i| i.cmi_node_id == cmi_node_id).cloned().collect())
    }

    async fn list_objectives(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredObjective>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.objectives.values().filter(|o| o.cmi_node_id == cmi_node_id).cloned().collect())
    }

    async fn list_correct_responses(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredCorrectResponse>, StorageError> {
        let state = self.state.lock().await;
        let interactions = state.interaction_ids(cmi_node_id);
        Ok(state
            .correct_responses
            .values()
            .filter(|r| interactions.contains(&r.cmi_interaction_id))
            .cloned()
            .collect())
    }

    async fn get_global_objective(
        &self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
    ) -> Result<Option<GlobalObjective>, StorageError> {
        let state = self.state.lock().await;
        Ok(state.global_objectives.get(&(objective_id.to_owned(), user_id, scope_id)).cloned())
    }

    async fn count_global_objectives(
        &self,
        user_id: i64,
        scope_id: i64,
    ) -> Result<u64, StorageError> {
        let state = self.state.lock().await;
        let count = state
            .global_objectives
            .values()
            .filter(|g| g.user_id == user_id && g.scope_id == scope_id)
            .count();
        Ok(u64::try_from(count).unwrap_or(u64::MAX))
    }
}

/// Dropping without commit replays `undo` in reverse. Sequence values are
/// not given back, as with Postgres sequences.
struct MemoryTx {
    state: OwnedMutexGuard<MemoryState>,
    undo: Vec<Undo>,
}

impl Drop for MemoryTx {
    fn drop(&mut self) {
        while let Some(entry) = self.undo.pop() {
            self.state.undo(entry);
        }
    }
}

impl MemoryTx {
    fn put_global(&mut self, key: GlobalKey, row: GlobalObjective) {
        let prior = self.state.global_objectives.insert(key.clone(), row);
        self.undo.push(Undo::Global(key, prior));
    }
}

#[async_trait]
impl TrackingTx for MemoryTx {
    async fn upsert_node(
        &mut self,
        user_id: i64,
        node: &CmiNode,
        additional_tables: i64,
        now: DateTime<Utc>,
    ) -> Result<NodeUpsert, StorageError> {
        self.state.check("cmi_node")?;
        let cp_node_id = node.cp_node_id.ok_or_else(|| StorageError::MissingKey {
            table: "cmi_node",
            column: "cp_node_id",
        })?;
        let existing = self.state.node_id(cp_node_id, user_id);
        let cmi_node_id = match existing {
            Some(id) => id,
            None => next(&mut self.state.seq.node),
        };
        let prior = self.state.nodes.insert(
            cmi_node_id,
            StoredNode {
                cmi_node_id,
                user_id,
                additional_tables: Some(additional_tables),
                timestamp: Some(now),
                node: node.clone(),
            },
        );
        self.undo.push(Undo::Node(cmi_node_id, prior));
        Ok(NodeUpsert { cmi_node_id, updated: existing.is_some() })
    }

    async fn purge_comments(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        Ok(purge(&mut self.state.comments, &mut self.undo, Undo::Comment, |c| {
            c.cmi_node_id == cmi_node_id
        }))
    }

    async fn purge_correct_responses(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        let interactions = self.state.interaction_ids(cmi_node_id);
        Ok(purge(&mut self.state.correct_responses, &mut self.undo, Undo::CorrectResponse, |r| {
            interactions.contains(&r.cmi_interaction_id)
        }))
    }

    async fn purge_interactions(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        Ok(purge(&mut self.state.interactions, &mut self.undo, Undo::Interaction, |i| {
            i.cmi_node_id == cmi_node_id
        }))
    }

    async fn purge_objectives(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        Ok(purge(&mut self.state.objectives, &mut self.undo, Undo::Objective, |o| {
            o.cmi_node_id == cmi_node_id
        }))
    }

    async fn insert_comment(
        &mut self,
        cmi_node_id: i64,
        comment: &CmiComment,
    ) -> Result<i64, StorageError> {
        self.state.check("cmi_comment")?;
        let cmi_comment_id = next(&mut self.state.seq.comment);
        self.state.comments.insert(
            cmi_comment_id,
            StoredComment { cmi_comment_id, cmi_node_id, comment: comment.clone() },
        );
        self.undo.push(Undo::Comment(cmi_comment_id, None));
        Ok(cmi_comment_id)
    }

    async fn insert_interaction(
        &mut self,
        cmi_node_id: i64,
        interaction: &CmiInteraction,
    ) -> Result<i64, StorageError> {
        self.state.check("cmi_interaction")?;
        let cmi_interaction_id = next(&mut self.state.seq.interaction);
        self.state.interactions.insert(
            cmi_interaction_id,
            StoredInteraction {
                cmi_interaction_id,
                cmi_node_id,
                interaction: CmiInteraction { local_id: None, ..interaction.clone() },
            },
        );
        self.undo.push(Undo::Interaction(cmi_interaction_id, None));
        Ok(cmi_interaction_id)
    }

    async fn insert_objective(
        &mut self,
        cmi_node_id: i64,
        cmi_interaction_id: Option<i64>,
        objective: &CmiObjective,
    ) -> Result<i64, StorageError> {
        self.state.check("cmi_objective")?;
        let cmi_objective_id = next(&mut self.state.seq.objective);
        self.state.objectives.insert(
            cmi_objective_id,
            StoredObjective {
                cmi_objective_id,
                cmi_node_id,
                cmi_interaction_id,
                objective: CmiObjective { interaction_ref: None, ..objective.clone() },
            },
        );
        self.undo.push(Undo::Objective(cmi_objective_id, None));
        Ok(cmi_objective_id)
    }

    async fn insert_correct_response(
        &mut self,
        cmi_interaction_id: i64,
        response: &CmiCorrectResponse,
    ) -> Result<i64, StorageError> {
        self.state.check("cmi_correct_response")?;
        let cmi_correct_resp_id = next(&mut self.state.seq.correct_response);
        self.state.correct_responses.insert(
            cmi_correct_resp_id,
            StoredCorrectResponse {
                cmi_correct_resp_id,
                cmi_interaction_id,
                response: CmiCorrectResponse {
                    interaction_ref: None,
                    pattern: response.pattern.clone(),
                },
            },
        );
        self.undo.push(Undo::CorrectResponse(cmi_correct_resp_id, None));
        Ok(cmi_correct_resp_id)
    }

    async fn upsert_overall_status(
        &mut self,
        user_id: i64,
        scope_id: i64,
        status: &OverallStatus,
    ) -> Result<(), StorageError> {
        self.state.check("cmi_gobjective")?;
        let key = (OVERALL_STATUS_OBJECTIVE_ID.to_owned(), user_id, scope_id);
        let mut row = self.state.global_objectives.get(&key).cloned().unwrap_or_else(|| {
            GlobalObjective {
                objective_id: OVERALL_STATUS_OBJECTIVE_ID.to_owned(),
                user_id,
                scope_id,
                status: None,
                values: GlobalObjectiveValues::default(),
            }
        });
        row.status.clone_from(&status.completed);
        row.values.satisfied.clone_from(&status.satisfied);
        row.values.measure.clone_from(&status.measure);
        self.put_global(key, row);
        Ok(())
    }

    async fn existing_global_objectives(
        &mut self,
        user_id: i64,
        scope_id: i64,
        objective_ids: &[String],
    ) -> Result<Vec<String>, StorageError> {
        Ok(objective_ids
            .iter()
            .filter(|id| {
                self.state.global_objectives.contains_key(&((*id).clone(), user_id, scope_id))
            })
            .cloned()
            .collect())
    }

    async fn update_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError> {
        let key = (objective_id.to_owned(), user_id, scope_id);
        if let Some(row) = self.state.global_objectives.get(&key) {
            let row = GlobalObjective { values: values.clone(), ..row.clone() };
            self.put_global(key, row);
        }
        Ok(())
    }

    async fn insert_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError> {
        self.state.check("cmi_gobjective")?;
        let key = (objective_id.to_owned(), user_id, scope_id);
        let status = self.state.global_objectives.get(&key).and_then(|row| row.status.clone());
        let row = GlobalObjective {
            objective_id: objective_id.to_owned(),
            user_id,
            scope_id,
            status,
            values: values.clone(),
        };
        self.put_global(key, row);
        Ok(())
    }

    async fn commit(mut self: Box<Self>) -> Result<(), StorageError> {
        self.undo.clear();
        Ok(())
    }
}
