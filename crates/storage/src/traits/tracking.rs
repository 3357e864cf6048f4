use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorm_sync_core::cmi::{
    CmiComment, CmiCorrectResponse, CmiInteraction, CmiNode, CmiObjective, StoredComment,
    StoredCorrectResponse, StoredInteraction, StoredNode, StoredObjective,
};
use scorm_sync_core::{GlobalObjective, GlobalObjectiveValues, OverallStatus};

use crate::error::StorageError;

/// Outcome of the atomic node insert-or-update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NodeUpsert {
    pub cmi_node_id: i64,
    /// `true` when a row for the key already existed.
    pub updated: bool,
}

/// CMI tables and global objectives.
#[async_trait]
pub trait TrackingStore: Send + Sync {
    /// Open a transaction. Dropping it without [`TrackingTx::commit`] rolls
    /// back every write made through it.
    async fn begin(&self) -> Result<Box<dyn TrackingTx>, StorageError>;

    async fn get_node(
        &self,
        cp_node_id: i64,
        user_id: i64,
    ) -> Result<Option<StoredNode>, StorageError>;

    async fn list_comments(&self, cmi_node_id: i64) -> Result<Vec<StoredComment>, StorageError>;

    async fn list_interactions(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredInteraction>, StorageError>;

    async fn list_objectives(&self, cmi_node_id: i64) -> Result<Vec<StoredObjective>, StorageError>;

    /// Correct responses of all interactions of a node.
    async fn list_correct_responses(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredCorrectResponse>, StorageError>;

    async fn get_global_objective(
        &self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
    ) -> Result<Option<GlobalObjective>, StorageError>;

    /// Number of global objective rows for a user in a scope.
    async fn count_global_objectives(&self, user_id: i64, scope_id: i64)
    -> Result<u64, StorageError>;
}

/// Writes inside one tracking transaction.
#[async_trait]
pub trait TrackingTx: Send {
    /// Insert or update the node keyed by `(node.cp_node_id, user_id)`.
    async fn upsert_node(
        &mut self,
        user_id: i64,
        node: &CmiNode,
        additional_tables: i64,
        now: DateTime<Utc>,
    ) -> Result<NodeUpsert, StorageError>;

    async fn purge_comments(&mut self, cmi_node_id: i64) -> Result<u64, StorageError>;

    /// Delete correct responses of every interaction of the node.
    async fn purge_correct_responses(&mut self, cmi_node_id: i64) -> Result<u64, StorageError>;

    async fn purge_interactions(&mut self, cmi_node_id: i64) -> Result<u64, StorageError>;

    async fn purge_objectives(&mut self, cmi_node_id: i64) -> Result<u64, StorageError>;

    async fn insert_comment(
        &mut self,
        cmi_node_id: i64,
        comment: &CmiComment,
    ) -> Result<i64, StorageError>;

    /// Returns the generated interaction id.
    async fn insert_interaction(
        &mut self,
        cmi_node_id: i64,
        interaction: &CmiInteraction,
    ) -> Result<i64, StorageError>;

    async fn insert_objective(
        &mut self,
        cmi_node_id: i64,
        cmi_interaction_id: Option<i64>,
        objective: &CmiObjective,
    ) -> Result<i64, StorageError>;

    async fn insert_correct_response(
        &mut self,
        cmi_interaction_id: i64,
        response: &CmiCorrectResponse,
    ) -> Result<i64, StorageError>;

    /// Insert or update the overall status row of a user in a scope.
    async fn upsert_overall_status(
        &mut self,
        user_id: i64,
        scope_id: i64,
        status: &OverallStatus,
    ) -> Result<(), StorageError>;

    /// Subset of `objective_ids` that already have a row.
    async fn existing_global_objectives(
        &mut self,
        user_id: i64,
        scope_id: i64,
        objective_ids: &[String],
    ) -> Result<Vec<String>, StorageError>;

    async fn update_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError>;

    /// Insert a row with a NULL status. A row created concurrently under the
    /// same key gets its values overwritten and keeps its status.
    async fn insert_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError>;

    async fn commit(self: Box<Self>) -> Result<(), StorageError>;
}
