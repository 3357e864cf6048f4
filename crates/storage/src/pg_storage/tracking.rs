//! TrackingStore reads for PgStorage.

use super::*;

use crate::traits::{TrackingStore, TrackingTx};
use async_trait::async_trait;

#[async_trait]
impl TrackingStore for PgStorage {
    async fn begin(&self) -> Result<Box<dyn TrackingTx>, StorageError> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(PgTrackingTx::new(tx)))
    }

    async fn get_node(
        &self,
        cp_node_id: i64,
        user_id: i64,
    ) -> Result<Option<StoredNode>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT cmi_node_id, cp_node_id, user_id, c_timestamp, additional_tables, {}
             FROM cmi_node WHERE cp_node_id = $1 AND user_id = $2",
            node_columns()
        ))
        .bind(cp_node_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_node(&r)).transpose()
    }

    async fn list_comments(&self, cmi_node_id: i64) -> Result<Vec<StoredComment>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cmi_comment WHERE cmi_node_id = $1
             ORDER BY cmi_comment_id",
            *COMMENT_COLUMNS
        ))
        .bind(cmi_node_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_comment).collect()
    }

    async fn list_interactions(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredInteraction>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cmi_interaction WHERE cmi_node_id = $1
             ORDER BY cmi_interaction_id",
            *INTERACTION_COLUMNS
        ))
        .bind(cmi_node_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_interaction).collect()
    }

    async fn list_objectives(&self, cmi_node_id: i64) -> Result<Vec<StoredObjective>, StorageError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM cmi_objective WHERE cmi_node_id = $1
             ORDER BY cmi_objective_id",
            *OBJECTIVE_COLUMNS
        ))
        .bind(cmi_node_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_objective).collect()
    }

    async fn list_correct_responses(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredCorrectResponse>, StorageError> {
        let rows = sqlx::query(
            "SELECT r.cmi_correct_resp_id, r.cmi_interaction_id, r.pattern
             FROM cmi_correct_response r
             JOIN cmi_interaction i ON i.cmi_interaction_id = r.cmi_interaction_id
             WHERE i.cmi_node_id = $1
             ORDER BY r.cmi_correct_resp_id",
        )
        .bind(cmi_node_id)
        .fetch_all(&self.pool)
        .await?;
        rows.iter().map(row_to_correct_response).collect()
    }

    async fn get_global_objective(
        &self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
    ) -> Result<Option<GlobalObjective>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {GOBJECTIVE_COLUMNS} FROM cmi_gobjective
             WHERE objective_id = $1 AND user_id = $2 AND scope_id = $3"
        ))
        .bind(objective_id)
        .bind(user_id)
        .bind(scope_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_global_objective(&r)).transpose()
    }

    async fn count_global_objectives(
        &self,
        user_id: i64,
        scope_id: i64,
    ) -> Result<u64, StorageError> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM cmi_gobjective WHERE user_id = $1 AND scope_id = $2",
        )
        .bind(user_id)
        .bind(scope_id)
        .fetch_one(&self.pool)
        .await?;
        Ok(u64::try_from(count).unwrap_or(0))
    }
}
