//! TrackingTx implementation over a sqlx transaction.

use std::sync::LazyLock;

use super::*;

use crate::traits::{NodeUpsert, TrackingTx};
use async_trait::async_trait;
use scorm_sync_core::{OVERALL_STATUS_OBJECTIVE_ID, OverallStatus};
use sqlx::Transaction;

/// `(xmax = 0)` is true only for a row created by this statement.
static UPSERT_NODE_SQL: LazyLock<String> = LazyLock::new(|| {
    let placeholders: Vec<String> =
        (1..=NODE_DATA_COLUMNS.len() + 4).map(|i| format!("${i}")).collect();
    let assignments: Vec<String> =
        NODE_DATA_COLUMNS.iter().map(|c| format!("{c} = EXCLUDED.{c}")).collect();
    format!(
        "INSERT INTO cmi_node (cp_node_id, user_id, c_timestamp, additional_tables, {columns})
         VALUES ({placeholders})
         ON CONFLICT (cp_node_id, user_id) DO UPDATE SET
           c_timestamp = EXCLUDED.c_timestamp,
           additional_tables = EXCLUDED.additional_tables,
           {assignments}
         RETURNING cmi_node_id, (xmax = 0) AS inserted",
        columns = node_columns(),
        placeholders = placeholders.join(","),
        assignments = assignments.join(", "),
    )
});

static INSERT_COMMENT_SQL: LazyLock<String> = LazyLock::new(|| {
    insert_sql("cmi_comment", &["cmi_node_id"], layout::comment::LAYOUT, "cmi_comment_id")
});

static INSERT_INTERACTION_SQL: LazyLock<String> = LazyLock::new(|| {
    insert_sql(
        "cmi_interaction",
        &["cmi_node_id"],
        layout::interaction::LAYOUT,
        "cmi_interaction_id",
    )
});

static INSERT_OBJECTIVE_SQL: LazyLock<String> = LazyLock::new(|| {
    insert_sql(
        "cmi_objective",
        &["cmi_node_id", "cmi_interaction_id"],
        layout::objective::LAYOUT,
        "cmi_objective_id",
    )
});

static INSERT_CORRECT_RESPONSE_SQL: LazyLock<String> = LazyLock::new(|| {
    insert_sql(
        "cmi_correct_response",
        &["cmi_interaction_id"],
        layout::correct_response::LAYOUT,
        "cmi_correct_resp_id",
    )
});

pub struct PgTrackingTx {
    tx: Transaction<'static, Postgres>,
}

impl PgTrackingTx {
    pub(crate) const fn new(tx: Transaction<'static, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl TrackingTx for PgTrackingTx {
    async fn upsert_node(
        &mut self,
        user_id: i64,
        node: &CmiNode,
        additional_tables: i64,
        now: DateTime<Utc>,
    ) -> Result<NodeUpsert, StorageError> {
        let cp_node_id = node.cp_node_id.ok_or_else(|| StorageError::MissingKey {
            table: "cmi_node",
            column: "cp_node_id",
        })?;
        let query = sqlx::query(UPSERT_NODE_SQL.as_str())
            .bind(cp_node_id)
            .bind(user_id)
            .bind(now)
            .bind(additional_tables);
        let row = bind_node(query, node).fetch_one(&mut *self.tx).await?;
        let inserted: bool = row.try_get("inserted")?;
        Ok(NodeUpsert { cmi_node_id: row.try_get("cmi_node_id")?, updated: !inserted })
    }

    async fn purge_comments(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM cmi_comment WHERE cmi_node_id = $1")
            .bind(cmi_node_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_correct_responses(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query(
            "DELETE FROM cmi_correct_response WHERE cmi_interaction_id IN (
               SELECT cmi_interaction_id FROM cmi_interaction WHERE cmi_node_id = $1)",
        )
        .bind(cmi_node_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(result.rows_affected())
    }

    async fn purge_interactions(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM cmi_interaction WHERE cmi_node_id = $1")
            .bind(cmi_node_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn purge_objectives(&mut self, cmi_node_id: i64) -> Result<u64, StorageError> {
        let result = sqlx::query("DELETE FROM cmi_objective WHERE cmi_node_id = $1")
            .bind(cmi_node_id)
            .execute(&mut *self.tx)
            .await?;
        Ok(result.rows_affected())
    }

    async fn insert_comment(
        &mut self,
        cmi_node_id: i64,
        comment: &CmiComment,
    ) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(INSERT_COMMENT_SQL.as_str())
        .bind(cmi_node_id)
        .bind(&comment.comment)
        .bind(&comment.timestamp)
        .bind(&comment.location)
        .bind(comment.source_is_lms)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_interaction(
        &mut self,
        cmi_node_id: i64,
        interaction: &CmiInteraction,
    ) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(INSERT_INTERACTION_SQL.as_str())
        .bind(cmi_node_id)
        .bind(&interaction.description)
        .bind(&interaction.id)
        .bind(&interaction.latency)
        .bind(&interaction.learner_response)
        .bind(&interaction.result)
        .bind(&interaction.timestamp)
        .bind(&interaction.interaction_type)
        .bind(interaction.weighting)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_objective(
        &mut self,
        cmi_node_id: i64,
        cmi_interaction_id: Option<i64>,
        objective: &CmiObjective,
    ) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(INSERT_OBJECTIVE_SQL.as_str())
        .bind(cmi_node_id)
        .bind(cmi_interaction_id)
        .bind(&objective.completion_status)
        .bind(&objective.description)
        .bind(&objective.id)
        .bind(objective.max)
        .bind(objective.min)
        .bind(objective.raw)
        .bind(objective.scaled)
        .bind(objective.progress_measure)
        .bind(&objective.success_status)
        .bind(&objective.scope)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn insert_correct_response(
        &mut self,
        cmi_interaction_id: i64,
        response: &CmiCorrectResponse,
    ) -> Result<i64, StorageError> {
        let id: i64 = sqlx::query_scalar(INSERT_CORRECT_RESPONSE_SQL.as_str())
        .bind(cmi_interaction_id)
        .bind(&response.pattern)
        .fetch_one(&mut *self.tx)
        .await?;
        Ok(id)
    }

    async fn upsert_overall_status(
        &mut self,
        user_id: i64,
        scope_id: i64,
        status: &OverallStatus,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO cmi_gobjective (objective_id, user_id, scope_id, status, satisfied, measure)
             VALUES ($1, $2, $3, $4, $5, $6)
             ON CONFLICT (objective_id, user_id, scope_id) DO UPDATE SET
               status = EXCLUDED.status,
               satisfied = EXCLUDED.satisfied,
               measure = EXCLUDED.measure",
        )
        .bind(OVERALL_STATUS_OBJECTIVE_ID)
        .bind(user_id)
        .bind(scope_id)
        .bind(&status.completed)
        .bind(&status.satisfied)
        .bind(&status.measure)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn existing_global_objectives(
        &mut self,
        user_id: i64,
        scope_id: i64,
        objective_ids: &[String],
    ) -> Result<Vec<String>, StorageError> {
        if objective_ids.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT objective_id FROM cmi_gobjective
             WHERE user_id = $1 AND scope_id = $2 AND objective_id = ANY($3)",
        )
        .bind(user_id)
        .bind(scope_id)
        .bind(objective_ids)
        .fetch_all(&mut *self.tx)
        .await?;
        Ok(ids)
    }

    async fn update_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "UPDATE cmi_gobjective SET
               satisfied = $1, measure = $2, score_raw = $3, score_min = $4, score_max = $5,
               completion_status = $6, progress_measure = $7
             WHERE objective_id = $8 AND user_id = $9 AND scope_id = $10",
        )
        .bind(&values.satisfied)
        .bind(&values.measure)
        .bind(&values.score_raw)
        .bind(&values.score_min)
        .bind(&values.score_max)
        .bind(&values.completion_status)
        .bind(&values.progress_measure)
        .bind(objective_id)
        .bind(user_id)
        .bind(scope_id)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn insert_global_objective(
        &mut self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
        values: &GlobalObjectiveValues,
    ) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO cmi_gobjective ({GOBJECTIVE_COLUMNS})
             VALUES ($1, $2, $3, NULL, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (objective_id, user_id, scope_id) DO UPDATE SET
               satisfied = EXCLUDED.satisfied,
               measure = EXCLUDED.measure,
               score_raw = EXCLUDED.score_raw,
               score_min = EXCLUDED.score_min,
               score_max = EXCLUDED.score_max,
               completion_status = EXCLUDED.completion_status,
               progress_measure = EXCLUDED.progress_measure"
        ))
        .bind(objective_id)
        .bind(user_id)
        .bind(scope_id)
        .bind(&values.satisfied)
        .bind(&values.measure)
        .bind(&values.score_raw)
        .bind(&values.score_min)
        .bind(&values.score_max)
        .bind(&values.completion_status)
        .bind(&values.progress_measure)
        .execute(&mut *self.tx)
        .await?;
        Ok(())
    }

    async fn commit(self: Box<Self>) -> Result<(), StorageError> {
        self.tx.commit().await?;
        Ok(())
    }
}
