//! PostgreSQL storage backend using sqlx.
//!
//! Split into modular files by table family.

#![allow(clippy::absolute_paths, reason = "std paths in error handling are clear")]

mod attempts;
mod packages;
mod tracking;
mod tx;

use std::sync::LazyLock;

use crate::error::StorageError;
use chrono::{DateTime, Utc};
use scorm_sync_core::cmi::layout::{self, FieldSpec};
use scorm_sync_core::cmi::{
    CmiComment, CmiCorrectResponse, CmiInteraction, CmiNode, CmiObjective, StoredComment,
    StoredCorrectResponse, StoredInteraction, StoredNode, StoredObjective,
};
use scorm_sync_core::{
    AttemptSummary, GlobalObjective, GlobalObjectiveValues, LessonMode, PackageSettings,
    PG_POOL_ACQUIRE_TIMEOUT_SECS, PG_POOL_IDLE_TIMEOUT_SECS, PG_POOL_MAX_CONNECTIONS,
};
use sqlx::postgres::{PgArguments, PgPoolOptions, PgRow};
use sqlx::query::Query;
use sqlx::{PgPool, Postgres, Row};

use super::pg_migrations::run_pg_migrations;

pub use tx::PgTrackingTx;

#[derive(Clone, Debug)]
pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Connect and bring the schema up to date.
    pub async fn new(database_url: &str) -> Result<Self, StorageError> {
        let pool = PgPoolOptions::new()
            .max_connections(PG_POOL_MAX_CONNECTIONS)
            .acquire_timeout(std::time::Duration::from_secs(PG_POOL_ACQUIRE_TIMEOUT_SECS))
            .idle_timeout(std::time::Duration::from_secs(PG_POOL_IDLE_TIMEOUT_SECS))
            .test_before_acquire(true)
            .connect(database_url)
            .await?;
        run_pg_migrations(&pool).await?;
        tracing::info!("PgStorage initialized");
        Ok(Self { pool })
    }
}

pub(crate) const ATTEMPT_COLUMNS: &str =
    "obj_id, user_id, hash, hash_end, total_time_sec, sco_total_time_sec, last_visited,
     last_access, status, percentage_completed";

pub(crate) const PACKAGE_COLUMNS: &str =
    "obj_id, default_lesson_mode, comments, interactions, objectives, time_from_lms,
     global_to_system, sco_count";

/// Data columns of `cmi_node` in bind order, see [`bind_node`].
pub(crate) static NODE_DATA_COLUMNS: LazyLock<Vec<&'static str>> =
    LazyLock::new(layout::node::data_columns);

pub(crate) static COMMENT_COLUMNS: LazyLock<String> =
    LazyLock::new(|| column_list(&["cmi_comment_id", "cmi_node_id"], layout::comment::LAYOUT));

pub(crate) static INTERACTION_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    column_list(&["cmi_interaction_id", "cmi_node_id"], layout::interaction::LAYOUT)
});

pub(crate) static OBJECTIVE_COLUMNS: LazyLock<String> = LazyLock::new(|| {
    column_list(
        &["cmi_objective_id", "cmi_node_id", "cmi_interaction_id"],
        layout::objective::LAYOUT,
    )
});

pub(crate) const GOBJECTIVE_COLUMNS: &str =
    "objective_id, user_id, scope_id, status, satisfied, measure, score_raw, score_min,
     score_max, completion_status, progress_measure";

pub(crate) fn node_columns() -> String {
    NODE_DATA_COLUMNS.join(", ")
}

/// `keys` followed by the stored columns of `layout`.
fn column_list(keys: &[&str], layout: &[FieldSpec]) -> String {
    keys.iter().copied().chain(layout::stored_columns(layout)).collect::<Vec<_>>().join(", ")
}

/// `INSERT` binding `keys` first, then the stored columns of `layout` in
/// wire order.
pub(crate) fn insert_sql(
    table: &str,
    keys: &[&str],
    layout: &[FieldSpec],
    returning: &str,
) -> String {
    let count = keys.len() + layout::stored_columns(layout).len();
    let placeholders: Vec<String> = (1..=count).map(|i| format!("${i}")).collect();
    format!(
        "INSERT INTO {table} ({columns}) VALUES ({placeholders}) RETURNING {returning}",
        columns = column_list(keys, layout),
        placeholders = placeholders.join(", "),
    )
}

/// Bind the node data columns in [`NODE_DATA_COLUMNS`] order.
pub(crate) fn bind_node<'q>(
    query: Query<'q, Postgres, PgArguments>,
    node: &'q CmiNode,
) -> Query<'q, Postgres, PgArguments> {
    query
        .bind(node.access_count)
        .bind(&node.access_duration)
        .bind(&node.accessed)
        .bind(&node.activity_abs_duration)
        .bind(node.activity_attempt_count)
        .bind(&node.activity_exp_duration)
        .bind(node.activity_prog_status)
        .bind(&node.attempt_abs_duration)
        .bind(node.attempt_compl_amount)
        .bind(node.attempt_compl_status)
        .bind(&node.attempt_exp_duration)
        .bind(node.attempt_prog_status)
        .bind(node.audio_captioning)
        .bind(node.audio_level)
        .bind(&node.available_children)
        .bind(node.completion)
        .bind(&node.completion_status)
        .bind(&node.completion_threshold)
        .bind(&node.created)
        .bind(&node.credit)
        .bind(node.delivery_speed)
        .bind(&node.entry)
        .bind(&node.exit)
        .bind(&node.language)
        .bind(&node.launch_data)
        .bind(&node.learner_name)
        .bind(&node.location)
        .bind(node.max)
        .bind(node.min)
        .bind(&node.mode)
        .bind(&node.modified)
        .bind(node.progress_measure)
        .bind(node.raw)
        .bind(node.scaled)
        .bind(node.scaled_passing_score)
        .bind(&node.session_time)
        .bind(&node.success_status)
        .bind(&node.suspend_data)
        .bind(&node.total_time)
}

pub(crate) fn row_to_attempt(row: &PgRow) -> Result<AttemptSummary, StorageError> {
    Ok(AttemptSummary {
        package_id: row.try_get("obj_id")?,
        user_id: row.try_get("user_id")?,
        hash: row.try_get("hash")?,
        hash_end: row.try_get("hash_end")?,
        total_time_sec: row.try_get("total_time_sec")?,
        sco_total_time_sec: row.try_get("sco_total_time_sec")?,
        last_visited: row.try_get("last_visited")?,
        last_access: row.try_get("last_access")?,
        status: row.try_get("status")?,
        percentage_completed: row.try_get("percentage_completed")?,
    })
}

pub(crate) fn row_to_package(row: &PgRow) -> Result<PackageSettings, StorageError> {
    let mode: String = row.try_get("default_lesson_mode")?;
    let default_lesson_mode = mode.parse::<LessonMode>().unwrap_or_else(|_| {
        tracing::warn!(invalid_mode = %mode, "corrupt lesson mode in DB, defaulting to normal");
        LessonMode::Normal
    });
    Ok(PackageSettings {
        package_id: row.try_get("obj_id")?,
        default_lesson_mode,
        comments: row.try_get("comments")?,
        interactions: row.try_get("interactions")?,
        objectives: row.try_get("objectives")?,
        time_from_lms: row.try_get("time_from_lms")?,
        global_to_system: row.try_get("global_to_system")?,
        sco_count: row.try_get("sco_count")?,
    })
}

pub(crate) fn row_to_node(row: &PgRow) -> Result<StoredNode, StorageError> {
    let timestamp: Option<DateTime<Utc>> = row.try_get("c_timestamp")?;
    let node = CmiNode {
        access_count: row.try_get("accesscount")?,
        access_duration: row.try_get("accessduration")?,
        accessed: row.try_get("accessed")?,
        activity_abs_duration: row.try_get("activityabsduration")?,
        activity_attempt_count: row.try_get("activityattemptcount")?,
        activity_exp_duration: row.try_get("activityexpduration")?,
        activity_prog_status: row.try_get("activityprogstatus")?,
        attempt_abs_duration: row.try_get("attemptabsduration")?,
        attempt_compl_amount: row.try_get("attemptcomplamount")?,
        attempt_compl_status: row.try_get("attemptcomplstatus")?,
        attempt_exp_duration: row.try_get("attemptexpduration")?,
        attempt_prog_status: row.try_get("attemptprogstatus")?,
        audio_captioning: row.try_get("audio_captioning")?,
        audio_level: row.try_get("audio_level")?,
        available_children: row.try_get("availablechildren")?,
        completion: row.try_get("completion")?,
        completion_status: row.try_get("completion_status")?,
        completion_threshold: row.try_get("completion_threshold")?,
        cp_node_id: row.try_get("cp_node_id")?,
        created: row.try_get("created")?,
        credit: row.try_get("credit")?,
        delivery_speed: row.try_get("delivery_speed")?,
        entry: row.try_get("c_entry")?,
        exit: row.try_get("c_exit")?,
        language: row.try_get("c_language")?,
        launch_data: row.try_get("launch_data")?,
        learner_name: row.try_get("learner_name")?,
        location: row.try_get("location")?,
        max: row.try_get("c_max")?,
        min: row.try_get("c_min")?,
        mode: row.try_get("c_mode")?,
        modified: row.try_get("modified")?,
        progress_measure: row.try_get("progress_measure")?,
        raw: row.try_get("c_raw")?,
        scaled: row.try_get("scaled")?,
        scaled_passing_score: row.try_get("scaled_passing_score")?,
        session_time: row.try_get("session_time")?,
        success_status: row.try_get("success_status")?,
        suspend_data: row.try_get("suspend_data")?,
        total_time: row.try_get("total_time")?,
    };
    Ok(StoredNode {
        cmi_node_id: row.try_get("cmi_node_id")?,
        user_id: row.try_get("user_id")?,
        additional_tables: row.try_get("additional_tables")?,
        timestamp,
        node,
    })
}

pub(crate) fn row_to_comment(row: &PgRow) -> Result<StoredComment, StorageError> {
    Ok(StoredComment {
        cmi_comment_id: row.try_get("cmi_comment_id")?,
        cmi_node_id: row.try_get("cmi_node_id")?,
        comment: CmiComment {
            comment: row.try_get("c_comment")?,
            timestamp: row.try_get("c_timestamp")?,
            location: row.try_get("location")?,
            source_is_lms: row.try_get("sourceislms")?,
        },
    })
}

pub(crate) fn row_to_interaction(row: &PgRow) -> Result<StoredInteraction, StorageError> {
    Ok(StoredInteraction {
        cmi_interaction_id: row.try_get("cmi_interaction_id")?,
        cmi_node_id: row.try_get("cmi_node_id")?,
        interaction: CmiInteraction {
            local_id: None,
            description: row.try_get("description")?,
            id: row.try_get("id")?,
            latency: row.try_get("latency")?,
            learner_response: row.try_get("learner_response")?,
            result: row.try_get("result")?,
            timestamp: row.try_get("c_timestamp")?,
            interaction_type: row.try_get("c_type")?,
            weighting: row.try_get("weighting")?,
        },
    })
}

pub(crate) fn row_to_objective(row: &PgRow) -> Result<StoredObjective, StorageError> {
    Ok(StoredObjective {
        cmi_objective_id: row.try_get("cmi_objective_id")?,
        cmi_node_id: row.try_get("cmi_node_id")?,
        cmi_interaction_id: row.try_get("cmi_interaction_id")?,
        objective: CmiObjective {
            interaction_ref: None,
            completion_status: row.try_get("completion_status")?,
            description: row.try_get("description")?,
            id: row.try_get("id")?,
            max: row.try_get("c_max")?,
            min: row.try_get("c_min")?,
            raw: row.try_get("c_raw")?,
            scaled: row.try_get("scaled")?,
            progress_measure: row.try_get("progress_measure")?,
            success_status: row.try_get("success_status")?,
            scope: row.try_get("scope")?,
        },
    })
}

pub(crate) fn row_to_correct_response(row: &PgRow) -> Result<StoredCorrectResponse, StorageError> {
    Ok(StoredCorrectResponse {
        cmi_correct_resp_id: row.try_get("cmi_correct_resp_id")?,
        cmi_interaction_id: row.try_get("cmi_interaction_id")?,
        response: CmiCorrectResponse { interaction_ref: None, pattern: row.try_get("pattern")? },
    })
}

pub(crate) fn row_to_global_objective(row: &PgRow) -> Result<GlobalObjective, StorageError> {
    Ok(GlobalObjective {
        objective_id: row.try_get("objective_id")?,
        user_id: row.try_get("user_id")?,
        scope_id: row.try_get("scope_id")?,
        status: row.try_get("status")?,
        values: GlobalObjectiveValues {
            satisfied: row.try_get("satisfied")?,
            measure: row.try_get("measure")?,
            score_raw: row.try_get("score_raw")?,
            score_min: row.try_get("score_min")?,
            score_max: row.try_get("score_max")?,
            completion_status: row.try_get("completion_status")?,
            progress_measure: row.try_get("progress_measure")?,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_columns_cover_every_data_field() {
        assert_eq!(NODE_DATA_COLUMNS.len(), 39);
        assert!(!NODE_DATA_COLUMNS.contains(&"cp_node_id"));
        assert!(node_columns().starts_with("accesscount, accessduration"));
    }

    #[test]
    fn child_columns_follow_the_wire_layout() {
        assert_eq!(
            COMMENT_COLUMNS.as_str(),
            "cmi_comment_id, cmi_node_id, c_comment, c_timestamp, location, sourceislms"
        );
        assert!(INTERACTION_COLUMNS.ends_with("c_timestamp, c_type, weighting"));
        assert!(
            OBJECTIVE_COLUMNS
                .starts_with("cmi_objective_id, cmi_node_id, cmi_interaction_id, completion_status")
        );
    }

    #[test]
    fn insert_binds_keys_then_layout() {
        let sql = insert_sql(
            "cmi_correct_response",
            &["cmi_interaction_id"],
            layout::correct_response::LAYOUT,
            "cmi_correct_resp_id",
        );
        assert_eq!(
            sql,
            "INSERT INTO cmi_correct_response (cmi_interaction_id, pattern) VALUES ($1, $2) \
             RETURNING cmi_correct_resp_id"
        );
    }
}
