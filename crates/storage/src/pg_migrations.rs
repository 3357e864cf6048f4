//! PostgreSQL schema for scorm-sync storage.
//!
//! Column names follow the host platform's tracking schema; words that
//! clash with SQL keywords carry a `c_` prefix.

use sqlx::PgPool;

use crate::error::StorageError;

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS sahs_package (
        obj_id BIGINT PRIMARY KEY,
        default_lesson_mode TEXT NOT NULL DEFAULT 'normal',
        comments BOOLEAN NOT NULL DEFAULT TRUE,
        interactions BOOLEAN NOT NULL DEFAULT TRUE,
        objectives BOOLEAN NOT NULL DEFAULT TRUE,
        time_from_lms BOOLEAN NOT NULL DEFAULT FALSE,
        global_to_system BOOLEAN NOT NULL DEFAULT FALSE,
        sco_count BIGINT NOT NULL DEFAULT 1
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS sahs_user (
        obj_id BIGINT NOT NULL,
        user_id BIGINT NOT NULL,
        hash BIGINT,
        hash_end TIMESTAMPTZ,
        total_time_sec BIGINT,
        sco_total_time_sec BIGINT,
        last_visited TEXT,
        last_access TIMESTAMPTZ,
        status INTEGER,
        percentage_completed INTEGER,
        PRIMARY KEY (obj_id, user_id)
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS cmi_node (
        cmi_node_id BIGSERIAL PRIMARY KEY,
        cp_node_id BIGINT NOT NULL,
        user_id BIGINT NOT NULL,
        accesscount BIGINT,
        accessduration TEXT,
        accessed TEXT,
        activityabsduration TEXT,
        activityattemptcount BIGINT,
        activityexpduration TEXT,
        activityprogstatus BIGINT,
        attemptabsduration TEXT,
        attemptcomplamount DOUBLE PRECISION,
        attemptcomplstatus BIGINT,
        attemptexpduration TEXT,
        attemptprogstatus BIGINT,
        audio_captioning BIGINT,
        audio_level DOUBLE PRECISION,
        availablechildren TEXT,
        completion DOUBLE PRECISION,
        completion_status TEXT,
        completion_threshold TEXT,
        created TEXT,
        credit TEXT,
        delivery_speed DOUBLE PRECISION,
        c_entry TEXT,
        c_exit TEXT,
        c_language TEXT,
        launch_data TEXT,
        learner_name TEXT,
        location TEXT,
        c_max DOUBLE PRECISION,
        c_min DOUBLE PRECISION,
        c_mode TEXT,
        modified TEXT,
        progress_measure DOUBLE PRECISION,
        c_raw DOUBLE PRECISION,
        scaled DOUBLE PRECISION,
        scaled_passing_score DOUBLE PRECISION,
        session_time TEXT,
        success_status TEXT,
        suspend_data TEXT,
        total_time TEXT,
        c_timestamp TIMESTAMPTZ,
        additional_tables BIGINT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_cmi_node_key ON cmi_node (cp_node_id, user_id)",
    r#"
    CREATE TABLE IF NOT EXISTS cmi_comment (
        cmi_comment_id BIGSERIAL PRIMARY KEY,
        cmi_node_id BIGINT NOT NULL,
        c_comment TEXT,
        c_timestamp TEXT,
        location TEXT,
        sourceislms BIGINT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_cmi_comment_node ON cmi_comment (cmi_node_id)",
    r#"
    CREATE TABLE IF NOT EXISTS cmi_interaction (
        cmi_interaction_id BIGSERIAL PRIMARY KEY,
        cmi_node_id BIGINT NOT NULL,
        description TEXT,
        id TEXT,
        latency TEXT,
        learner_response TEXT,
        result TEXT,
        c_timestamp TEXT,
        c_type TEXT,
        weighting DOUBLE PRECISION
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_cmi_interaction_node ON cmi_interaction (cmi_node_id)",
    r#"
    CREATE TABLE IF NOT EXISTS cmi_objective (
        cmi_objective_id BIGSERIAL PRIMARY KEY,
        cmi_node_id BIGINT NOT NULL,
        cmi_interaction_id BIGINT,
        completion_status TEXT,
        description TEXT,
        id TEXT,
        c_max DOUBLE PRECISION,
        c_min DOUBLE PRECISION,
        c_raw DOUBLE PRECISION,
        scaled DOUBLE PRECISION,
        progress_measure DOUBLE PRECISION,
        success_status TEXT,
        scope TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_cmi_objective_node ON cmi_objective (cmi_node_id)",
    r#"
    CREATE TABLE IF NOT EXISTS cmi_correct_response (
        cmi_correct_resp_id BIGSERIAL PRIMARY KEY,
        cmi_interaction_id BIGINT NOT NULL,
        pattern TEXT
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_cmi_correct_response_interaction ON cmi_correct_response (cmi_interaction_id)",
    r#"
    CREATE TABLE IF NOT EXISTS cmi_gobjective (
        objective_id TEXT NOT NULL,
        user_id BIGINT NOT NULL,
        scope_id BIGINT NOT NULL,
        status TEXT,
        satisfied TEXT,
        measure TEXT,
        score_raw TEXT,
        score_min TEXT,
        score_max TEXT,
        completion_status TEXT,
        progress_measure TEXT
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_cmi_gobjective_key ON cmi_gobjective (objective_id, user_id, scope_id)",
];

/// Create every table and index that does not exist yet.
pub async fn run_pg_migrations(pool: &PgPool) -> Result<(), StorageError> {
    for (statement, sql) in SCHEMA.iter().enumerate() {
        sqlx::query(sql)
            .execute(pool)
            .await
            .map_err(|source| StorageError::Migration { statement, source })?;
    }
    tracing::debug!(statements = SCHEMA.len(), "PostgreSQL schema up to date");
    Ok(())
}
