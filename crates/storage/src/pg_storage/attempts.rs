//! AttemptStore implementation for PgStorage.

use super::*;

use crate::traits::AttemptStore;
use async_trait::async_trait;
use scorm_sync_core::{StatusUpdate, UnloadUpdate};

#[async_trait]
impl AttemptStore for PgStorage {
    async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
        hash: i64,
        hash_end: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        sqlx::query(
            "INSERT INTO sahs_user (obj_id, user_id, hash, hash_end)
             VALUES ($1, $2, $3, $4)
             ON CONFLICT (obj_id, user_id) DO UPDATE SET
               hash = EXCLUDED.hash,
               hash_end = EXCLUDED.hash_end",
        )
        .bind(package_id)
        .bind(user_id)
        .bind(hash)
        .bind(hash_end)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn live_session_hash(
        &self,
        package_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, StorageError> {
        let hash: Option<Option<i64>> = sqlx::query_scalar(
            "SELECT hash FROM sahs_user WHERE obj_id = $1 AND user_id = $2 AND hash_end > $3",
        )
        .bind(package_id)
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;
        Ok(hash.flatten())
    }

    async fn get_attempt(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<Option<AttemptSummary>, StorageError> {
        let row = sqlx::query(&format!(
            "SELECT {ATTEMPT_COLUMNS} FROM sahs_user WHERE obj_id = $1 AND user_id = $2"
        ))
        .bind(package_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|r| row_to_attempt(&r)).transpose()
    }

    async fn record_unload(
        &self,
        package_id: i64,
        user_id: i64,
        update: &UnloadUpdate,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE sahs_user SET
               total_time_sec = COALESCE($1, total_time_sec),
               last_visited = $2,
               hash_end = $3,
               last_access = $4
             WHERE obj_id = $5 AND user_id = $6",
        )
        .bind(update.total_time_sec)
        .bind(&update.last_visited)
        .bind(update.hash_end)
        .bind(update.last_access)
        .bind(package_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        update: &StatusUpdate,
    ) -> Result<bool, StorageError> {
        let result = sqlx::query(
            "UPDATE sahs_user SET sco_total_time_sec = $1, status = $2, percentage_completed = $3,
               hash_end = COALESCE($4, hash_end)
             WHERE obj_id = $5 AND user_id = $6",
        )
        .bind(update.sco_total_time_sec)
        .bind(update.status)
        .bind(update.percentage_completed)
        .bind(update.hash_end)
        .bind(package_id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }
}
