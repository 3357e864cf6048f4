use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorm_sync_core::{AttemptSummary, StatusUpdate, UnloadUpdate};

use crate::error::StorageError;

/// Per-(package, user) attempt summary and its session token.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    /// Create the summary row if needed and replace its session token.
    async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
        hash: i64,
        hash_end: DateTime<Utc>,
    ) -> Result<(), StorageError>;

    /// Stored hash of a session whose window is still open at `now`.
    async fn live_session_hash(
        &self,
        package_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, StorageError>;

    async fn get_attempt(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<Option<AttemptSummary>, StorageError>;

    /// Apply an unload beacon in one statement. Returns `false` when no
    /// summary row exists.
    async fn record_unload(
        &self,
        package_id: i64,
        user_id: i64,
        update: &UnloadUpdate,
    ) -> Result<bool, StorageError>;

    /// Write the computed status summary in one statement. Returns `false`
    /// when no summary row exists.
    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        update: &StatusUpdate,
    ) -> Result<bool, StorageError>;
}
