use std::sync::Arc;

use chrono::{DateTime, Utc};
use scorm_sync_core::session_deadline;
use scorm_sync_storage::traits::AttemptStore;
use scorm_sync_storage::StorageBackend;
use serde::Serialize;
use uuid::Uuid;

use crate::error::ServiceError;

/// Token handed to the player when a session opens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SessionToken {
    pub hash: i64,
    pub hash_end: DateTime<Utc>,
}

/// Authorizes tracking writes against the session token stored on the
/// attempt summary. Holds no state of its own.
#[derive(Clone, Debug)]
pub struct SessionGuard {
    storage: Arc<StorageBackend>,
    window_minutes: i64,
}

impl SessionGuard {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>, window_minutes: i64) -> Self {
        Self { storage, window_minutes }
    }

    #[must_use]
    pub const fn window_minutes(&self) -> i64 {
        self.window_minutes
    }

    /// End of a window renewed at `now`.
    #[must_use]
    pub fn deadline(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        session_deadline(now, self.window_minutes)
    }

    /// Succeeds only for a live session whose hash equals `presented_hash`.
    pub async fn authorize(
        &self,
        package_id: i64,
        user_id: i64,
        presented_hash: Option<i64>,
    ) -> Result<(), ServiceError> {
        let Some(presented) = presented_hash else {
            tracing::debug!(package_id, user_id, "no session hash presented");
            return Err(ServiceError::Unauthorized);
        };
        let stored = self.storage.live_session_hash(package_id, user_id, Utc::now()).await?;
        if stored == Some(presented) {
            return Ok(());
        }
        tracing::debug!(package_id, user_id, live = stored.is_some(), "session hash rejected");
        Err(ServiceError::Unauthorized)
    }

    /// The trusted user id if there is one, otherwise the claimed id after
    /// checking its session.
    pub async fn resolve_user(
        &self,
        package_id: i64,
        trusted_user: Option<i64>,
        claimed_user: Option<i64>,
        presented_hash: Option<i64>,
    ) -> Result<i64, ServiceError> {
        if let Some(user_id) = trusted_user {
            return Ok(user_id);
        }
        let Some(user_id) = claimed_user else {
            tracing::debug!(package_id, "no user claimed");
            return Err(ServiceError::Unauthorized);
        };
        self.authorize(package_id, user_id, presented_hash).await?;
        Ok(user_id)
    }

    /// Issue a fresh token for the player, creating the attempt summary if
    /// needed.
    pub async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<SessionToken, ServiceError> {
        let hash = new_session_hash();
        let hash_end = self.deadline(Utc::now());
        self.storage.open_session(package_id, user_id, hash, hash_end).await?;
        tracing::info!(package_id, user_id, "session opened");
        Ok(SessionToken { hash, hash_end })
    }
}

/// Random positive 63-bit hash.
fn new_session_hash() -> i64 {
    let (high, _) = Uuid::new_v4().as_u64_pair();
    i64::try_from(high >> 1).unwrap_or(i64::MAX)
}
