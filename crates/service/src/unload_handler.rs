use std::sync::Arc;

use chrono::Utc;
use scorm_sync_core::{READ_EVENT_TYPE, UnloadBeacon, decode_object};
use scorm_sync_platform::AccessEvents;
use scorm_sync_storage::traits::AttemptStore;
use scorm_sync_storage::StorageBackend;

use crate::error::ServiceError;
use crate::session_guard::SessionGuard;

/// Persists the coarse attempt fields the player posts when its page unloads.
#[derive(Clone)]
pub struct UnloadHandler {
    storage: Arc<StorageBackend>,
    guard: SessionGuard,
    events: Arc<dyn AccessEvents>,
}

impl UnloadHandler {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        guard: SessionGuard,
        events: Arc<dyn AccessEvents>,
    ) -> Self {
        Self { storage, guard, events }
    }

    /// Empty or malformed bodies are ignored. A non-numeric elapsed time
    /// keeps the stored total but still counts as an access.
    pub async fn on_unload(
        &self,
        package_id: i64,
        ref_id: i64,
        time_from_lms: bool,
        user_id: Option<i64>,
        body: &[u8],
    ) -> Result<(), ServiceError> {
        let Some(beacon) = decode_object::<UnloadBeacon>(body) else {
            return Ok(());
        };
        let user_id = self
            .guard
            .resolve_user(package_id, user_id, beacon.claimed_user(), beacon.presented_hash())
            .await?;

        let update = beacon.to_update(Utc::now(), self.guard.window_minutes());
        let found = self.storage.record_unload(package_id, user_id, &update).await?;
        if !found {
            tracing::debug!(package_id, user_id, "unload for missing attempt summary");
        }

        if beacon.reports_elapsed_time() && time_from_lms {
            self.events
                .sync_read_event(package_id, user_id, READ_EVENT_TYPE, ref_id, time_from_lms)
                .await?;
        }
        Ok(())
    }
}
