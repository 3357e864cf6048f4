use std::sync::Arc;

use chrono::{DateTime, Utc};
use scorm_sync_core::cmi::CmiPayload;
use scorm_sync_core::{READ_EVENT_TYPE, StatusUpdate};
use scorm_sync_platform::{AccessEvents, LearningProgress};
use scorm_sync_storage::traits::AttemptStore;
use scorm_sync_storage::StorageBackend;

use crate::error::ServiceError;

/// Writes the attempt's status summary and forwards it to the platform.
#[derive(Clone)]
pub struct StatusSynchronizer {
    storage: Arc<StorageBackend>,
    progress: Arc<dyn LearningProgress>,
    events: Arc<dyn AccessEvents>,
}

impl StatusSynchronizer {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        progress: Arc<dyn LearningProgress>,
        events: Arc<dyn AccessEvents>,
    ) -> Self {
        Self { storage, progress, events }
    }

    /// Learning progress is only written when the player computed a status;
    /// the access event only when the content measures its own time.
    /// `renew_until` slides the session window of a hash-authorized write.
    pub async fn sync(
        &self,
        package_id: i64,
        user_id: i64,
        ref_id: i64,
        payload: &CmiPayload,
        time_from_lms: bool,
        renew_until: Option<DateTime<Utc>>,
    ) -> Result<(), ServiceError> {
        let new_status = payload.new_global_status();
        tracing::debug!(
            package_id,
            user_id,
            saved = ?payload.saved_global_status(),
            now = ?new_status,
            "global status"
        );
        let update = StatusUpdate {
            sco_total_time_sec: payload.total_time_seconds(),
            status: new_status,
            percentage_completed: payload.percentage_completed(),
            hash_end: renew_until,
        };
        if !self.storage.write_status(package_id, user_id, &update).await? {
            tracing::debug!(package_id, user_id, "status for missing attempt summary");
        }

        if let Some(status) = new_status {
            self.progress
                .write_status(package_id, user_id, status, update.percentage_completed)
                .await?;
        }

        if !time_from_lms {
            self.events
                .sync_read_event(package_id, user_id, READ_EVENT_TYPE, ref_id, time_from_lms)
                .await?;
        }
        Ok(())
    }
}
