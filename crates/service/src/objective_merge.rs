use std::collections::BTreeSet;
use std::sync::Arc;

use scorm_sync_core::{MergePlan, OverallStatus, PackageSettings};
use scorm_sync_storage::traits::TrackingStore;
use scorm_sync_storage::StorageBackend;
use serde_json::Value;

use crate::error::ServiceError;

/// Folds the player's local objective rollups into the global objective
/// store.
#[derive(Clone, Debug)]
pub struct ObjectiveMerger {
    storage: Arc<StorageBackend>,
}

impl ObjectiveMerger {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Merge `seq_utilities` for `user_id` and return the overall status
    /// triple that was written (all `None` when the payload carried none).
    ///
    /// Rows are keyed by the package's objective scope. Existing rows are
    /// updated in place, the rest inserted, all within one transaction.
    pub async fn merge(
        &self,
        user_id: i64,
        package: &PackageSettings,
        seq_utilities: &Value,
    ) -> Result<OverallStatus, ServiceError> {
        let plan = MergePlan::from_seq_utilities(seq_utilities, user_id, package.package_id);
        if plan.is_empty() {
            return Ok(OverallStatus::default());
        }
        let scope_id = package.objective_scope();
        let mut tx = self.storage.begin().await?;

        if let Some(status) = &plan.status {
            tx.upsert_overall_status(user_id, scope_id, status).await?;
        }

        let ids = plan.objective_ids();
        let existing: BTreeSet<String> = if ids.is_empty() {
            BTreeSet::new()
        } else {
            tx.existing_global_objectives(user_id, scope_id, &ids).await?.into_iter().collect()
        };

        let mut inserted = 0_usize;
        for (objective_id, values) in &plan.objectives {
            if existing.contains(objective_id) {
                tx.update_global_objective(objective_id, user_id, scope_id, values).await?;
            } else {
                tx.insert_global_objective(objective_id, user_id, scope_id, values).await?;
                inserted += 1;
            }
        }

        tx.commit().await?;
        tracing::debug!(
            user_id,
            scope_id,
            updated = existing.len(),
            inserted,
            "global objectives merged"
        );
        Ok(plan.overall())
    }
}
