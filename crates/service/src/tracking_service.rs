use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use scorm_sync_core::cmi::{CmiPayload, NodeSnapshot, WantFlags};
use scorm_sync_core::{AttemptSummary, PackageSettings, decode_object};
use scorm_sync_platform::OutcomeReporter;
use scorm_sync_storage::traits::{AttemptStore, PackageStore, TrackingStore};
use scorm_sync_storage::StorageBackend;
use serde::Serialize;

use crate::collaborators::Collaborators;
use crate::error::ServiceError;
use crate::node_sync::NodeSynchronizer;
use crate::objective_merge::ObjectiveMerger;
use crate::session_guard::{SessionGuard, SessionToken};
use crate::status_sync::StatusSynchronizer;
use crate::unload_handler::UnloadHandler;

/// Reply to a CMI commit: `{"<cp_node_id>": cmi_node_id, ..., "new_global_status": s}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CmiSyncResult {
    #[serde(flatten)]
    pub nodes: BTreeMap<String, i64>,
    pub new_global_status: Option<i32>,
}

/// Entry point of the tracking pipeline.
#[derive(Clone)]
pub struct TrackingService {
    storage: Arc<StorageBackend>,
    guard: SessionGuard,
    nodes: NodeSynchronizer,
    merger: ObjectiveMerger,
    status: StatusSynchronizer,
    unload: UnloadHandler,
    outcomes: Arc<dyn OutcomeReporter>,
}

impl TrackingService {
    #[must_use]
    pub fn new(
        storage: Arc<StorageBackend>,
        collaborators: Collaborators,
        session_window_minutes: i64,
    ) -> Self {
        let guard = SessionGuard::new(Arc::clone(&storage), session_window_minutes);
        Self {
            nodes: NodeSynchronizer::new(Arc::clone(&storage)),
            merger: ObjectiveMerger::new(Arc::clone(&storage)),
            status: StatusSynchronizer::new(
                Arc::clone(&storage),
                collaborators.progress,
                Arc::clone(&collaborators.events),
            ),
            unload: UnloadHandler::new(Arc::clone(&storage), guard.clone(), collaborators.events),
            outcomes: collaborators.outcomes,
            guard,
            storage,
        }
    }

    /// Persist one CMI commit from the player.
    ///
    /// Returns `None` without writing anything when the package is only
    /// browsed or the body is not a JSON object. `user_id` is the identity
    /// established by a trusted gateway; without it the payload's `p` and
    /// `hash` must match a live session, whose window is then renewed.
    pub async fn persist_cmi_data(
        &self,
        package_id: i64,
        ref_id: i64,
        user_id: Option<i64>,
        body: &[u8],
    ) -> Result<Option<CmiSyncResult>, ServiceError> {
        let package = self.require_package(package_id).await?;
        if !package.default_lesson_mode.is_tracked() {
            tracing::debug!(package_id, "browse mode, nothing tracked");
            return Ok(None);
        }
        let Some(payload) = decode_object::<CmiPayload>(body) else {
            tracing::debug!(package_id, "ignoring malformed cmi payload");
            return Ok(None);
        };
        let renew_until = user_id.is_none().then(|| self.guard.deadline(Utc::now()));
        let user_id = self
            .guard
            .resolve_user(package_id, user_id, payload.claimed_user(), payload.presented_hash())
            .await?;

        let want = WantFlags {
            comments: package.comments,
            interactions: package.interactions,
            objectives: package.objectives,
        };
        let nodes = self.nodes.sync(user_id, &payload, want).await?;

        if payload.seq_utilities_changed() {
            let overall = self.merger.merge(user_id, &package, &payload.adl_seq_utilities).await?;
            tracing::debug!(package_id, user_id, ?overall, "overall status merged");
        }

        let new_global_status = payload.new_global_status();

        if let (Some(scaled), 1) = (payload.scaled_score(), package.sco_count) {
            self.outcomes.report_outcome(package_id, user_id, scaled * 100.0).await?;
        }

        self.status
            .sync(package_id, user_id, ref_id, &payload, package.time_from_lms, renew_until)
            .await?;

        tracing::info!(package_id, user_id, nodes = nodes.len(), "cmi data persisted");
        Ok(Some(CmiSyncResult { nodes, new_global_status }))
    }

    pub async fn record_unload(
        &self,
        package_id: i64,
        ref_id: i64,
        user_id: Option<i64>,
        body: &[u8],
    ) -> Result<(), ServiceError> {
        let package = self.require_package(package_id).await?;
        self.unload.on_unload(package_id, ref_id, package.time_from_lms, user_id, body).await
    }

    pub async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<SessionToken, ServiceError> {
        self.require_package(package_id).await?;
        self.guard.open_session(package_id, user_id).await
    }

    pub async fn get_attempt(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<Option<AttemptSummary>, ServiceError> {
        Ok(self.storage.get_attempt(package_id, user_id).await?)
    }

    pub async fn save_package(&self, settings: &PackageSettings) -> Result<(), ServiceError> {
        self.storage.save_package(settings).await?;
        tracing::info!(package_id = settings.package_id, "package settings saved");
        Ok(())
    }

    pub async fn get_package(
        &self,
        package_id: i64,
    ) -> Result<Option<PackageSettings>, ServiceError> {
        Ok(self.storage.get_package(package_id).await?)
    }

    /// A stored node with every child row.
    pub async fn node_snapshot(
        &self,
        cp_node_id: i64,
        user_id: i64,
    ) -> Result<Option<NodeSnapshot>, ServiceError> {
        let Some(node) = self.storage.get_node(cp_node_id, user_id).await? else {
            return Ok(None);
        };
        let id = node.cmi_node_id;
        Ok(Some(NodeSnapshot {
            comments: self.storage.list_comments(id).await?,
            interactions: self.storage.list_interactions(id).await?,
            objectives: self.storage.list_objectives(id).await?,
            correct_responses: self.storage.list_correct_responses(id).await?,
            node,
        }))
    }

    async fn require_package(&self, package_id: i64) -> Result<PackageSettings, ServiceError> {
        self.storage.get_package(package_id).await?.ok_or_else(|| ServiceError::NotFound {
            entity: "package",
            id: package_id.to_string(),
        })
    }
}
