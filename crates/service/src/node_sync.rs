use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use chrono::Utc;
use scorm_sync_core::cmi::{CmiPayload, CmiRecord, PurgePlan, WantFlags};
use scorm_sync_storage::traits::{TrackingStore, TrackingTx};
use scorm_sync_storage::StorageBackend;

use crate::error::ServiceError;

/// Content node id (as sent by the player) → surrogate node id.
pub type NodeIdMap = BTreeMap<String, i64>;

/// Writes a commit's node and child rows in one transaction.
#[derive(Clone, Debug)]
pub struct NodeSynchronizer {
    storage: Arc<StorageBackend>,
}

impl NodeSynchronizer {
    #[must_use]
    pub const fn new(storage: Arc<StorageBackend>) -> Self {
        Self { storage }
    }

    /// Child rows attach to the last node written in the same payload and
    /// are dropped when there is none.
    pub async fn sync(
        &self,
        user_id: i64,
        payload: &CmiPayload,
        want: WantFlags,
    ) -> Result<NodeIdMap, ServiceError> {
        let mut tx = self.storage.begin().await?;
        let mut batch = Batch::default();

        for record in payload.records() {
            batch.apply(tx.as_mut(), user_id, payload, want, &record).await?;
        }

        tx.commit().await?;
        Ok(batch.result)
    }
}

#[derive(Default)]
struct Batch {
    result: NodeIdMap,
    node: Option<i64>,
    /// Payload-local interaction id → stored interaction id.
    interactions: HashMap<String, i64>,
}

impl Batch {
    async fn apply(
        &mut self,
        tx: &mut dyn TrackingTx,
        user_id: i64,
        payload: &CmiPayload,
        want: WantFlags,
        record: &CmiRecord,
    ) -> Result<(), ServiceError> {
        if let CmiRecord::Node(node) = record {
            let Some(cp_node_id) = node.cp_node_id else {
                tracing::debug!(user_id, "skipping node row without content node id");
                return Ok(());
            };
            let upsert =
                tx.upsert_node(user_id, node, payload.instruction_check(), Utc::now()).await?;
            tracing::debug!(
                cp_node_id,
                cmi_node_id = upsert.cmi_node_id,
                updated = upsert.updated,
                "node synced"
            );
            if upsert.updated {
                let plan = PurgePlan::new(payload.instruction_mask(), want);
                purge(tx, upsert.cmi_node_id, plan).await?;
            }
            self.result.insert(cp_node_id.to_string(), upsert.cmi_node_id);
            self.node = Some(upsert.cmi_node_id);
            return Ok(());
        }

        let Some(cmi_node_id) = self.node else {
            tracing::debug!(table = record.table().wire_key(), "skipping row without node");
            return Ok(());
        };

        match record {
            CmiRecord::Comment(comment) => {
                tx.insert_comment(cmi_node_id, comment).await?;
            },
            CmiRecord::Interaction(interaction) => {
                let id = tx.insert_interaction(cmi_node_id, interaction).await?;
                if let Some(local_id) = &interaction.local_id {
                    self.interactions.insert(local_id.clone(), id);
                }
            },
            CmiRecord::Objective(objective) => {
                let interaction = objective
                    .interaction_ref
                    .as_ref()
                    .and_then(|local| self.interactions.get(local).copied());
                tx.insert_objective(cmi_node_id, interaction, objective).await?;
            },
            CmiRecord::CorrectResponse(response) => {
                let interaction = response
                    .interaction_ref
                    .as_ref()
                    .and_then(|local| self.interactions.get(local).copied());
                match interaction {
                    Some(id) => {
                        tx.insert_correct_response(id, response).await?;
                    },
                    None => tracing::debug!(
                        interaction_ref = ?response.interaction_ref,
                        "skipping correct response without interaction"
                    ),
                }
            },
            CmiRecord::Node(_) => {},
        }
        Ok(())
    }
}

/// Comments, correct responses, interactions, objectives, in that order.
async fn purge(
    tx: &mut dyn TrackingTx,
    cmi_node_id: i64,
    plan: PurgePlan,
) -> Result<(), ServiceError> {
    if plan.comments {
        let n = tx.purge_comments(cmi_node_id).await?;
        tracing::debug!(cmi_node_id, deleted = n, "purged comments");
    }
    if plan.correct_responses {
        let n = tx.purge_correct_responses(cmi_node_id).await?;
        tracing::debug!(cmi_node_id, deleted = n, "purged correct responses");
    }
    if plan.interactions {
        let n = tx.purge_interactions(cmi_node_id).await?;
        tracing::debug!(cmi_node_id, deleted = n, "purged interactions");
    }
    if plan.objectives {
        let n = tx.purge_objectives(cmi_node_id).await?;
        tracing::debug!(cmi_node_id, deleted = n, "purged objectives");
    }
    Ok(())
}
