//! Persisted CMI rows as read back from storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::records::{CmiComment, CmiCorrectResponse, CmiInteraction, CmiNode, CmiObjective};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredNode {
    pub cmi_node_id: i64,
    pub user_id: i64,
    /// The `i_check` value of the commit that last wrote this node.
    pub additional_tables: Option<i64>,
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub node: CmiNode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredComment {
    pub cmi_comment_id: i64,
    pub cmi_node_id: i64,
    #[serde(flatten)]
    pub comment: CmiComment,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredInteraction {
    pub cmi_interaction_id: i64,
    pub cmi_node_id: i64,
    #[serde(flatten)]
    pub interaction: CmiInteraction,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredObjective {
    pub cmi_objective_id: i64,
    pub cmi_node_id: i64,
    /// `None` for node-level objectives.
    pub cmi_interaction_id: Option<i64>,
    #[serde(flatten)]
    pub objective: CmiObjective,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredCorrectResponse {
    pub cmi_correct_resp_id: i64,
    pub cmi_interaction_id: i64,
    #[serde(flatten)]
    pub response: CmiCorrectResponse,
}

/// A node together with all of its child rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSnapshot {
    #[serde(flatten)]
    pub node: StoredNode,
    pub comments: Vec<StoredComment>,
    pub interactions: Vec<StoredInteraction>,
    pub objectives: Vec<StoredObjective>,
    pub correct_responses: Vec<StoredCorrectResponse>,
}
