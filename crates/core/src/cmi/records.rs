//! Typed CMI records decoded from positional wire rows.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::layout::{comment, correct_response, interaction, node, objective, RowReader};
use crate::value::local_key;

/// Data model snapshot of one activity for one learner.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmiNode {
    pub access_count: Option<i64>,
    pub access_duration: Option<String>,
    pub accessed: Option<String>,
    pub activity_abs_duration: Option<String>,
    pub activity_attempt_count: Option<i64>,
    pub activity_exp_duration: Option<String>,
    pub activity_prog_status: Option<i64>,
    pub attempt_abs_duration: Option<String>,
    pub attempt_compl_amount: Option<f64>,
    pub attempt_compl_status: Option<i64>,
    pub attempt_exp_duration: Option<String>,
    pub attempt_prog_status: Option<i64>,
    pub audio_captioning: Option<i64>,
    pub audio_level: Option<f64>,
    pub available_children: Option<String>,
    pub completion: Option<f64>,
    pub completion_status: Option<String>,
    pub completion_threshold: Option<String>,
    /// Content package node this snapshot belongs to.
    pub cp_node_id: Option<i64>,
    pub created: Option<String>,
    pub credit: Option<String>,
    pub delivery_speed: Option<f64>,
    pub entry: Option<String>,
    pub exit: Option<String>,
    pub language: Option<String>,
    pub launch_data: Option<String>,
    pub learner_name: Option<String>,
    pub location: Option<String>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub mode: Option<String>,
    pub modified: Option<String>,
    pub progress_measure: Option<f64>,
    pub raw: Option<f64>,
    pub scaled: Option<f64>,
    pub scaled_passing_score: Option<f64>,
    pub session_time: Option<String>,
    pub success_status: Option<String>,
    pub suspend_data: Option<String>,
    pub total_time: Option<String>,
}

impl CmiNode {
    #[must_use]
    pub fn from_row(cells: &[Value]) -> Self {
        let row = RowReader::new(cells);
        Self {
            access_count: row.int(node::ACCESS_COUNT),
            access_duration: row.text(node::ACCESS_DURATION),
            accessed: row.text(node::ACCESSED),
            activity_abs_duration: row.text(node::ACTIVITY_ABS_DURATION),
            activity_attempt_count: row.int(node::ACTIVITY_ATTEMPT_COUNT),
            activity_exp_duration: row.text(node::ACTIVITY_EXP_DURATION),
            activity_prog_status: row.int(node::ACTIVITY_PROG_STATUS),
            attempt_abs_duration: row.text(node::ATTEMPT_ABS_DURATION),
            attempt_compl_amount: row.float(node::ATTEMPT_COMPL_AMOUNT),
            attempt_compl_status: row.int(node::ATTEMPT_COMPL_STATUS),
            attempt_exp_duration: row.text(node::ATTEMPT_EXP_DURATION),
            attempt_prog_status: row.int(node::ATTEMPT_PROG_STATUS),
            audio_captioning: row.int(node::AUDIO_CAPTIONING),
            audio_level: row.float(node::AUDIO_LEVEL),
            available_children: row.text(node::AVAILABLE_CHILDREN),
            completion: row.float(node::COMPLETION),
            completion_status: row.text(node::COMPLETION_STATUS),
            completion_threshold: row.text(node::COMPLETION_THRESHOLD),
            cp_node_id: row.int(node::CP_NODE_ID),
            created: row.text(node::CREATED),
            credit: row.text(node::CREDIT),
            delivery_speed: row.float(node::DELIVERY_SPEED),
            entry: row.text(node::ENTRY),
            exit: row.text(node::EXIT),
            language: row.text(node::LANGUAGE),
            launch_data: row.text(node::LAUNCH_DATA),
            learner_name: row.text(node::LEARNER_NAME),
            location: row.text(node::LOCATION),
            max: row.float(node::MAX),
            min: row.float(node::MIN),
            mode: row.text(node::MODE),
            modified: row.text(node::MODIFIED),
            progress_measure: row.float(node::PROGRESS_MEASURE),
            raw: row.float(node::RAW),
            scaled: row.float(node::SCALED),
            scaled_passing_score: row.float(node::SCALED_PASSING_SCORE),
            session_time: row.text(node::SESSION_TIME),
            success_status: row.text(node::SUCCESS_STATUS),
            suspend_data: row.text(node::SUSPEND_DATA),
            total_time: row.text(node::TOTAL_TIME),
        }
    }
}

/// Learner or LMS comment attached to a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmiComment {
    pub comment: Option<String>,
    pub timestamp: Option<String>,
    pub location: Option<String>,
    pub source_is_lms: Option<i64>,
}

impl CmiComment {
    #[must_use]
    pub fn from_row(cells: &[Value]) -> Self {
        let row = RowReader::new(cells);
        Self {
            comment: row.text(comment::COMMENT),
            timestamp: row.text(comment::TIMESTAMP),
            location: row.text(comment::LOCATION),
            source_is_lms: row.int(comment::SOURCE_IS_LMS),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmiInteraction {
    /// Id the player uses for this row within one payload.
    #[serde(skip)]
    pub local_id: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub latency: Option<String>,
    pub learner_response: Option<String>,
    pub result: Option<String>,
    pub timestamp: Option<String>,
    pub interaction_type: Option<String>,
    pub weighting: Option<f64>,
}

impl CmiInteraction {
    #[must_use]
    pub fn from_row(cells: &[Value]) -> Self {
        let row = RowReader::new(cells);
        Self {
            local_id: local_key(row.cell(interaction::LOCAL_ID)),
            description: row.text(interaction::DESCRIPTION),
            id: row.text(interaction::ID),
            latency: row.text(interaction::LATENCY),
            learner_response: row.text(interaction::LEARNER_RESPONSE),
            result: row.text(interaction::RESULT),
            timestamp: row.text(interaction::TIMESTAMP),
            interaction_type: row.text(interaction::TYPE),
            weighting: row.float(interaction::WEIGHTING),
        }
    }
}

/// Node-level objective, or an interaction objective when
/// `interaction_ref` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmiObjective {
    #[serde(skip)]
    pub interaction_ref: Option<String>,
    pub completion_status: Option<String>,
    pub description: Option<String>,
    pub id: Option<String>,
    pub max: Option<f64>,
    pub min: Option<f64>,
    pub raw: Option<f64>,
    pub scaled: Option<f64>,
    pub progress_measure: Option<f64>,
    pub success_status: Option<String>,
    pub scope: Option<String>,
}

impl CmiObjective {
    #[must_use]
    pub fn from_row(cells: &[Value]) -> Self {
        let row = RowReader::new(cells);
        Self {
            interaction_ref: local_key(row.cell(objective::INTERACTION_REF)),
            completion_status: row.text(objective::COMPLETION_STATUS),
            description: row.text(objective::DESCRIPTION),
            id: row.text(objective::ID),
            max: row.float(objective::MAX),
            min: row.float(objective::MIN),
            raw: row.float(objective::RAW),
            scaled: row.float(objective::SCALED),
            progress_measure: row.float(objective::PROGRESS_MEASURE),
            success_status: row.text(objective::SUCCESS_STATUS),
            scope: row.text(objective::SCOPE),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CmiCorrectResponse {
    #[serde(skip)]
    pub interaction_ref: Option<String>,
    pub pattern: Option<String>,
}

impl CmiCorrectResponse {
    #[must_use]
    pub fn from_row(cells: &[Value]) -> Self {
        let row = RowReader::new(cells);
        Self {
            interaction_ref: local_key(row.cell(correct_response::INTERACTION_REF)),
            pattern: row.text(correct_response::PATTERN),
        }
    }
}

/// The CMI tables, in the order they must be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CmiTable {
    Node,
    Comment,
    Interaction,
    Objective,
    CorrectResponse,
}

impl CmiTable {
    /// Node first since every other row references its id; interactions
    /// before the objectives and correct responses that reference them.
    pub const PROCESSING_ORDER: [Self; 5] =
        [Self::Node, Self::Comment, Self::Interaction, Self::Objective, Self::CorrectResponse];

    /// Key of the table in the sync payload.
    #[must_use]
    pub const fn wire_key(&self) -> &'static str {
        match *self {
            Self::Node => "node",
            Self::Comment => "comment",
            Self::Interaction => "interaction",
            Self::Objective => "objective",
            Self::CorrectResponse => "correct_response",
        }
    }
}

/// One decoded row of any CMI table.
#[derive(Debug, Clone, PartialEq)]
pub enum CmiRecord {
    Node(CmiNode),
    Comment(CmiComment),
    Interaction(CmiInteraction),
    Objective(CmiObjective),
    CorrectResponse(CmiCorrectResponse),
}

impl CmiRecord {
    #[must_use]
    pub fn decode(table: CmiTable, cells: &[Value]) -> Self {
        match table {
            CmiTable::Node => Self::Node(CmiNode::from_row(cells)),
            CmiTable::Comment => Self::Comment(CmiComment::from_row(cells)),
            CmiTable::Interaction => Self::Interaction(CmiInteraction::from_row(cells)),
            CmiTable::Objective => Self::Objective(CmiObjective::from_row(cells)),
            CmiTable::CorrectResponse => Self::CorrectResponse(CmiCorrectResponse::from_row(cells)),
        }
    }

    #[must_use]
    pub const fn table(&self) -> CmiTable {
        match *self {
            Self::Node(_) => CmiTable::Node,
            Self::Comment(_) => CmiTable::Comment,
            Self::Interaction(_) => CmiTable::Interaction,
            Self::Objective(_) => CmiTable::Objective,
            Self::CorrectResponse(_) => CmiTable::CorrectResponse,
        }
    }
}
