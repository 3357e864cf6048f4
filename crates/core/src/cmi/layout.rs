//! Positional wire layout of the CMI tables.
//!
//! The player sends every table as an array of rows, each row an array of
//! cells addressed by position. These tables are the single description of
//! that contract: which position holds which column, and how the cell is
//! coerced before it reaches storage.

use serde_json::Value;

use crate::value::{float_value, int_value, text_value};

/// Storage type a cell is coerced to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Integer,
    Float,
    Text,
    /// Unbounded text (suspend data, launch data, descriptions, responses).
    LargeText,
    /// Payload-local key resolved during sync. Not a stored column.
    LocalRef,
}

/// One position of a wire row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldSpec {
    pub position: usize,
    pub column: &'static str,
    pub column_type: ColumnType,
}

impl FieldSpec {
    #[must_use]
    pub const fn new(position: usize, column: &'static str, column_type: ColumnType) -> Self {
        Self { position, column, column_type }
    }

    #[must_use]
    pub const fn is_stored(&self) -> bool {
        !matches!(self.column_type, ColumnType::LocalRef)
    }
}

/// Stored column names of `layout`, in wire order.
#[must_use]
pub fn stored_columns(layout: &[FieldSpec]) -> Vec<&'static str> {
    layout.iter().filter(|f| f.is_stored()).map(|f| f.column).collect()
}

/// Read access to one wire row through [`FieldSpec`]s.
///
/// Positions past the end of the row read as null.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    cells: &'a [Value],
}

impl<'a> RowReader<'a> {
    #[must_use]
    pub const fn new(cells: &'a [Value]) -> Self {
        Self { cells }
    }

    #[must_use]
    pub fn cell(&self, spec: FieldSpec) -> &'a Value {
        self.cells.get(spec.position).unwrap_or(&Value::Null)
    }

    #[must_use]
    pub fn int(&self, spec: FieldSpec) -> Option<i64> {
        debug_assert_eq!(spec.column_type, ColumnType::Integer, "{}", spec.column);
        int_value(self.cell(spec))
    }

    #[must_use]
    pub fn float(&self, spec: FieldSpec) -> Option<f64> {
        debug_assert_eq!(spec.column_type, ColumnType::Float, "{}", spec.column);
        float_value(self.cell(spec))
    }

    #[must_use]
    pub fn text(&self, spec: FieldSpec) -> Option<String> {
        debug_assert!(
            matches!(spec.column_type, ColumnType::Text | ColumnType::LargeText),
            "{}",
            spec.column
        );
        text_value(self.cell(spec))
    }
}

/// `cmi_node` rows: the full data model snapshot of one activity.
pub mod node {
    use super::ColumnType::{Float, Integer, LargeText, Text};
    use super::FieldSpec;

    pub const ACCESS_COUNT: FieldSpec = FieldSpec::new(0, "accesscount", Integer);
    pub const ACCESS_DURATION: FieldSpec = FieldSpec::new(1, "accessduration", Text);
    pub const ACCESSED: FieldSpec = FieldSpec::new(2, "accessed", Text);
    pub const ACTIVITY_ABS_DURATION: FieldSpec = FieldSpec::new(3, "activityabsduration", Text);
    pub const ACTIVITY_ATTEMPT_COUNT: FieldSpec =
        FieldSpec::new(4, "activityattemptcount", Integer);
    pub const ACTIVITY_EXP_DURATION: FieldSpec = FieldSpec::new(5, "activityexpduration", Text);
    pub const ACTIVITY_PROG_STATUS: FieldSpec = FieldSpec::new(6, "activityprogstatus", Integer);
    pub const ATTEMPT_ABS_DURATION: FieldSpec = FieldSpec::new(7, "attemptabsduration", Text);
    pub const ATTEMPT_COMPL_AMOUNT: FieldSpec = FieldSpec::new(8, "attemptcomplamount", Float);
    pub const ATTEMPT_COMPL_STATUS: FieldSpec = FieldSpec::new(9, "attemptcomplstatus", Integer);
    pub const ATTEMPT_EXP_DURATION: FieldSpec = FieldSpec::new(10, "attemptexpduration", Text);
    pub const ATTEMPT_PROG_STATUS: FieldSpec = FieldSpec::new(11, "attemptprogstatus", Integer);
    pub const AUDIO_CAPTIONING: FieldSpec = FieldSpec::new(12, "audio_captioning", Integer);
    pub const AUDIO_LEVEL: FieldSpec = FieldSpec::new(13, "audio_level", Float);
    pub const AVAILABLE_CHILDREN: FieldSpec = FieldSpec::new(14, "availablechildren", Text);
    /// Assigned by the server; whatever the player sends here is ignored.
    pub const CMI_NODE_ID: FieldSpec = FieldSpec::new(15, "cmi_node_id", Integer);
    pub const COMPLETION: FieldSpec = FieldSpec::new(16, "completion", Float);
    pub const COMPLETION_STATUS: FieldSpec = FieldSpec::new(17, "completion_status", Text);
    pub const COMPLETION_THRESHOLD: FieldSpec = FieldSpec::new(18, "completion_threshold", Text);
    pub const CP_NODE_ID: FieldSpec = FieldSpec::new(19, "cp_node_id", Integer);
    pub const CREATED: FieldSpec = FieldSpec::new(20, "created", Text);
    pub const CREDIT: FieldSpec = FieldSpec::new(21, "credit", Text);
    pub const DELIVERY_SPEED: FieldSpec = FieldSpec::new(22, "delivery_speed", Float);
    pub const ENTRY: FieldSpec = FieldSpec::new(23, "c_entry", Text);
    pub const EXIT: FieldSpec = FieldSpec::new(24, "c_exit", Text);
    pub const LANGUAGE: FieldSpec = FieldSpec::new(25, "c_language", Text);
    pub const LAUNCH_DATA: FieldSpec = FieldSpec::new(26, "launch_data", LargeText);
    pub const LEARNER_NAME: FieldSpec = FieldSpec::new(27, "learner_name", Text);
    pub const LOCATION: FieldSpec = FieldSpec::new(28, "location", Text);
    pub const MAX: FieldSpec = FieldSpec::new(29, "c_max", Float);
    pub const MIN: FieldSpec = FieldSpec::new(30, "c_min", Float);
    pub const MODE: FieldSpec = FieldSpec::new(31, "c_mode", Text);
    pub const MODIFIED: FieldSpec = FieldSpec::new(32, "modified", Text);
    pub const PROGRESS_MEASURE: FieldSpec = FieldSpec::new(33, "progress_measure", Float);
    pub const RAW: FieldSpec = FieldSpec::new(34, "c_raw", Float);
    pub const SCALED: FieldSpec = FieldSpec::new(35, "scaled", Float);
    pub const SCALED_PASSING_SCORE: FieldSpec = FieldSpec::new(36, "scaled_passing_score", Float);
    pub const SESSION_TIME: FieldSpec = FieldSpec::new(37, "session_time", Text);
    pub const SUCCESS_STATUS: FieldSpec = FieldSpec::new(38, "success_status", Text);
    pub const SUSPEND_DATA: FieldSpec = FieldSpec::new(39, "suspend_data", LargeText);
    pub const TOTAL_TIME: FieldSpec = FieldSpec::new(40, "total_time", Text);

    pub const LAYOUT: &[FieldSpec] = &[
        ACCESS_COUNT,
        ACCESS_DURATION,
        ACCESSED,
        ACTIVITY_ABS_DURATION,
        ACTIVITY_ATTEMPT_COUNT,
        ACTIVITY_EXP_DURATION,
        ACTIVITY_PROG_STATUS,
        ATTEMPT_ABS_DURATION,
        ATTEMPT_COMPL_AMOUNT,
        ATTEMPT_COMPL_STATUS,
        ATTEMPT_EXP_DURATION,
        ATTEMPT_PROG_STATUS,
        AUDIO_CAPTIONING,
        AUDIO_LEVEL,
        AVAILABLE_CHILDREN,
        CMI_NODE_ID,
        COMPLETION,
        COMPLETION_STATUS,
        COMPLETION_THRESHOLD,
        CP_NODE_ID,
        CREATED,
        CREDIT,
        DELIVERY_SPEED,
        ENTRY,
        EXIT,
        LANGUAGE,
        LAUNCH_DATA,
        LEARNER_NAME,
        LOCATION,
        MAX,
        MIN,
        MODE,
        MODIFIED,
        PROGRESS_MEASURE,
        RAW,
        SCALED,
        SCALED_PASSING_SCORE,
        SESSION_TIME,
        SUCCESS_STATUS,
        SUSPEND_DATA,
        TOTAL_TIME,
    ];

    /// Columns filled from the wire row. The surrogate id is assigned by the
    /// server and the content node id is the conflict key, so both are bound
    /// on their own.
    #[must_use]
    pub fn data_columns() -> Vec<&'static str> {
        LAYOUT
            .iter()
            .filter(|f| f.position != CMI_NODE_ID.position && f.position != CP_NODE_ID.position)
            .map(|f| f.column)
            .collect()
    }
}

/// `cmi_comment` rows. Positions 0 and 1 carry client-side ids and are ignored.
pub mod comment {
    use super::ColumnType::{Integer, LargeText, Text};
    use super::FieldSpec;

    pub const COMMENT: FieldSpec = FieldSpec::new(2, "c_comment", LargeText);
    pub const TIMESTAMP: FieldSpec = FieldSpec::new(3, "c_timestamp", Text);
    pub const LOCATION: FieldSpec = FieldSpec::new(4, "location", Text);
    pub const SOURCE_IS_LMS: FieldSpec = FieldSpec::new(5, "sourceislms", Integer);

    pub const LAYOUT: &[FieldSpec] = &[COMMENT, TIMESTAMP, LOCATION, SOURCE_IS_LMS];
}

/// `cmi_interaction` rows. Position 0 is the payload-local id other tables
/// refer to; position 1 is ignored.
pub mod interaction {
    use super::ColumnType::{Float, LargeText, LocalRef, Text};
    use super::FieldSpec;

    pub const LOCAL_ID: FieldSpec = FieldSpec::new(0, "local_id", LocalRef);
    pub const DESCRIPTION: FieldSpec = FieldSpec::new(2, "description", LargeText);
    pub const ID: FieldSpec = FieldSpec::new(3, "id", Text);
    pub const LATENCY: FieldSpec = FieldSpec::new(4, "latency", Text);
    pub const LEARNER_RESPONSE: FieldSpec = FieldSpec::new(5, "learner_response", LargeText);
    pub const RESULT: FieldSpec = FieldSpec::new(6, "result", Text);
    pub const TIMESTAMP: FieldSpec = FieldSpec::new(7, "c_timestamp", Text);
    pub const TYPE: FieldSpec = FieldSpec::new(8, "c_type", Text);
    pub const WEIGHTING: FieldSpec = FieldSpec::new(9, "weighting", Float);

    pub const LAYOUT: &[FieldSpec] =
        &[LOCAL_ID, DESCRIPTION, ID, LATENCY, LEARNER_RESPONSE, RESULT, TIMESTAMP, TYPE, WEIGHTING];
}

/// `cmi_objective` rows. Position 0 optionally names the payload-local
/// interaction; positions 1 and 2 are ignored.
pub mod objective {
    use super::ColumnType::{Float, LargeText, LocalRef, Text};
    use super::FieldSpec;

    pub const INTERACTION_REF: FieldSpec = FieldSpec::new(0, "interaction_ref", LocalRef);
    pub const COMPLETION_STATUS: FieldSpec = FieldSpec::new(3, "completion_status", Text);
    pub const DESCRIPTION: FieldSpec = FieldSpec::new(4, "description", LargeText);
    pub const ID: FieldSpec = FieldSpec::new(5, "id", Text);
    pub const MAX: FieldSpec = FieldSpec::new(6, "c_max", Float);
    pub const MIN: FieldSpec = FieldSpec::new(7, "c_min", Float);
    pub const RAW: FieldSpec = FieldSpec::new(8, "c_raw", Float);
    pub const SCALED: FieldSpec = FieldSpec::new(9, "scaled", Float);
    pub const PROGRESS_MEASURE: FieldSpec = FieldSpec::new(10, "progress_measure", Float);
    pub const SUCCESS_STATUS: FieldSpec = FieldSpec::new(11, "success_status", Text);
    pub const SCOPE: FieldSpec = FieldSpec::new(12, "scope", Text);

    pub const LAYOUT: &[FieldSpec] = &[
        INTERACTION_REF,
        COMPLETION_STATUS,
        DESCRIPTION,
        ID,
        MAX,
        MIN,
        RAW,
        SCALED,
        PROGRESS_MEASURE,
        SUCCESS_STATUS,
        SCOPE,
    ];
}

/// `cmi_correct_response` rows. Position 0 is ignored.
pub mod correct_response {
    use super::ColumnType::{LocalRef, Text};
    use super::FieldSpec;

    pub const INTERACTION_REF: FieldSpec = FieldSpec::new(1, "interaction_ref", LocalRef);
    pub const PATTERN: FieldSpec = FieldSpec::new(2, "pattern", Text);

    pub const LAYOUT: &[FieldSpec] = &[INTERACTION_REF, PATTERN];
}
