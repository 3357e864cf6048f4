//! The CMI sync request body.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use super::instruction::InstructionMask;
use super::layout::{node, RowReader};
use super::records::{CmiRecord, CmiTable};
use crate::attempt::centiseconds_to_seconds;
use crate::value::{int_value, text_value};

/// Everything the player sends on a data model commit.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CmiPayload {
    /// Claimed user id, only trusted after the session check.
    #[serde(default)]
    pub p: Value,
    #[serde(default)]
    pub hash: Value,
    /// Which child tables the client tracks; persisted with the node.
    #[serde(default)]
    pub i_check: Value,
    /// Purge instructions for child tables, see [`InstructionMask`].
    #[serde(default)]
    pub i_set: Value,
    #[serde(default, deserialize_with = "rows")]
    pub node: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "rows")]
    pub comment: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "rows")]
    pub interaction: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "rows")]
    pub objective: Vec<Vec<Value>>,
    #[serde(default, deserialize_with = "rows")]
    pub correct_response: Vec<Vec<Value>>,
    #[serde(default)]
    pub now_global_status: Value,
    #[serde(default)]
    pub saved_global_status: Value,
    #[serde(default)]
    pub changed_seq_utilities: Value,
    /// Local objective rollups, see [`crate::MergePlan`].
    #[serde(default)]
    pub adl_seq_utilities: Value,
    #[serde(default, rename = "totalTimeCentisec")]
    pub total_time_centisec: Value,
    #[serde(default, rename = "percentageCompleted")]
    pub percentage_completed: Value,
}

/// Accept only arrays of arrays; anything else decodes as no rows.
fn rows<'de, D>(deserializer: D) -> Result<Vec<Vec<Value>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let Value::Array(rows) = value else {
        return Ok(Vec::new());
    };
    Ok(rows
        .into_iter()
        .filter_map(|row| match row {
            Value::Array(cells) => Some(cells),
            _ => None,
        })
        .collect())
}

impl CmiPayload {
    #[must_use]
    pub fn claimed_user(&self) -> Option<i64> {
        int_value(&self.p)
    }

    #[must_use]
    pub fn presented_hash(&self) -> Option<i64> {
        int_value(&self.hash)
    }

    #[must_use]
    pub fn instruction_check(&self) -> i64 {
        int_value(&self.i_check).unwrap_or(0)
    }

    #[must_use]
    pub fn instruction_mask(&self) -> InstructionMask {
        InstructionMask::from_raw(int_value(&self.i_set).unwrap_or(0))
    }

    #[must_use]
    pub fn rows(&self, table: CmiTable) -> &[Vec<Value>] {
        match table {
            CmiTable::Node => &self.node,
            CmiTable::Comment => &self.comment,
            CmiTable::Interaction => &self.interaction,
            CmiTable::Objective => &self.objective,
            CmiTable::CorrectResponse => &self.correct_response,
        }
    }

    /// All rows decoded, tables in [`CmiTable::PROCESSING_ORDER`], rows in
    /// payload order.
    #[must_use]
    pub fn records(&self) -> Vec<CmiRecord> {
        CmiTable::PROCESSING_ORDER
            .iter()
            .flat_map(|&table| self.rows(table).iter().map(move |row| CmiRecord::decode(table, row)))
            .collect()
    }

    /// Overall status computed by the player's sequencer for the package.
    #[must_use]
    pub fn new_global_status(&self) -> Option<i32> {
        int_value(&self.now_global_status).and_then(|v| i32::try_from(v).ok())
    }

    #[must_use]
    pub fn saved_global_status(&self) -> Option<String> {
        text_value(&self.saved_global_status)
    }

    /// The local objective rollups changed since the last commit.
    #[must_use]
    pub fn seq_utilities_changed(&self) -> bool {
        int_value(&self.changed_seq_utilities) == Some(1)
    }

    /// Total time of the package in whole seconds.
    #[must_use]
    pub fn total_time_seconds(&self) -> i64 {
        centiseconds_to_seconds(int_value(&self.total_time_centisec).unwrap_or(0))
    }

    #[must_use]
    pub fn percentage_completed(&self) -> Option<i32> {
        int_value(&self.percentage_completed).and_then(|v| i32::try_from(v).ok())
    }

    /// `cmi.score.scaled` of the first node row.
    #[must_use]
    pub fn scaled_score(&self) -> Option<f64> {
        self.node.first().and_then(|row| RowReader::new(row).float(node::SCALED))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn node_row(cp_node_id: i64, scaled: Value) -> Value {
        let mut row = vec![Value::Null; 41];
        row[19] = json!(cp_node_id);
        row[35] = scaled;
        Value::Array(row)
    }

    #[test]
    fn decodes_full_payload() {
        let payload: CmiPayload = serde_json::from_value(json!({
            "p": "7",
            "hash": "555",
            "i_check": 15,
            "i_set": "3",
            "node": [node_row(42, json!(0.9))],
            "comment": [[0, 0, "nice", "2024-01-01", "p1", 0]],
            "interaction": [[1, 0, "d", "q1", "PT1S", "a", "correct", "t", "choice", 1.0]],
            "objective": [[1, 0, 0, "completed", "", "o1"]],
            "correct_response": [[0, 1, "a"]],
            "now_global_status": 2,
            "saved_global_status": 1,
            "changed_seq_utilities": "1",
            "totalTimeCentisec": 12345,
            "percentageCompleted": "50"
        }))
        .unwrap();

        assert_eq!(payload.claimed_user(), Some(7));
        assert_eq!(payload.presented_hash(), Some(555));
        assert_eq!(payload.instruction_check(), 15);
        assert_eq!(payload.instruction_mask().bits(), 3);
        assert_eq!(payload.new_global_status(), Some(2));
        assert_eq!(payload.saved_global_status().as_deref(), Some("1"));
        assert!(payload.seq_utilities_changed());
        assert_eq!(payload.total_time_seconds(), 123);
        assert_eq!(payload.percentage_completed(), Some(50));
        assert_eq!(payload.scaled_score(), Some(0.9));

        let tables: Vec<CmiTable> = payload.records().iter().map(CmiRecord::table).collect();
        assert_eq!(tables, CmiTable::PROCESSING_ORDER.to_vec());
    }

    #[test]
    fn non_array_tables_decode_as_empty() {
        let payload: CmiPayload = serde_json::from_value(json!({
            "node": {"0": [1, 2]},
            "comment": null,
            "interaction": [[1], "junk", 5]
        }))
        .unwrap();
        assert!(payload.node.is_empty());
        assert!(payload.comment.is_empty());
        assert_eq!(payload.interaction.len(), 1);
    }

    #[test]
    fn defaults_when_fields_missing() {
        let payload: CmiPayload = serde_json::from_value(json!({})).unwrap();
        assert_eq!(payload.instruction_mask().bits(), 0);
        assert_eq!(payload.new_global_status(), None);
        assert!(!payload.seq_utilities_changed());
        assert_eq!(payload.total_time_seconds(), 0);
        assert_eq!(payload.scaled_score(), None);
        assert!(payload.records().is_empty());
    }
}
