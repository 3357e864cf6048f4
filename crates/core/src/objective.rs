//! Global objectives and planning of the local → global merge.
//!
//! The player sends its local objective rollups as nested maps:
//! `kind → objective id → user id → scope key → value`. The `status` kind
//! is special and carries the overall course status triple directly under
//! the user key.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::constants::{OVERALL_STATUS_OBJECTIVE_ID, STATUS_OBJECTIVE_KIND};

/// Objective state aggregated across attempts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalObjective {
    pub objective_id: String,
    pub user_id: i64,
    pub scope_id: i64,
    /// Only set on the overall status row.
    pub status: Option<String>,
    #[serde(flatten)]
    pub values: GlobalObjectiveValues,
}

/// Per-objective fields written by the merge. Every field is written on each
/// merge, absent ones as NULL.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalObjectiveValues {
    pub satisfied: Option<String>,
    pub measure: Option<String>,
    pub score_raw: Option<String>,
    pub score_min: Option<String>,
    pub score_max: Option<String>,
    pub completion_status: Option<String>,
    pub progress_measure: Option<String>,
}

impl GlobalObjectiveValues {
    /// Store `value` under `kind`. Returns `false` for unknown kinds.
    pub fn set(&mut self, kind: &str, value: Option<String>) -> bool {
        let slot = match kind {
            "satisfied" => &mut self.satisfied,
            "measure" => &mut self.measure,
            "score_raw" => &mut self.score_raw,
            "score_min" => &mut self.score_min,
            "score_max" => &mut self.score_max,
            "completion_status" => &mut self.completion_status,
            "progress_measure" => &mut self.progress_measure,
            _ => return false,
        };
        *slot = value;
        true
    }
}

/// The synthetic overall course status.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverallStatus {
    pub completed: Option<String>,
    pub satisfied: Option<String>,
    pub measure: Option<String>,
}

/// Rows to write for one merge.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Upserted as [`OVERALL_STATUS_OBJECTIVE_ID`] when present.
    pub status: Option<OverallStatus>,
    /// One pending row per objective id.
    pub objectives: BTreeMap<String, GlobalObjectiveValues>,
}

impl MergePlan {
    /// Fold the player's rollups for `user_id` in `package_id` into pending
    /// rows.
    ///
    /// Values are read under `[user_id][package_id]`; a missing value is
    /// planned as NULL, never skipped.
    #[must_use]
    pub fn from_seq_utilities(data: &Value, user_id: i64, package_id: i64) -> Self {
        let mut plan = Self::default();
        let Some(kinds) = data.as_object() else {
            return plan;
        };
        let user_key = user_id.to_string();
        let package_key = package_id.to_string();

        for (kind, objectives) in kinds {
            let Some(objectives) = objectives.as_object() else {
                continue;
            };
            for (objective_id, per_user) in objectives {
                let for_user = per_user.get(&user_key);
                if kind == STATUS_OBJECTIVE_KIND {
                    plan.status = Some(OverallStatus {
                        completed: member_text(for_user, "completed"),
                        satisfied: member_text(for_user, "satisfied"),
                        measure: member_text(for_user, "measure"),
                    });
                    continue;
                }
                if is_overall_status(objective_id) {
                    tracing::debug!(kind = %kind, "ignoring local value for the overall status id");
                    continue;
                }
                let value = member_text(for_user, &package_key);
                let row = plan.objectives.entry(objective_id.clone()).or_default();
                if !row.set(kind, value) {
                    tracing::debug!(kind = %kind, objective_id = %objective_id, "ignoring unknown objective kind");
                }
            }
        }
        plan
    }

    #[must_use]
    pub fn objective_ids(&self) -> Vec<String> {
        self.objectives.keys().cloned().collect()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.objectives.is_empty()
    }

    /// The `(completed, satisfied, measure)` triple of the status row.
    #[must_use]
    pub fn overall(&self) -> OverallStatus {
        self.status.clone().unwrap_or_default()
    }
}

/// `true` for the reserved overall status objective id.
#[must_use]
pub fn is_overall_status(objective_id: &str) -> bool {
    objective_id == OVERALL_STATUS_OBJECTIVE_ID
}

fn member_text(container: Option<&Value>, key: &str) -> Option<String> {
    container.and_then(Value::as_object).and_then(|m: &Map<String, Value>| m.get(key)).and_then(scalar_text)
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}
