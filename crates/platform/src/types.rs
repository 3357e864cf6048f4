//! Request bodies sent to the host platform.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusWrite {
    pub package_id: i64,
    pub user_id: i64,
    pub status: i32,
    pub percentage: Option<i32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadEventSync {
    pub package_id: i64,
    pub user_id: i64,
    pub event_type: String,
    pub ref_id: i64,
    pub time_from_lms: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutcomeReport {
    pub package_id: i64,
    pub user_id: i64,
    pub score: f64,
}
