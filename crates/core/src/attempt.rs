use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::value::{int_value, non_empty_text};

/// Coarse per-(package, user) progress and session record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttemptSummary {
    pub package_id: i64,
    pub user_id: i64,
    /// Session token handed to the player at launch.
    pub hash: Option<i64>,
    /// Expiry of `hash`; slides forward on every hash-authorized write.
    pub hash_end: Option<DateTime<Utc>>,
    /// Elapsed time measured by the player shell.
    pub total_time_sec: Option<i64>,
    /// Total time reported by the content through the data model.
    pub sco_total_time_sec: Option<i64>,
    pub last_visited: Option<String>,
    pub last_access: Option<DateTime<Utc>>,
    pub status: Option<i32>,
    pub percentage_completed: Option<i32>,
}

impl AttemptSummary {
    /// A fresh summary with no tracking data yet.
    #[must_use]
    pub const fn new(package_id: i64, user_id: i64) -> Self {
        Self {
            package_id,
            user_id,
            hash: None,
            hash_end: None,
            total_time_sec: None,
            sco_total_time_sec: None,
            last_visited: None,
            last_access: None,
            status: None,
            percentage_completed: None,
        }
    }

    /// The stored hash, if the session window is still open at `now`.
    #[must_use]
    pub fn live_hash(&self, now: DateTime<Utc>) -> Option<i64> {
        match self.hash_end {
            Some(end) if end > now => self.hash,
            _ => None,
        }
    }
}

/// End of the sliding session window that starts at `now`.
#[must_use]
pub fn session_deadline(now: DateTime<Utc>, window_minutes: i64) -> DateTime<Utc> {
    now + Duration::minutes(window_minutes)
}

/// Convert centiseconds to whole seconds, rounding halves away from zero.
#[must_use]
pub const fn centiseconds_to_seconds(centiseconds: i64) -> i64 {
    if centiseconds >= 0 {
        centiseconds.saturating_add(50) / 100
    } else {
        -(centiseconds.saturating_neg().saturating_add(50) / 100)
    }
}

/// Beacon posted by the player when its page unloads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UnloadBeacon {
    #[serde(default)]
    pub p: Value,
    #[serde(default)]
    pub hash: Value,
    #[serde(default)]
    pub last: Value,
    #[serde(default)]
    pub total_time_sec: Value,
}

impl UnloadBeacon {
    /// User id claimed by the player.
    #[must_use]
    pub fn claimed_user(&self) -> Option<i64> {
        int_value(&self.p)
    }

    #[must_use]
    pub fn presented_hash(&self) -> Option<i64> {
        int_value(&self.hash)
    }

    /// Last visited activity; the empty string means none.
    #[must_use]
    pub fn last_visited(&self) -> Option<String> {
        non_empty_text(&self.last)
    }

    /// Elapsed seconds, absent when the player sent nothing or an empty string.
    #[must_use]
    pub fn elapsed_seconds(&self) -> Option<i64> {
        non_empty_text(&self.total_time_sec).and_then(|_| int_value(&self.total_time_sec))
    }

    /// The player sent an elapsed time, numeric or not.
    #[must_use]
    pub fn reports_elapsed_time(&self) -> bool {
        non_empty_text(&self.total_time_sec).is_some()
    }

    /// Build the attempt update for this beacon at `now`.
    #[must_use]
    pub fn to_update(&self, now: DateTime<Utc>, window_minutes: i64) -> UnloadUpdate {
        UnloadUpdate {
            total_time_sec: self.elapsed_seconds(),
            last_visited: self.last_visited(),
            hash_end: session_deadline(now, window_minutes),
            last_access: now,
        }
    }
}

/// Fields written by the unload handler. `total_time_sec == None` leaves the
/// stored total untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct UnloadUpdate {
    pub total_time_sec: Option<i64>,
    pub last_visited: Option<String>,
    pub hash_end: DateTime<Utc>,
    pub last_access: DateTime<Utc>,
}

/// Fields written by the status synchronizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusUpdate {
    pub sco_total_time_sec: i64,
    pub status: Option<i32>,
    pub percentage_completed: Option<i32>,
    /// New session expiry; `None` leaves it untouched.
    pub hash_end: Option<DateTime<Utc>>,
}
