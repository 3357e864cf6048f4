//! Request and response types of the HTTP API.

use scorm_sync_core::{LessonMode, PackageSettings};
use serde::{Deserialize, Serialize};

const fn enabled() -> bool {
    true
}

const fn one() -> i64 {
    1
}

/// Query parameters shared by the player endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct TrackingQuery {
    /// Repository reference of the learning module, passed on to access events.
    #[serde(default)]
    pub ref_id: i64,
}

/// Body of `PUT /api/packages/{package_id}`.
#[derive(Debug, Deserialize)]
pub struct PackageSettingsRequest {
    #[serde(default)]
    pub default_lesson_mode: LessonMode,
    #[serde(default = "enabled")]
    pub comments: bool,
    #[serde(default = "enabled")]
    pub interactions: bool,
    #[serde(default = "enabled")]
    pub objectives: bool,
    #[serde(default)]
    pub time_from_lms: bool,
    #[serde(default)]
    pub global_to_system: bool,
    #[serde(default = "one")]
    pub sco_count: i64,
}

impl PackageSettingsRequest {
    pub fn into_settings(self, package_id: i64) -> PackageSettings {
        PackageSettings {
            package_id,
            default_lesson_mode: self.default_lesson_mode,
            comments: self.comments,
            interactions: self.interactions,
            objectives: self.objectives,
            time_from_lms: self.time_from_lms,
            global_to_system: self.global_to_system,
            sco_count: self.sco_count,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct VersionResponse {
    pub version: &'static str,
}
