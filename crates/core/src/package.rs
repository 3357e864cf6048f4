//! Per-package tracking configuration.

use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::constants::SYSTEM_SCOPE_ID;
use crate::error::CoreError;

/// Lesson mode the player launches content in by default.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LessonMode {
    #[default]
    Normal,
    /// Content is previewed; nothing is tracked.
    Browse,
    Review,
}

impl LessonMode {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match *self {
            Self::Normal => "normal",
            Self::Browse => "browse",
            Self::Review => "review",
        }
    }

    #[must_use]
    pub const fn is_tracked(&self) -> bool {
        !matches!(*self, Self::Browse)
    }
}

impl Display for LessonMode {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

impl FromStr for LessonMode {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "normal" => Ok(Self::Normal),
            "browse" => Ok(Self::Browse),
            "review" => Ok(Self::Review),
            _ => Err(CoreError::InvalidInput(format!("invalid lesson mode: {s}"))),
        }
    }
}

/// Which child collections the package keeps, and how time and objectives
/// are accounted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSettings {
    pub package_id: i64,
    #[serde(default)]
    pub default_lesson_mode: LessonMode,
    #[serde(default = "enabled")]
    pub comments: bool,
    #[serde(default = "enabled")]
    pub interactions: bool,
    #[serde(default = "enabled")]
    pub objectives: bool,
    /// Session time is measured by the platform rather than the content.
    #[serde(default)]
    pub time_from_lms: bool,
    /// Global objectives are shared by every package of the installation.
    #[serde(default)]
    pub global_to_system: bool,
    /// Number of trackable content items in the package.
    #[serde(default = "single_sco")]
    pub sco_count: i64,
}

const fn enabled() -> bool {
    true
}

const fn single_sco() -> i64 {
    1
}

impl PackageSettings {
    #[must_use]
    pub const fn new(package_id: i64) -> Self {
        Self {
            package_id,
            default_lesson_mode: LessonMode::Normal,
            comments: true,
            interactions: true,
            objectives: true,
            time_from_lms: false,
            global_to_system: false,
            sco_count: 1,
        }
    }

    /// Scope id global objectives of this package are stored under.
    #[must_use]
    pub const fn objective_scope(&self) -> i64 {
        objective_scope(self.package_id, self.global_to_system)
    }
}

/// `0` for system-wide objectives, otherwise the package id.
#[must_use]
pub const fn objective_scope(package_id: i64, global_to_system: bool) -> i64 {
    if global_to_system { SYSTEM_SCOPE_ID } else { package_id }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scope_follows_global_to_system_flag() {
        assert_eq!(objective_scope(17, true), 0);
        assert_eq!(objective_scope(17, false), 17);

        let mut settings = PackageSettings::new(23);
        assert_eq!(settings.objective_scope(), 23);
        settings.global_to_system = true;
        assert_eq!(settings.objective_scope(), 0);
    }

    #[test]
    fn lesson_mode_parsing() {
        assert_eq!("browse".parse::<LessonMode>().unwrap(), LessonMode::Browse);
        assert!(!LessonMode::Browse.is_tracked());
        assert!(LessonMode::Normal.is_tracked());
        assert!("preview".parse::<LessonMode>().is_err());
    }

    #[test]
    fn settings_defaults_from_json() {
        let settings: PackageSettings = serde_json::from_str(r#"{"package_id": 4}"#).unwrap();
        assert!(settings.comments && settings.interactions && settings.objectives);
        assert!(!settings.time_from_lms);
        assert_eq!(settings.default_lesson_mode, LessonMode::Normal);
        assert_eq!(settings, PackageSettings::new(4));
    }
}
