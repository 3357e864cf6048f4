use async_trait::async_trait;

use crate::error::PlatformError;

/// Learning-progress service: per-user completion status of a package.
#[async_trait]
pub trait LearningProgress: Send + Sync {
    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        status: i32,
        percentage: Option<i32>,
    ) -> Result<(), PlatformError>;
}

/// Access-event service: read counts and time spent per object.
#[async_trait]
pub trait AccessEvents: Send + Sync {
    /// `time_from_lms` tells the service whether the platform measured the
    /// time itself.
    async fn sync_read_event(
        &self,
        package_id: i64,
        user_id: i64,
        event_type: &str,
        ref_id: i64,
        time_from_lms: bool,
    ) -> Result<(), PlatformError>;
}

/// Outcome service: scores of single-item packages.
#[async_trait]
pub trait OutcomeReporter: Send + Sync {
    /// `score` is a percentage, the scaled score times 100.
    async fn report_outcome(
        &self,
        package_id: i64,
        user_id: i64,
        score: f64,
    ) -> Result<(), PlatformError>;
}
