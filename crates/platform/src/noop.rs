use async_trait::async_trait;

use crate::error::PlatformError;
use crate::traits::{AccessEvents, LearningProgress, OutcomeReporter};

/// Stands in for the platform when none is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopPlatform;

#[async_trait]
impl LearningProgress for NoopPlatform {
    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        status: i32,
        percentage: Option<i32>,
    ) -> Result<(), PlatformError> {
        tracing::debug!(package_id, user_id, status, ?percentage, "no platform: learning progress");
        Ok(())
    }
}

#[async_trait]
impl AccessEvents for NoopPlatform {
    async fn sync_read_event(
        &self,
        package_id: i64,
        user_id: i64,
        event_type: &str,
        ref_id: i64,
        time_from_lms: bool,
    ) -> Result<(), PlatformError> {
        tracing::debug!(package_id, user_id, event_type, ref_id, time_from_lms, "no platform: read event");
        Ok(())
    }
}

#[async_trait]
impl OutcomeReporter for NoopPlatform {
    async fn report_outcome(
        &self,
        package_id: i64,
        user_id: i64,
        score: f64,
    ) -> Result<(), PlatformError> {
        tracing::debug!(package_id, user_id, score, "no platform: outcome");
        Ok(())
    }
}
