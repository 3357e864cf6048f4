//! Fakes and fixtures for service tests.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use scorm_sync_core::PackageSettings;
use scorm_sync_platform::{AccessEvents, LearningProgress, OutcomeReporter, PlatformError};
use scorm_sync_storage::traits::{AttemptStore, PackageStore};
use scorm_sync_storage::{MemoryStorage, StorageBackend};
use serde_json::{Value, json};

use crate::{Collaborators, TrackingService};

pub const PACKAGE: i64 = 100;
pub const USER: i64 = 7;
pub const HASH: i64 = 555;
pub const REF: i64 = 9;

#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    Status { package_id: i64, user_id: i64, status: i32, percentage: Option<i32> },
    ReadEvent { package_id: i64, user_id: i64, event_type: String, ref_id: i64, time_from_lms: bool },
    Outcome { package_id: i64, user_id: i64, score: f64 },
}

/// Records every call it receives.
#[derive(Debug, Default)]
pub struct RecordingPlatform {
    calls: Mutex<Vec<PlatformCall>>,
}

impl RecordingPlatform {
    #[expect(clippy::unwrap_used, reason = "test code")]
    pub fn calls(&self) -> Vec<PlatformCall> {
        self.calls.lock().unwrap().clone()
    }

    pub fn read_events(&self) -> Vec<PlatformCall> {
        self.calls().into_iter().filter(|c| matches!(c, PlatformCall::ReadEvent { .. })).collect()
    }

    #[expect(clippy::unwrap_used, reason = "test code")]
    fn push(&self, call: PlatformCall) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl LearningProgress for RecordingPlatform {
    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        status: i32,
        percentage: Option<i32>,
    ) -> Result<(), PlatformError> {
        self.push(PlatformCall::Status { package_id, user_id, status, percentage });
        Ok(())
    }
}

#[async_trait]
impl AccessEvents for RecordingPlatform {
    async fn sync_read_event(
        &self,
        package_id: i64,
        user_id: i64,
        event_type: &str,
        ref_id: i64,
        time_from_lms: bool,
    ) -> Result<(), PlatformError> {
        self.push(PlatformCall::ReadEvent {
            package_id,
            user_id,
            event_type: event_type.to_owned(),
            ref_id,
            time_from_lms,
        });
        Ok(())
    }
}

#[async_trait]
impl OutcomeReporter for RecordingPlatform {
    async fn report_outcome(
        &self,
        package_id: i64,
        user_id: i64,
        score: f64,
    ) -> Result<(), PlatformError> {
        self.push(PlatformCall::Outcome { package_id, user_id, score });
        Ok(())
    }
}

pub struct Harness {
    pub memory: MemoryStorage,
    pub storage: Arc<StorageBackend>,
    pub platform: Arc<RecordingPlatform>,
    pub service: TrackingService,
}

impl Harness {
    /// Package [`PACKAGE`] with default settings and a live session for
    /// [`USER`] with [`HASH`].
    pub async fn new() -> Self {
        Self::with_package(PackageSettings::new(PACKAGE)).await
    }

    #[expect(clippy::unwrap_used, reason = "test code")]
    pub async fn with_package(settings: PackageSettings) -> Self {
        let memory = MemoryStorage::new();
        let storage = Arc::new(StorageBackend::Memory(memory.clone()));
        let platform = Arc::new(RecordingPlatform::default());
        let service = TrackingService::new(
            Arc::clone(&storage),
            Collaborators::shared(Arc::clone(&platform)),
            5,
        );
        storage.save_package(&settings).await.unwrap();
        storage
            .open_session(settings.package_id, USER, HASH, Utc::now() + Duration::minutes(5))
            .await
            .unwrap();
        Self { memory, storage, platform, service }
    }
}

/// A node row with the content node id and scaled score set.
pub fn node_row(cp_node_id: i64, scaled: Value) -> Value {
    let mut row = vec![Value::Null; 41];
    row[17] = json!("incomplete");
    row[19] = json!(cp_node_id);
    row[35] = scaled;
    Value::Array(row)
}

pub fn body(value: &Value) -> Vec<u8> {
    value.to_string().into_bytes()
}

mod merge_tests;
mod node_sync_tests;
mod unload_tests;
