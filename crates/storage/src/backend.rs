//! Unified storage backend with enum dispatch.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use scorm_sync_core::cmi::{
    StoredComment, StoredCorrectResponse, StoredInteraction, StoredNode, StoredObjective,
};
use scorm_sync_core::{
    AttemptSummary, GlobalObjective, PackageSettings, StatusUpdate, UnloadUpdate,
};

use crate::error::StorageError;
use crate::memory::MemoryStorage;
use crate::pg_storage::PgStorage;
use crate::traits::{AttemptStore, PackageStore, TrackingStore, TrackingTx};

macro_rules! dispatch {
    ($self:expr, $trait:path, $method:ident ( $($arg:expr),* $(,)? )) => {
        match $self {
            StorageBackend::Postgres(s) => <PgStorage as $trait>::$method(s, $($arg),*).await,
            StorageBackend::Memory(s) => <MemoryStorage as $trait>::$method(s, $($arg),*).await,
        }
    };
}

#[derive(Clone, Debug)]
pub enum StorageBackend {
    Postgres(PgStorage),
    Memory(MemoryStorage),
}

impl StorageBackend {
    pub async fn new_postgres(database_url: &str) -> Result<Self, StorageError> {
        Ok(Self::Postgres(PgStorage::new(database_url).await?))
    }

    #[must_use]
    pub fn new_memory() -> Self {
        Self::Memory(MemoryStorage::new())
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match *self {
            Self::Postgres(_) => "postgres",
            Self::Memory(_) => "memory",
        }
    }
}

// ── AttemptStore ─────────────────────────────────────────────────

#[async_trait]
impl AttemptStore for StorageBackend {
    async fn open_session(
        &self,
        package_id: i64,
        user_id: i64,
        hash: i64,
        hash_end: DateTime<Utc>,
    ) -> Result<(), StorageError> {
        dispatch!(self, AttemptStore, open_session(package_id, user_id, hash, hash_end))
    }

    async fn live_session_hash(
        &self,
        package_id: i64,
        user_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<i64>, StorageError> {
        dispatch!(self, AttemptStore, live_session_hash(package_id, user_id, now))
    }

    async fn get_attempt(
        &self,
        package_id: i64,
        user_id: i64,
    ) -> Result<Option<AttemptSummary>, StorageError> {
        dispatch!(self, AttemptStore, get_attempt(package_id, user_id))
    }

    async fn record_unload(
        &self,
        package_id: i64,
        user_id: i64,
        update: &UnloadUpdate,
    ) -> Result<bool, StorageError> {
        dispatch!(self, AttemptStore, record_unload(package_id, user_id, update))
    }

    async fn write_status(
        &self,
        package_id: i64,
        user_id: i64,
        update: &StatusUpdate,
    ) -> Result<bool, StorageError> {
        dispatch!(self, AttemptStore, write_status(package_id, user_id, update))
    }
}

// ── PackageStore ─────────────────────────────────────────────────

#[async_trait]
impl PackageStore for StorageBackend {
    async fn save_package(&self, settings: &PackageSettings) -> Result<(), StorageError> {
        dispatch!(self, PackageStore, save_package(settings))
    }

    async fn get_package(&self, package_id: i64) -> Result<Option<PackageSettings>, StorageError> {
        dispatch!(self, PackageStore, get_package(package_id))
    }
}

// ── TrackingStore ────────────────────────────────────────────────

#[async_trait]
impl TrackingStore for StorageBackend {
    async fn begin(&self) -> Result<Box<dyn TrackingTx>, StorageError> {
        dispatch!(self, TrackingStore, begin())
    }

    async fn get_node(
        &self,
        cp_node_id: i64,
        user_id: i64,
    ) -> Result<Option<StoredNode>, StorageError> {
        dispatch!(self, TrackingStore, get_node(cp_node_id, user_id))
    }

    async fn list_comments(&self, cmi_node_id: i64) -> Result<Vec<StoredComment>, StorageError> {
        dispatch!(self, TrackingStore, list_comments(cmi_node_id))
    }

    async fn list_interactions(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredInteraction>, StorageError> {
        dispatch!(self, TrackingStore, list_interactions(cmi_node_id))
    }

    async fn list_objectives(&self, cmi_node_id: i64) -> Result<Vec<StoredObjective>, StorageError> {
        dispatch!(self, TrackingStore, list_objectives(cmi_node_id))
    }

    async fn list_correct_responses(
        &self,
        cmi_node_id: i64,
    ) -> Result<Vec<StoredCorrectResponse>, StorageError> {
        dispatch!(self, TrackingStore, list_correct_responses(cmi_node_id))
    }

    async fn get_global_objective(
        &self,
        objective_id: &str,
        user_id: i64,
        scope_id: i64,
    ) -> Result<Option<GlobalObjective>, StorageError> {
        dispatch!(self, TrackingStore, get_global_objective(objective_id, user_id, scope_id))
    }

    async fn count_global_objectives(
        &self,
        user_id: i64,
        scope_id: i64,
    ) -> Result<u64, StorageError> {
        dispatch!(self, TrackingStore, count_global_objectives(user_id, scope_id))
    }
}
