//! Storage layer for scorm-sync
//!
//! PostgreSQL storage for attempt summaries, CMI tracking tables and global
//! objectives, with an in-memory backend behind the same traits.

pub mod backend;
pub mod error;
mod memory;
pub mod pg_migrations;
pub mod pg_storage;
#[cfg(test)]
mod tests;
pub mod traits;

pub use backend::StorageBackend;
pub use error::StorageError;
pub use memory::MemoryStorage;
pub use pg_storage::PgStorage;
pub use traits::{AttemptStore, NodeUpsert, PackageStore, TrackingStore, TrackingTx};
