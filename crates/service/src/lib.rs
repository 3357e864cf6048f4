//! Service layer for scorm-sync
//!
//! The tracking pipeline between the HTTP handlers and storage: session
//! guard, node synchronizer, global objective merge and status sync.

#![allow(missing_docs, reason = "Internal crate with self-explanatory API")]
#![allow(clippy::missing_errors_doc, reason = "Errors are self-explanatory from Result types")]
#![allow(missing_debug_implementations, reason = "Internal types")]
#![allow(clippy::missing_docs_in_private_items, reason = "Internal crate")]
#![allow(clippy::implicit_return, reason = "Implicit return is idiomatic Rust")]
#![allow(clippy::question_mark_used, reason = "? operator is idiomatic Rust")]
#![allow(clippy::cognitive_complexity, reason = "Complex async flows are inherent")]
#![allow(clippy::min_ident_chars, reason = "Short error vars are idiomatic")]

mod collaborators;
mod error;
mod node_sync;
mod objective_merge;
mod session_guard;
mod status_sync;
mod tracking_service;
mod unload_handler;

#[cfg(test)]
mod tests;

pub use collaborators::Collaborators;
pub use error::ServiceError;
pub use node_sync::{NodeIdMap, NodeSynchronizer};
pub use objective_merge::ObjectiveMerger;
pub use session_guard::{SessionGuard, SessionToken};
pub use status_sync::StatusSynchronizer;
pub use tracking_service::{CmiSyncResult, TrackingService};
pub use unload_handler::UnloadHandler;
