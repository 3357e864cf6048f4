//! Storage backend trait abstraction
//!
//! Async domain traits for the tracking tables. Writes that must be atomic
//! go through a [`TrackingTx`] obtained from [`TrackingStore::begin`].

pub mod attempt;
pub mod package;
pub mod tracking;

pub use attempt::AttemptStore;
pub use package::PackageStore;
pub use tracking::{NodeUpsert, TrackingStore, TrackingTx};
