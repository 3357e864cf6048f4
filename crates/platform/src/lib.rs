//! Host platform collaborators for scorm-sync
//!
//! The tracking pipeline reports into three platform services: learning
//! progress, access (read) events and outcome reporting. [`HttpPlatformClient`]
//! calls them over HTTP; [`NoopPlatform`] only logs.

mod client;
mod config;
mod error;
mod noop;
mod traits;
mod types;


pub use client::HttpPlatformClient;
pub use config::PlatformConfig;
pub use error::PlatformError;
pub use noop::NoopPlatform;
pub use traits::{AccessEvents, LearningProgress, OutcomeReporter};
pub use types::{OutcomeReport, ReadEventSync, StatusWrite};
