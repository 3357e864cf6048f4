//! Core types for scorm-sync
//!
//! Domain types shared across all other crates: attempt summaries, the CMI
//! wire layout, the instruction mask and global objective merge planning.

mod attempt;
pub mod cmi;
mod constants;
mod env_config;
mod error;
mod objective;
mod package;
mod value;

pub use attempt::*;
pub use constants::*;
pub use env_config::*;
pub use error::*;
pub use objective::*;
pub use package::*;
pub use value::*;
