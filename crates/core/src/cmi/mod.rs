//! The CMI tracking tables: wire layout, typed records and stored rows.

mod instruction;
pub mod layout;
mod payload;
mod records;
mod stored;

pub use instruction::{InstructionMask, PurgePlan, WantFlags};
pub use payload::CmiPayload;
pub use records::{
    CmiComment, CmiCorrectResponse, CmiInteraction, CmiNode, CmiObjective, CmiRecord, CmiTable,
};
pub use stored::{
    NodeSnapshot, StoredComment, StoredCorrectResponse, StoredInteraction, StoredNode,
    StoredObjective,
};
