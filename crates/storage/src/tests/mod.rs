//! Test utilities and module declarations for storage tests.

use crate::MemoryStorage;
use scorm_sync_core::cmi::CmiNode;

pub fn create_test_storage() -> MemoryStorage {
    MemoryStorage::new()
}

pub fn create_test_node(cp_node_id: i64) -> CmiNode {
    CmiNode {
        cp_node_id: Some(cp_node_id),
        completion_status: Some("incomplete".to_owned()),
        location: Some("page-1".to_owned()),
        ..CmiNode::default()
    }
}
