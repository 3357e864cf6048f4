//! Typed error enum for the service layer.
//!
//! Unifies storage and platform failures with the pipeline's own refusals
//! (unauthorized caller, unknown package).

use scorm_sync_platform::PlatformError;
use scorm_sync_storage::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    /// Storage operation failed (DB, not found, duplicate, etc.).
    #[error("storage: {0}")]
    Storage(#[from] StorageError),

    /// A call to the host platform failed.
    #[error("platform: {0}")]
    Platform(#[from] PlatformError),

    /// Session token missing, expired or not matching.
    #[error("not allowed")]
    Unauthorized,

    #[error("not found: {entity} with id {id}")]
    NotFound { entity: &'static str, id: String },
}

impl ServiceError {
    /// Whether this error is likely transient (worth retrying).
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Storage(e) => e.is_transient(),
            Self::Platform(PlatformError::HttpRequest(e)) => e.is_timeout() || e.is_connect(),
            _ => false,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::Storage(StorageError::NotFound { .. }))
    }

    pub const fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}
