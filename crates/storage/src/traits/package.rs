use async_trait::async_trait;
use scorm_sync_core::PackageSettings;

use crate::error::StorageError;

/// Per-package tracking settings.
#[async_trait]
pub trait PackageStore: Send + Sync {
    /// Save or replace the settings of a package.
    async fn save_package(&self, settings: &PackageSettings) -> Result<(), StorageError>;

    async fn get_package(&self, package_id: i64) -> Result<Option<PackageSettings>, StorageError>;
}
