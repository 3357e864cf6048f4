//! PackageStore implementation for PgStorage.

use super::*;

use crate::traits::PackageStore;
use async_trait::async_trait;

#[async_trait]
impl PackageStore for PgStorage {
    async fn save_package(&self, settings: &PackageSettings) -> Result<(), StorageError> {
        sqlx::query(&format!(
            "INSERT INTO sahs_package ({PACKAGE_COLUMNS})
             VALUES ($1,$2,$3,$4,$5,$6,$7,$8)
             ON CONFLICT (obj_id) DO UPDATE SET
               default_lesson_mode = EXCLUDED.default_lesson_mode,
               comments = EXCLUDED.comments,
               interactions = EXCLUDED.interactions,
               objectives = EXCLUDED.objectives,
               time_from_lms = EXCLUDED.time_from_lms,
               global_to_system = EXCLUDED.global_to_system,
               sco_count = EXCLUDED.sco_count"
        ))
        .bind(settings.package_id)
        .bind(settings.default_lesson_mode.as_str())
        .bind(settings.comments)
        .bind(settings.interactions)
        .bind(settings.objectives)
        .bind(settings.time_from_lms)
        .bind(settings.global_to_system)
        .bind(settings.sco_count)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn get_package(&self, package_id: i64) -> Result<Option<PackageSettings>, StorageError> {
        let row =
            sqlx::query(&format!("SELECT {PACKAGE_COLUMNS} FROM sahs_package WHERE obj_id = $1"))
                .bind(package_id)
                .fetch_optional(&self.pool)
                .await?;
        row.map(|r| row_to_package(&r)).transpose()
    }
}
