//! Creates the PostgreSQL schema ahead of the first `serve`.

use scorm_sync_core::env_non_empty;
use scorm_sync_storage::StorageBackend;

pub(crate) async fn run() -> anyhow::Result<()> {
    let url = env_non_empty("DATABASE_URL")
        .ok_or_else(|| anyhow::anyhow!("DATABASE_URL must be set for migration"))?;
    let backend = StorageBackend::new_postgres(&url).await?;
    println!("Schema up to date ({} backend)", backend.kind());
    Ok(())
}
