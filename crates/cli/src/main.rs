mod commands;

use std::sync::Arc;

use anyhow::Result;
use clap::{Parser, Subcommand};
use scorm_sync_core::{SESSION_WINDOW_MINUTES, env_non_empty, env_parse_with_default};
use scorm_sync_platform::{HttpPlatformClient, PlatformConfig};
use scorm_sync_service::{Collaborators, TrackingService};
use scorm_sync_storage::StorageBackend;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "scorm-sync")]
#[command(about = "SCORM 2004 tracking data sync server", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP API
    Serve {
        #[arg(short, long, default_value = "8080")]
        port: u16,
        #[arg(short = 'H', long, default_value = "127.0.0.1")]
        host: String,
    },
    /// Create the PostgreSQL schema
    Migrate,
    /// Print the attempt summary of a user
    Attempt { package_id: i64, user_id: i64 },
}

pub(crate) async fn open_storage() -> Result<Arc<StorageBackend>> {
    let backend = match env_non_empty("DATABASE_URL") {
        Some(url) => {
            let backend = StorageBackend::new_postgres(&url).await?;
            tracing::info!("Connected to PostgreSQL");
            backend
        },
        None => {
            tracing::warn!("DATABASE_URL not set, tracking data is kept in memory only");
            StorageBackend::new_memory()
        },
    };
    Ok(Arc::new(backend))
}

pub(crate) fn collaborators() -> Result<Collaborators> {
    let Some(config) = PlatformConfig::from_env() else {
        tracing::warn!("SCORM_SYNC_PLATFORM_URL not set, platform calls are only logged");
        return Ok(Collaborators::noop());
    };
    let client = HttpPlatformClient::new(&config)?;
    tracing::info!(base_url = client.base_url(), "Reporting to host platform");
    Ok(Collaborators::shared(Arc::new(client)))
}

pub(crate) async fn tracking_service() -> Result<TrackingService> {
    let storage = open_storage().await?;
    let window = env_parse_with_default("SCORM_SYNC_SESSION_MINUTES", SESSION_WINDOW_MINUTES);
    Ok(TrackingService::new(storage, collaborators()?, window))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve { port, host } => commands::serve::run(port, host).await?,
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Attempt { package_id, user_id } => {
            commands::attempt::run(package_id, user_id).await?;
        },
    }

    Ok(())
}
