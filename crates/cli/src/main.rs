use crate::{
    commands::Commands,
    config::MigrationConfig,
    env::EnvMap,
    error::CliError,
    shutdown::ShutdownCoordinator,
};
use clap::Parser;
use connectors::{
    remote::{StorageClient, http::HttpStorageClient},
    source::PieceSource,
};
use engine_core::progress::{ProgressStore, json_store::JsonProgressStore};
use engine_runtime::executor;
use std::{path::Path, sync::Arc};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod commands;
mod config;
mod env;
mod error;
mod output;
mod shutdown;

#[derive(Parser)]
#[command(
    name = "piecehaul",
    version = "0.1.0",
    about = "Bulk piece migration to remote content-addressable storage"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Migrate { json } => migrate(json).await,
        Commands::Progress { json } => show_progress(json).await,
    };

    // Per-piece failures never land here; only fatal conditions
    // (configuration, source, corrupt progress state) are non-zero.
    let code = match result {
        Ok(()) => shutdown::ExitCode::Success,
        Err(err) => {
            tracing::error!("{err}");
            shutdown::ExitCode::GeneralError
        }
    };
    std::process::exit(code.as_i32());
}

async fn migrate(as_json: bool) -> Result<(), CliError> {
    let config = MigrationConfig::resolve(&load_env()?)?;

    let cancel = CancellationToken::new();
    let coordinator = ShutdownCoordinator::new(cancel.clone());
    coordinator.register_handlers();

    let source = PieceSource::new(&config.source_dir);
    let client: Arc<dyn StorageClient> =
        Arc::new(HttpStorageClient::new(&config.endpoint, &config.address));
    let store: Arc<dyn ProgressStore> = Arc::new(JsonProgressStore::new(&config.progress_file));

    let summary = executor::run(config.run_config(), source, client, store, cancel).await?;

    if as_json {
        output::print_summary_json(&summary)?;
    } else {
        output::print_summary(&summary);
    }

    if coordinator.is_shutdown_requested() {
        info!("Migration interrupted by operator; progress is checkpointed, re-run to continue");
    }

    Ok(())
}

async fn show_progress(as_json: bool) -> Result<(), CliError> {
    let path = config::progress_file(&load_env()?)?;
    let record = JsonProgressStore::new(&path).load().await?;

    if as_json {
        output::print_progress_json(&record)?;
    } else {
        output::print_progress_record(&path, &record);
    }

    Ok(())
}

fn load_env() -> Result<EnvMap, CliError> {
    let mut env = EnvMap::from_process();
    env.load_dotenv(Path::new(".env"))?;
    Ok(env)
}
