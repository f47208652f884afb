use engine_core::progress::ProgressStoreError;
use engine_runtime::error::MigrationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CliError {
    /// A required configuration value is missing or unusable. Resolved at
    /// startup; nothing runs without a complete configuration.
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Migration failed: {0}")]
    Migration(#[from] MigrationError),

    #[error("Progress store error: {0}")]
    Progress(#[from] ProgressStoreError),

    #[error("Failed to serialize output to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),
}
