use async_trait::async_trait;
use model::progress::ProgressRecord;
use std::path::PathBuf;
use thiserror::Error;

pub mod json_store;

#[derive(Debug, Error)]
pub enum ProgressStoreError {
    /// Persisted state exists but cannot be parsed. Fatal: prior progress
    /// is never silently discarded.
    #[error("Corrupt progress state at {path}: {source}")]
    CorruptState {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Progress store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Durable store for the migration's progress record.
///
/// Single writer (the driver); read once at startup, saved after every
/// batch and on shutdown.
#[async_trait]
pub trait ProgressStore: Send + Sync {
    /// Loads the persisted record, or a zero record when none exists.
    async fn load(&self) -> Result<ProgressRecord, ProgressStoreError>;

    /// Persists the full record, replacing any prior version.
    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError>;
}
