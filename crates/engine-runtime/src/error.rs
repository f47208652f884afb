use connectors::error::SourceError;
use engine_core::progress::ProgressStoreError;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal errors of the migration engine.
///
/// Per-piece failures never surface here; they are converted to classified
/// outcomes at the worker boundary and folded into the run statistics.
#[derive(Debug, Error)]
pub enum MigrationError {
    /// The source could not be enumerated; there is nothing to do.
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Progress state could not be loaded or checkpointed.
    #[error("Progress store error: {0}")]
    Progress(#[from] ProgressStoreError),

    /// The failure artifact could not be written at the end of the run.
    #[error("Failed to write failure log to {path}: {source}")]
    FailureLog {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
