use crate::error::MigrationError;
use model::stats::{ErrorRecord, RunStats};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Final accounting of one run.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub duration_secs: f64,
    pub pieces_per_minute: f64,
    pub interrupted: bool,
    pub failure_log: Option<PathBuf>,
}

pub fn summarize(run_id: &str, stats: &RunStats, elapsed: Duration, interrupted: bool) -> RunSummary {
    let duration_secs = elapsed.as_secs_f64();
    let processed = stats.processed() as f64;
    let pieces_per_minute = if duration_secs > 0.0 {
        processed / duration_secs * 60.0
    } else {
        0.0
    };

    RunSummary {
        run_id: run_id.to_string(),
        total: stats.total,
        completed: stats.completed,
        failed: stats.failed,
        skipped: stats.skipped,
        duration_secs,
        pieces_per_minute,
        interrupted,
        failure_log: None,
    }
}

/// Writes the structured failure artifact, one record per failed piece.
/// Nothing is written when the run had no failures.
pub async fn write_failure_log(
    path: &Path,
    errors: &[ErrorRecord],
) -> Result<Option<PathBuf>, MigrationError> {
    if errors.is_empty() {
        return Ok(None);
    }

    let failure_log = |source| MigrationError::FailureLog {
        path: path.to_path_buf(),
        source,
    };

    let bytes = serde_json::to_vec_pretty(errors)
        .map_err(std::io::Error::other)
        .map_err(failure_log)?;
    tokio::fs::write(path, bytes).await.map_err(failure_log)?;

    info!(path = %path.display(), failures = errors.len(), "Failure log written");
    Ok(Some(path.to_path_buf()))
}
