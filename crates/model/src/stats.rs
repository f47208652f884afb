use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One entry of the structured failure artifact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorRecord {
    pub file: String,
    pub error: String,
    pub timestamp: DateTime<Utc>,
}

/// Run-scoped counters, owned and folded by the driver only.
///
/// `skipped` counts candidates that were already in the progress record at
/// enumeration time. `completed` counts stored + duplicate outcomes,
/// `failed` counts permanent skips + transient failures.
#[derive(Debug, Clone, Default)]
pub struct RunStats {
    pub total: u64,
    pub completed: u64,
    pub failed: u64,
    pub skipped: u64,
    pub errors: Vec<ErrorRecord>,
}

impl RunStats {
    pub fn new(total: u64, skipped: u64) -> Self {
        RunStats {
            total,
            skipped,
            ..Default::default()
        }
    }

    pub fn record_failure(&mut self, file: &str, error: &str) {
        self.failed += 1;
        self.errors.push(ErrorRecord {
            file: file.to_string(),
            error: error.to_string(),
            timestamp: Utc::now(),
        });
    }

    /// Pieces that reached a terminal outcome this run.
    pub fn processed(&self) -> u64 {
        self.completed + self.failed
    }
}
