use crate::piece::PieceCid;

/// Terminal classification of one piece's upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadOutcome {
    /// The remote side accepted the payload and assigned it a CID.
    Stored(PieceCid),
    /// The remote side already held identical content; counted as completed.
    Duplicate,
    /// Will never succeed without operator action (e.g. oversized payload).
    /// Marked handled so it is not retried automatically.
    PermanentSkip(String),
    /// Failed this run; left unmarked so the next run retries it.
    Transient(String),
}

impl UploadOutcome {
    /// Whether the piece is recorded in the progress record after its batch.
    pub fn marks_handled(&self) -> bool {
        matches!(
            self,
            UploadOutcome::Stored(_) | UploadOutcome::Duplicate | UploadOutcome::PermanentSkip(_)
        )
    }

    /// Whether the piece counts as failed in the run statistics.
    pub fn is_failure(&self) -> bool {
        matches!(
            self,
            UploadOutcome::PermanentSkip(_) | UploadOutcome::Transient(_)
        )
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            UploadOutcome::PermanentSkip(msg) | UploadOutcome::Transient(msg) => Some(msg),
            _ => None,
        }
    }
}

/// One worker's result for one piece, returned to the driver to fold in.
#[derive(Debug, Clone)]
pub struct PieceReport {
    pub name: String,
    pub outcome: UploadOutcome,
}
