use crate::retry::RetryDisposition;
use connectors::error::UploadError;

/// Failure buckets for one upload attempt, in priority order.
///
/// Telling "already done" and "will never succeed" apart from "might
/// succeed later" is what makes the run safely repeatable without manual
/// bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The remote side already holds identical content; counts as completed
    /// and the piece is marked handled.
    Duplicate,
    /// Will never succeed without operator action; counted as failed but
    /// marked handled so it is never retried automatically.
    PermanentSkip,
    /// Counted as failed and left unmarked, so the next run retries it.
    Transient,
}

/// Maps a structured upload error to its failure bucket.
pub fn classify(error: &UploadError) -> FailureKind {
    match error {
        UploadError::AlreadyStored => FailureKind::Duplicate,
        UploadError::PayloadTooLarge { .. } => FailureKind::PermanentSkip,
        UploadError::RateLimited
        | UploadError::Remote { .. }
        | UploadError::Http(_)
        | UploadError::InvalidResponse(_) => FailureKind::Transient,
    }
}

/// Retry classifier for the in-run retry policy: only transient failures
/// are worth another attempt.
pub fn retry_disposition(error: &UploadError) -> RetryDisposition {
    match classify(error) {
        FailureKind::Transient => RetryDisposition::Retry,
        FailureKind::Duplicate | FailureKind::PermanentSkip => RetryDisposition::Stop,
    }
}
