use std::path::PathBuf;
use thiserror::Error;

/// Errors from the local piece source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The source directory cannot be listed. Fatal for the whole run.
    #[error("Source unavailable at {path}: {source}")]
    Unavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A single piece's payload could not be read.
    #[error("Failed to read piece '{name}': {source}")]
    Read {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Errors from the remote storage client, one variant per failure signal
/// the classifier distinguishes.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The remote side already holds identical content.
    #[error("piece already stored remotely")]
    AlreadyStored,

    /// The payload exceeds the remote size ceiling.
    #[error("payload of {size} bytes exceeds the remote size ceiling")]
    PayloadTooLarge { size: u64 },

    /// The remote side is shedding load.
    #[error("remote side is rate limiting requests")]
    RateLimited,

    /// Any other remote-reported failure.
    #[error("remote error (status {status}): {message}")]
    Remote { status: u16, message: String },

    /// Transport-level failure (connect, timeout, TLS).
    #[error("transport error: {0}")]
    Http(#[from] reqwest::Error),

    /// The remote side answered success but the body was not usable.
    #[error("invalid upload response: {0}")]
    InvalidResponse(String),
}
