use crate::error::UploadError;
use async_trait::async_trait;
use model::piece::PieceCid;
use std::collections::HashMap;

pub mod http;

/// One piece offered to the remote storage service.
pub struct PieceUpload<'a> {
    pub name: &'a str,
    pub payload: &'a [u8],
    pub metadata: &'a HashMap<String, String>,
}

/// Remote content-addressable storage service.
///
/// Latency, timeouts and failure modes are the implementation's concern;
/// callers only see the structured [`UploadError`] kinds.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Uploads one piece, returning the CID the remote side assigned.
    async fn upload(&self, piece: PieceUpload<'_>) -> Result<PieceCid, UploadError>;
}
