use crate::{
    error::UploadError,
    remote::{PieceUpload, StorageClient},
};
use async_trait::async_trait;
use model::piece::PieceCid;
use serde::Deserialize;
use tracing::debug;

/// HTTP implementation of the remote storage service.
///
/// `PUT {endpoint}/v1/pieces/{name}` with the payload as the body, the
/// authorization identity in `x-piecehaul-address` and one
/// `x-piece-meta-*` header per metadata entry.
pub struct HttpStorageClient {
    client: reqwest::Client,
    endpoint: String,
    address: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    piece_cid: String,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl HttpStorageClient {
    pub fn new(endpoint: &str, address: &str) -> Self {
        HttpStorageClient {
            client: reqwest::Client::new(),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            address: address.to_string(),
        }
    }
}

#[async_trait]
impl StorageClient for HttpStorageClient {
    async fn upload(&self, piece: PieceUpload<'_>) -> Result<PieceCid, UploadError> {
        let url = format!("{}/v1/pieces/{}", self.endpoint, piece.name);
        let payload_size = piece.payload.len() as u64;

        let mut request = self
            .client
            .put(&url)
            .header("x-piecehaul-address", &self.address);
        for (key, value) in piece.metadata {
            request = request.header(format!("x-piece-meta-{key}"), value);
        }

        let response = request.body(piece.payload.to_vec()).send().await?;
        let status = response.status();
        debug!(piece = piece.name, status = status.as_u16(), "Upload response");

        if status.is_success() {
            let body: UploadResponse = response
                .json()
                .await
                .map_err(|err| UploadError::InvalidResponse(err.to_string()))?;
            return Ok(PieceCid(body.piece_cid));
        }

        match status.as_u16() {
            409 => Err(UploadError::AlreadyStored),
            413 => Err(UploadError::PayloadTooLarge { size: payload_size }),
            429 => Err(UploadError::RateLimited),
            code => {
                let text = response.text().await.unwrap_or_default();
                let message = serde_json::from_str::<ErrorBody>(&text)
                    .map(|body| body.error)
                    .unwrap_or(text);
                Err(normalize_remote_error(code, message, payload_size))
            }
        }
    }
}

/// Compatibility shim: some deployments report duplicate or oversize
/// conditions with a generic status and a human-readable message. Those are
/// normalized to their structured kinds here so the classifier stays typed.
fn normalize_remote_error(status: u16, message: String, payload_size: u64) -> UploadError {
    let lower = message.to_lowercase();
    if lower.contains("already exists") || lower.contains("duplicate") {
        return UploadError::AlreadyStored;
    }
    if lower.contains("too large") || (lower.contains("exceeds") && lower.contains("limit")) {
        return UploadError::PayloadTooLarge { size: payload_size };
    }
    UploadError::Remote { status, message }
}
