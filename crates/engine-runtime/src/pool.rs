use connectors::{
    remote::{PieceUpload, StorageClient},
    source::PieceSource,
};
use engine_core::{
    classify::{FailureKind, classify, retry_disposition},
    retry::RetryPolicy,
};
use futures::{StreamExt, stream};
use model::outcome::{PieceReport, UploadOutcome};
use std::collections::HashMap;
use tracing::warn;

/// Uploads one batch with at most `concurrency` pieces in flight.
///
/// The call returns once every piece has a terminal outcome; a slow or
/// failing piece never blocks or cancels its siblings beyond the
/// concurrency limit. Workers return outcomes for the driver to fold in
/// and never touch shared state.
pub async fn run_batch(
    batch: &[String],
    source: &PieceSource,
    client: &dyn StorageClient,
    concurrency: usize,
    retry: &RetryPolicy,
) -> Vec<PieceReport> {
    stream::iter(batch.iter().map(|name| async move {
        let outcome = upload_piece(name, source, client, retry).await;
        if let Some(error) = outcome.error_message() {
            warn!(piece = %name, error, "Piece upload failed");
        }
        PieceReport {
            name: name.clone(),
            outcome,
        }
    }))
    .buffer_unordered(concurrency.max(1))
    .collect()
    .await
}

async fn upload_piece(
    name: &str,
    source: &PieceSource,
    client: &dyn StorageClient,
    retry: &RetryPolicy,
) -> UploadOutcome {
    // A piece that cannot be read right now may be readable on the next
    // run; classified transient, not fatal.
    let payload = match source.read(name).await {
        Ok(payload) => payload,
        Err(err) => return UploadOutcome::Transient(err.to_string()),
    };

    let metadata = piece_metadata(source, name, payload.len());
    let result = retry
        .run(
            || {
                client.upload(PieceUpload {
                    name,
                    payload: &payload,
                    metadata: &metadata,
                })
            },
            retry_disposition,
        )
        .await;

    match result {
        Ok(cid) => UploadOutcome::Stored(cid),
        Err(err) => match classify(&err) {
            FailureKind::Duplicate => UploadOutcome::Duplicate,
            FailureKind::PermanentSkip => UploadOutcome::PermanentSkip(err.to_string()),
            FailureKind::Transient => UploadOutcome::Transient(err.to_string()),
        },
    }
}

fn piece_metadata(source: &PieceSource, name: &str, size: usize) -> HashMap<String, String> {
    HashMap::from([
        (
            "source".to_string(),
            source.path_of(name).display().to_string(),
        ),
        ("size".to_string(), size.to_string()),
    ])
}
