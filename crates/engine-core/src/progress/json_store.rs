use crate::progress::{ProgressStore, ProgressStoreError};
use async_trait::async_trait;
use model::progress::ProgressRecord;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Progress store backed by a single JSON file.
///
/// `save` serializes the whole record to a temp file in the same directory
/// and renames it over the target, so a crash mid-write leaves either the
/// old or the new version readable, never a truncated hybrid.
pub struct JsonProgressStore {
    path: PathBuf,
}

impl JsonProgressStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        JsonProgressStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn tmp_path(&self) -> PathBuf {
        let mut os = self.path.as_os_str().to_owned();
        os.push(".tmp");
        PathBuf::from(os)
    }
}

#[async_trait]
impl ProgressStore for JsonProgressStore {
    async fn load(&self) -> Result<ProgressRecord, ProgressStoreError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No progress record, starting empty");
                return Ok(ProgressRecord::empty());
            }
            Err(err) => return Err(err.into()),
        };

        let mut record: ProgressRecord =
            serde_json::from_slice(&bytes).map_err(|source| ProgressStoreError::CorruptState {
                path: self.path.clone(),
                source,
            })?;
        record.reconcile();
        Ok(record)
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            tokio::fs::create_dir_all(parent).await?;
        }

        let bytes = serde_json::to_vec_pretty(record).map_err(std::io::Error::other)?;
        let tmp = self.tmp_path();
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &self.path).await?;

        debug!(
            path = %self.path.display(),
            migrated = record.migrated_count,
            "Progress record saved"
        );
        Ok(())
    }
}
