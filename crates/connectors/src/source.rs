use crate::error::SourceError;
use std::path::{Path, PathBuf};

/// Filename filter applied during enumeration to exclude non-piece entries.
#[derive(Debug, Clone, Default)]
pub struct NamePredicate {
    prefix: Option<String>,
    suffix: Option<String>,
}

impl NamePredicate {
    pub fn new(prefix: Option<String>, suffix: Option<String>) -> Self {
        NamePredicate { prefix, suffix }
    }

    pub fn matches(&self, name: &str) -> bool {
        if name.starts_with('.') {
            return false;
        }
        if let Some(prefix) = &self.prefix
            && !name.starts_with(prefix.as_str())
        {
            return false;
        }
        if let Some(suffix) = &self.suffix
            && !name.ends_with(suffix.as_str())
        {
            return false;
        }
        true
    }
}

/// Local directory holding the immutable piece files.
pub struct PieceSource {
    root: PathBuf,
}

impl PieceSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        PieceSource { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_of(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Lists candidate piece names. Regular files only, sorted by name so
    /// batching is deterministic across platforms.
    pub async fn list_names(&self, predicate: &NamePredicate) -> Result<Vec<String>, SourceError> {
        let unavailable = |source| SourceError::Unavailable {
            path: self.root.clone(),
            source,
        };

        let mut dir = tokio::fs::read_dir(&self.root).await.map_err(unavailable)?;
        let mut names = Vec::new();

        while let Some(entry) = dir.next_entry().await.map_err(unavailable)? {
            let file_type = entry.file_type().await.map_err(unavailable)?;
            if !file_type.is_file() {
                continue;
            }
            if let Some(name) = entry.file_name().to_str()
                && predicate.matches(name)
            {
                names.push(name.to_string());
            }
        }

        names.sort();
        Ok(names)
    }

    /// Reads one piece's payload.
    pub async fn read(&self, name: &str) -> Result<Vec<u8>, SourceError> {
        tokio::fs::read(self.path_of(name))
            .await
            .map_err(|source| SourceError::Read {
                name: name.to_string(),
                source,
            })
    }
}
