use connectors::{
    error::SourceError,
    source::{NamePredicate, PieceSource},
};
use model::progress::ProgressRecord;

/// Result of a full enumeration: the candidate count and what is left.
#[derive(Debug)]
pub struct WorkSet {
    pub total: usize,
    /// Candidates already in the progress record at startup.
    pub already_migrated: usize,
    /// Names still to upload, candidate order preserved.
    pub pending: Vec<String>,
}

/// Lists candidates under the predicate and subtracts the handled names.
pub async fn discover(
    source: &PieceSource,
    predicate: &NamePredicate,
    progress: &ProgressRecord,
) -> Result<WorkSet, SourceError> {
    let candidates = source.list_names(predicate).await?;
    Ok(split(candidates, progress))
}

/// Set subtraction with candidate order preserved.
pub fn split(candidates: Vec<String>, progress: &ProgressRecord) -> WorkSet {
    let total = candidates.len();
    let pending: Vec<String> = candidates
        .into_iter()
        .filter(|name| !progress.contains(name))
        .collect();

    WorkSet {
        total,
        already_migrated: total - pending.len(),
        pending,
    }
}
