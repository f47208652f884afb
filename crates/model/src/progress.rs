use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Durable state of a migration: the set of piece names already handled.
///
/// Serialized as a single JSON document with camelCase fields. The
/// `migrated_count == migrated_files.len()` invariant is maintained by the
/// mutators here; [`ProgressRecord::reconcile`] restores it after a reload
/// in case a hand-edited record drifted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressRecord {
    pub last_updated: DateTime<Utc>,
    pub total_files: u64,
    pub migrated_count: u64,
    pub migrated_files: BTreeSet<String>,
}

impl ProgressRecord {
    /// Zero-valued record, used when no persisted state exists yet.
    pub fn empty() -> Self {
        ProgressRecord {
            last_updated: Utc::now(),
            total_files: 0,
            migrated_count: 0,
            migrated_files: BTreeSet::new(),
        }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.migrated_files.contains(name)
    }

    /// Marks a piece as handled. Returns `false` if it was already recorded.
    pub fn mark_migrated(&mut self, name: &str) -> bool {
        let inserted = self.migrated_files.insert(name.to_string());
        if inserted {
            self.migrated_count = self.migrated_files.len() as u64;
            self.last_updated = Utc::now();
        }
        inserted
    }

    /// Records the candidate-set size from the latest full enumeration.
    pub fn set_total_files(&mut self, total: u64) {
        self.total_files = total;
        self.last_updated = Utc::now();
    }

    /// Re-derives the count from the name set.
    pub fn reconcile(&mut self) {
        self.migrated_count = self.migrated_files.len() as u64;
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mark_migrated_keeps_count_in_sync() {
        let mut record = ProgressRecord::empty();
        assert!(record.mark_migrated("piece-a"));
        assert!(record.mark_migrated("piece-b"));
        assert!(!record.mark_migrated("piece-a"), "duplicate insert");

        assert_eq!(record.migrated_count, 2);
        assert_eq!(record.migrated_count, record.migrated_files.len() as u64);
        assert!(record.contains("piece-a"));
        assert!(!record.contains("piece-c"));
    }

    #[test]
    fn serializes_with_camel_case_fields() {
        let mut record = ProgressRecord::empty();
        record.mark_migrated("piece-a");
        record.set_total_files(3);

        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("lastUpdated").is_some());
        assert_eq!(json["totalFiles"], 3);
        assert_eq!(json["migratedCount"], 1);
        assert_eq!(json["migratedFiles"], serde_json::json!(["piece-a"]));
    }

    #[test]
    fn reconcile_fixes_drifted_count() {
        let json = serde_json::json!({
            "lastUpdated": "2026-01-01T00:00:00Z",
            "totalFiles": 2,
            "migratedCount": 7,
            "migratedFiles": ["a", "b"],
        });

        let mut record: ProgressRecord = serde_json::from_value(json).unwrap();
        record.reconcile();
        assert_eq!(record.migrated_count, 2);
    }
}
