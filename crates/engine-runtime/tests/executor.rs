use async_trait::async_trait;
use connectors::{
    error::UploadError,
    remote::{PieceUpload, StorageClient},
    source::{NamePredicate, PieceSource},
};
use engine_core::{
    progress::{ProgressStore, ProgressStoreError, json_store::JsonProgressStore},
    retry::RetryPolicy,
};
use engine_runtime::executor::{self, RunConfig};
use model::{piece::PieceCid, progress::ProgressRecord};
use std::{
    collections::HashMap,
    path::Path,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tempfile::{TempDir, tempdir};
use tokio_util::sync::CancellationToken;

#[derive(Clone, Copy)]
enum Behavior {
    Store,
    Duplicate,
    TooLarge,
    Transient,
}

/// Scripted remote that records every upload it sees.
#[derive(Default)]
struct ScriptedClient {
    behavior: HashMap<String, Behavior>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedClient {
    fn with(behavior: &[(&str, Behavior)]) -> Arc<Self> {
        Arc::new(ScriptedClient {
            behavior: behavior
                .iter()
                .map(|(name, b)| (name.to_string(), *b))
                .collect(),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn calls_for(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|n| *n == name).count()
    }
}

#[async_trait]
impl StorageClient for ScriptedClient {
    async fn upload(&self, piece: PieceUpload<'_>) -> Result<PieceCid, UploadError> {
        self.calls.lock().unwrap().push(piece.name.to_string());
        match self.behavior.get(piece.name).copied().unwrap_or(Behavior::Store) {
            Behavior::Store => Ok(PieceCid(format!("baga-{}", piece.name))),
            Behavior::Duplicate => Err(UploadError::AlreadyStored),
            Behavior::TooLarge => Err(UploadError::PayloadTooLarge {
                size: piece.payload.len() as u64,
            }),
            Behavior::Transient => Err(UploadError::Remote {
                status: 502,
                message: "bad gateway".into(),
            }),
        }
    }
}

/// Progress store wrapper counting checkpoint saves.
struct CountingStore {
    inner: JsonProgressStore,
    saves: AtomicUsize,
}

impl CountingStore {
    fn new(path: impl Into<std::path::PathBuf>) -> Self {
        CountingStore {
            inner: JsonProgressStore::new(path),
            saves: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl ProgressStore for CountingStore {
    async fn load(&self) -> Result<ProgressRecord, ProgressStoreError> {
        self.inner.load().await
    }

    async fn save(&self, record: &ProgressRecord) -> Result<(), ProgressStoreError> {
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(record).await
    }
}

struct Fixture {
    dir: TempDir,
}

impl Fixture {
    fn new(names: &[&str]) -> Self {
        let dir = tempdir().unwrap();
        std::fs::create_dir(dir.path().join("pieces")).unwrap();
        for name in names {
            std::fs::write(dir.path().join("pieces").join(name), b"payload").unwrap();
        }
        Fixture { dir }
    }

    fn source(&self) -> PieceSource {
        PieceSource::new(self.dir.path().join("pieces"))
    }

    fn progress_path(&self) -> std::path::PathBuf {
        self.dir.path().join("progress.json")
    }

    fn config(&self, batch_size: usize) -> RunConfig {
        RunConfig {
            concurrency: 2,
            batch_size,
            log_interval: 100,
            retry: RetryPolicy::disabled(),
            predicate: NamePredicate::default(),
            failure_log: self.dir.path().join("failures.json"),
        }
    }

    async fn load_record(&self, path: &Path) -> ProgressRecord {
        JsonProgressStore::new(path).load().await.unwrap()
    }
}

async fn run(
    fixture: &Fixture,
    client: Arc<ScriptedClient>,
    batch_size: usize,
) -> engine_runtime::report::RunSummary {
    let store = Arc::new(JsonProgressStore::new(fixture.progress_path()));
    executor::run(
        fixture.config(batch_size),
        fixture.source(),
        client,
        store,
        CancellationToken::new(),
    )
    .await
    .unwrap()
}

#[tokio::test]
async fn migrates_every_piece_and_records_them() {
    let fixture = Fixture::new(&["a", "b", "c", "d"]);
    let client = ScriptedClient::with(&[]);

    let summary = run(&fixture, client, 2).await;

    assert_eq!(summary.total, 4);
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.failed, 0);
    assert_eq!(summary.skipped, 0);
    assert!(!summary.interrupted);
    assert!(summary.failure_log.is_none());

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert_eq!(record.migrated_count, 4);
    assert_eq!(record.total_files, 4);
    for name in ["a", "b", "c", "d"] {
        assert!(record.contains(name));
    }
}

#[tokio::test]
async fn batches_run_strictly_in_enumeration_order() {
    let fixture = Fixture::new(&["a", "b", "c", "d"]);
    let client = ScriptedClient::with(&[]);

    run(&fixture, client.clone(), 2).await;

    // No piece of batch 2 may start before every piece of batch 1 finished.
    let calls = client.calls.lock().unwrap().clone();
    let position = |name: &str| calls.iter().position(|n| n == name).unwrap();
    let first_batch_last = position("a").max(position("b"));
    let second_batch_first = position("c").min(position("d"));
    assert!(first_batch_last < second_batch_first);
}

#[tokio::test]
async fn second_run_resubmits_nothing() {
    let fixture = Fixture::new(&["a", "b", "c", "d"]);
    let client = ScriptedClient::with(&[]);

    let first = run(&fixture, client.clone(), 2).await;
    let second = run(&fixture, client.clone(), 2).await;

    assert_eq!(first.completed, 4);
    assert_eq!(second.completed, 0);
    assert_eq!(second.skipped, 4);
    for name in ["a", "b", "c", "d"] {
        assert_eq!(client.calls_for(name), 1, "piece {name} resubmitted");
    }

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert_eq!(record.migrated_count, 4);
}

#[tokio::test]
async fn oversize_piece_is_skipped_and_never_retried() {
    let fixture = Fixture::new(&["a", "b", "c"]);
    let client = ScriptedClient::with(&[("b", Behavior::TooLarge)]);

    let summary = run(&fixture, client.clone(), 10).await;
    assert_eq!(summary.completed, 2);
    assert_eq!(summary.failed, 1);
    assert!(summary.failure_log.is_some());

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert!(record.contains("b"), "permanent skip is marked handled");

    let rerun = run(&fixture, client.clone(), 10).await;
    assert_eq!(rerun.skipped, 3);
    assert_eq!(client.calls_for("b"), 1, "skipped piece was retried");
}

#[tokio::test]
async fn transient_failure_is_retried_on_the_next_run() {
    let fixture = Fixture::new(&["a", "b", "c"]);
    let failing = ScriptedClient::with(&[("c", Behavior::Transient)]);

    let first = run(&fixture, failing, 10).await;
    assert_eq!(first.completed, 2);
    assert_eq!(first.failed, 1);

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert!(!record.contains("c"), "transient failure must stay unmarked");

    // The remote recovered; rerunning picks the piece up again.
    let healed = ScriptedClient::with(&[]);
    let second = run(&fixture, healed.clone(), 10).await;
    assert_eq!(second.completed, 1);
    assert_eq!(second.skipped, 2);
    assert_eq!(healed.calls_for("c"), 1);

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert_eq!(record.migrated_count, 3);
}

#[tokio::test]
async fn duplicate_report_counts_as_completed() {
    let fixture = Fixture::new(&["a", "b", "c", "d"]);
    let client = ScriptedClient::with(&[("d", Behavior::Duplicate)]);

    let summary = run(&fixture, client, 2).await;
    assert_eq!(summary.completed, 4);
    assert_eq!(summary.failed, 0);

    let record = fixture.load_record(&fixture.progress_path()).await;
    assert!(record.contains("d"));
}

#[tokio::test]
async fn checkpoints_after_every_batch() {
    let fixture = Fixture::new(&["a", "b", "c", "d", "e"]);
    let client = ScriptedClient::with(&[]);
    let store = Arc::new(CountingStore::new(fixture.progress_path()));

    executor::run(
        fixture.config(2),
        fixture.source(),
        client,
        store.clone(),
        CancellationToken::new(),
    )
    .await
    .unwrap();

    // Three batches of ≤2 pieces, one save each.
    assert_eq!(store.saves.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn cancelled_token_stops_before_the_first_batch() {
    let fixture = Fixture::new(&["a", "b"]);
    let client = ScriptedClient::with(&[]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let store = Arc::new(JsonProgressStore::new(fixture.progress_path()));
    let summary = executor::run(
        fixture.config(1),
        fixture.source(),
        client.clone(),
        store,
        cancel,
    )
    .await
    .unwrap();

    assert!(summary.interrupted);
    assert_eq!(summary.completed, 0);
    assert_eq!(client.calls_for("a"), 0);
    assert_eq!(client.calls_for("b"), 0);
}

#[tokio::test]
async fn failure_log_lists_each_failed_piece() {
    let fixture = Fixture::new(&["a", "b", "c"]);
    let client = ScriptedClient::with(&[
        ("a", Behavior::TooLarge),
        ("c", Behavior::Transient),
    ]);

    let summary = run(&fixture, client, 10).await;
    let path = summary.failure_log.expect("failure artifact expected");

    let records: Vec<model::stats::ErrorRecord> =
        serde_json::from_slice(&std::fs::read(path).unwrap()).unwrap();
    let mut files: Vec<&str> = records.iter().map(|r| r.file.as_str()).collect();
    files.sort();
    assert_eq!(files, vec!["a", "c"]);
}
