use crate::{
    enumerate,
    error::MigrationError,
    pool,
    report::{self, RunSummary},
};
use connectors::{
    remote::StorageClient,
    source::{NamePredicate, PieceSource},
};
use engine_core::{progress::ProgressStore, retry::RetryPolicy};
use model::{
    outcome::{PieceReport, UploadOutcome},
    progress::ProgressRecord,
    stats::RunStats,
};
use std::{path::PathBuf, sync::Arc, time::Instant};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use uuid::Uuid;

/// Engine-level settings, resolved by the caller before the run starts.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub concurrency: usize,
    pub batch_size: usize,
    /// Completions between periodic progress lines.
    pub log_interval: u64,
    pub retry: RetryPolicy,
    pub predicate: NamePredicate,
    pub failure_log: PathBuf,
}

pub async fn run(
    config: RunConfig,
    source: PieceSource,
    client: Arc<dyn StorageClient>,
    store: Arc<dyn ProgressStore>,
    cancel: CancellationToken,
) -> Result<RunSummary, MigrationError> {
    MigrationExecutor::new(config, source, client, store, cancel)
        .execute()
        .await
}

/// Drives one run: enumerate, then upload batch-by-batch with a checkpoint
/// after each, then report. The executor owns the statistics and is the
/// only writer of the progress record; workers hand their outcomes back
/// and everything is folded on this single control-flow task.
struct MigrationExecutor {
    run_id: String,
    config: RunConfig,
    source: PieceSource,
    client: Arc<dyn StorageClient>,
    store: Arc<dyn ProgressStore>,
    cancel: CancellationToken,
    last_logged: u64,
}

impl MigrationExecutor {
    fn new(
        config: RunConfig,
        source: PieceSource,
        client: Arc<dyn StorageClient>,
        store: Arc<dyn ProgressStore>,
        cancel: CancellationToken,
    ) -> Self {
        Self {
            run_id: format!("run-{}", Uuid::new_v4()),
            config,
            source,
            client,
            store,
            cancel,
            last_logged: 0,
        }
    }

    async fn execute(mut self) -> Result<RunSummary, MigrationError> {
        let started = Instant::now();
        info!(
            run_id = %self.run_id,
            source = %self.source.root().display(),
            "Starting piece migration"
        );

        let mut progress = self.store.load().await?;
        let work = enumerate::discover(&self.source, &self.config.predicate, &progress).await?;
        progress.set_total_files(work.total as u64);

        let mut stats = RunStats::new(work.total as u64, work.already_migrated as u64);

        if work.pending.is_empty() {
            info!(
                total = work.total,
                "Nothing to migrate, every candidate is already handled"
            );
            self.store.save(&progress).await?;
            return Ok(report::summarize(&self.run_id, &stats, started.elapsed(), false));
        }

        info!(
            total = work.total,
            pending = work.pending.len(),
            already_migrated = work.already_migrated,
            batch_size = self.config.batch_size,
            concurrency = self.config.concurrency,
            "Enumerated source"
        );

        let batches: Vec<&[String]> = work.pending.chunks(self.config.batch_size.max(1)).collect();
        let batch_count = batches.len();
        let mut interrupted = false;

        for (idx, batch) in batches.into_iter().enumerate() {
            // Shutdown is honored at batch boundaries only; the in-flight
            // batch always drains to terminal outcomes first.
            if self.cancel.is_cancelled() {
                warn!(
                    batch = idx + 1,
                    batches = batch_count,
                    "Shutdown requested, stopping before the next batch"
                );
                interrupted = true;
                break;
            }

            let reports = pool::run_batch(
                batch,
                &self.source,
                self.client.as_ref(),
                self.config.concurrency,
                &self.config.retry,
            )
            .await;
            self.fold(reports, &mut stats, &mut progress);

            // Checkpoint: the sole resumability guarantee. At most one
            // batch of work can be lost on an uncontrolled crash.
            self.store.save(&progress).await?;

            self.log_progress(idx + 1, batch_count, &stats, started);
        }

        if interrupted {
            // Flush once more so the record carries the shutdown timestamp.
            self.store.save(&progress).await?;
        }

        let mut summary = report::summarize(&self.run_id, &stats, started.elapsed(), interrupted);
        summary.failure_log =
            report::write_failure_log(&self.config.failure_log, &stats.errors).await?;
        Ok(summary)
    }

    /// Folds one batch's outcomes into the statistics and progress record.
    fn fold(
        &self,
        reports: Vec<PieceReport>,
        stats: &mut RunStats,
        progress: &mut ProgressRecord,
    ) {
        for report in reports {
            match &report.outcome {
                UploadOutcome::Stored(cid) => {
                    stats.completed += 1;
                    progress.mark_migrated(&report.name);
                    info!(piece = %report.name, cid = %cid, "Piece stored");
                }
                UploadOutcome::Duplicate => {
                    stats.completed += 1;
                    progress.mark_migrated(&report.name);
                    info!(piece = %report.name, "Remote already held the piece, counted as completed");
                }
                UploadOutcome::PermanentSkip(error) => {
                    stats.record_failure(&report.name, error);
                    progress.mark_migrated(&report.name);
                    warn!(piece = %report.name, error, "Piece skipped permanently, operator action required");
                }
                UploadOutcome::Transient(error) => {
                    stats.record_failure(&report.name, error);
                }
            }
        }
    }

    fn log_progress(&mut self, batch: usize, batches: usize, stats: &RunStats, started: Instant) {
        let processed = stats.processed();
        let due = processed / self.config.log_interval.max(1);
        if due == self.last_logged && batch != batches {
            return;
        }
        self.last_logged = due;

        let elapsed = started.elapsed().as_secs_f64();
        let rate = if elapsed > 0.0 {
            processed as f64 / elapsed
        } else {
            0.0
        };
        let remaining = stats.total - stats.skipped - processed;
        let eta_secs = if rate > 0.0 {
            remaining as f64 / rate
        } else {
            0.0
        };

        info!(
            batch,
            batches,
            completed = stats.completed,
            failed = stats.failed,
            per_minute = format!("{:.1}", rate * 60.0),
            eta_secs = format!("{:.0}", eta_secs),
            "Progress"
        );
    }
}
