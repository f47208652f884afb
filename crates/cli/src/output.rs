use crate::error::CliError;
use engine_runtime::report::RunSummary;
use model::progress::ProgressRecord;

pub fn print_summary(summary: &RunSummary) {
    println!("Migration run '{}' finished:", summary.run_id);
    println!("-----------------------------");
    println!("{:<16} {}", "Total", summary.total);
    println!("{:<16} {}", "Completed", summary.completed);
    println!("{:<16} {}", "Failed", summary.failed);
    println!("{:<16} {}", "Skipped", summary.skipped);
    println!("{:<16} {:.1}s", "Duration", summary.duration_secs);
    println!(
        "{:<16} {:.1} pieces/min",
        "Throughput", summary.pieces_per_minute
    );
    if summary.interrupted {
        println!("{:<16} {}", "Interrupted", "yes (re-run to continue)");
    }
    if let Some(path) = &summary.failure_log {
        println!("{:<16} {}", "Failure log", path.display());
        println!("Transient failures are retried automatically on the next run.");
    }
}

pub fn print_summary_json(summary: &RunSummary) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(summary)?;
    println!("{json}");
    Ok(())
}

pub fn print_progress_record(path: &std::path::Path, record: &ProgressRecord) {
    println!("Progress record at '{}':", path.display());
    println!("-----------------------------");
    println!("{:<16} {}", "Last updated", record.last_updated.to_rfc3339());
    println!("{:<16} {}", "Total files", record.total_files);
    println!("{:<16} {}", "Migrated", record.migrated_count);
}

pub fn print_progress_json(record: &ProgressRecord) -> Result<(), CliError> {
    let json = serde_json::to_string_pretty(record)?;
    println!("{json}");
    Ok(())
}
