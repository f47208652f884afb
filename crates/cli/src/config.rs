use crate::{env::EnvMap, error::CliError};
use connectors::source::NamePredicate;
use engine_core::retry::RetryPolicy;
use engine_runtime::executor::RunConfig;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_CONCURRENCY: usize = 12;
const DEFAULT_BATCH_SIZE: usize = 64;
/// The remote protocol's per-call ceiling; batches never exceed it.
const MAX_BATCH_SIZE: usize = 100;
const DEFAULT_LOG_INTERVAL: u64 = 25;
const DEFAULT_FAILURE_LOG: &str = "piecehaul-failures.json";

/// Full configuration of a migration run, resolved from the environment
/// before anything else happens.
#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub source_dir: PathBuf,
    pub endpoint: String,
    pub address: String,
    pub concurrency: usize,
    pub batch_size: usize,
    pub log_interval: u64,
    pub upload_retries: usize,
    pub progress_file: PathBuf,
    pub failure_log: PathBuf,
    pub name_prefix: Option<String>,
    pub name_suffix: Option<String>,
}

impl MigrationConfig {
    pub fn resolve(env: &EnvMap) -> Result<Self, CliError> {
        let batch_size: usize = parsed(env, "PIECEHAUL_BATCH_SIZE", DEFAULT_BATCH_SIZE)?;
        if batch_size == 0 {
            return Err(CliError::Config(
                "PIECEHAUL_BATCH_SIZE must be at least 1".into(),
            ));
        }

        Ok(MigrationConfig {
            source_dir: required(env, "PIECEHAUL_SOURCE_DIR")?.into(),
            endpoint: required(env, "PIECEHAUL_ENDPOINT")?,
            address: required(env, "PIECEHAUL_ADDRESS")?,
            concurrency: parsed(env, "PIECEHAUL_CONCURRENCY", DEFAULT_CONCURRENCY)?.max(1),
            batch_size: batch_size.min(MAX_BATCH_SIZE),
            log_interval: parsed(env, "PIECEHAUL_LOG_INTERVAL", DEFAULT_LOG_INTERVAL)?,
            upload_retries: parsed(env, "PIECEHAUL_UPLOAD_RETRIES", 0)?,
            progress_file: progress_file(env)?,
            failure_log: env
                .get("PIECEHAUL_FAILURE_LOG")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_FAILURE_LOG)),
            name_prefix: env.get("PIECEHAUL_NAME_PREFIX").map(str::to_string),
            name_suffix: env.get("PIECEHAUL_NAME_SUFFIX").map(str::to_string),
        })
    }

    pub fn run_config(&self) -> RunConfig {
        let retry = if self.upload_retries == 0 {
            RetryPolicy::disabled()
        } else {
            RetryPolicy::with_extra_attempts(self.upload_retries)
        };

        RunConfig {
            concurrency: self.concurrency,
            batch_size: self.batch_size,
            log_interval: self.log_interval,
            retry,
            predicate: NamePredicate::new(self.name_prefix.clone(), self.name_suffix.clone()),
            failure_log: self.failure_log.clone(),
        }
    }
}

/// Progress-record location; also used by the read-only `progress`
/// subcommand, which needs no other configuration.
pub fn progress_file(env: &EnvMap) -> Result<PathBuf, CliError> {
    if let Some(path) = env.get("PIECEHAUL_PROGRESS_FILE") {
        return Ok(PathBuf::from(path));
    }

    dirs::home_dir()
        .map(|home| home.join(".piecehaul").join("progress.json"))
        .ok_or_else(|| {
            CliError::Config(
                "Could not determine home directory; set PIECEHAUL_PROGRESS_FILE".into(),
            )
        })
}

fn required(env: &EnvMap, key: &str) -> Result<String, CliError> {
    env.get(key)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
        .ok_or_else(|| CliError::Config(format!("{key} must be set")))
}

fn parsed<T>(env: &EnvMap, key: &str, default: T) -> Result<T, CliError>
where
    T: FromStr,
    T::Err: Display,
{
    match env.get(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|err| CliError::Config(format!("Invalid {key} '{raw}': {err}"))),
    }
}
