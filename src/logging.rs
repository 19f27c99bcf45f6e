//! File logging.
//!
//! The terminal belongs to the board, so log records go to a rotating file
//! in the profile's data directory. Records use a `event=... status=...`
//! key/value shape so they can be grepped.

use flexi_logger::{Cleanup, Criterion, FileSpec, Logger, LoggerHandle, Naming, WriteMode};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides `log_level` from the config file
pub const LOG_LEVEL_ENV: &str = "WORKLOG_LOG";
const LOG_FILE_BASENAME: &str = "worklog";
const MAX_LOG_FILE_SIZE_BYTES: u64 = 5 * 1024 * 1024;
const MAX_LOG_FILES: usize = 3;

#[derive(Debug, Error)]
pub enum LoggingError {
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error|off")]
    Level(String),
    #[error("failed to create log directory `{path}`: {source}")]
    Directory {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to start logger: {0}")]
    Start(#[from] flexi_logger::FlexiLoggerError),
}

/// Start file logging. Keep the returned handle alive for the process lifetime.
pub fn init_logging(configured_level: &str, log_dir: &Path) -> Result<LoggerHandle, LoggingError> {
    let requested = std::env::var(LOG_LEVEL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| configured_level.to_string());
    let level = normalize_level(&requested)?;

    std::fs::create_dir_all(log_dir).map_err(|source| LoggingError::Directory {
        path: log_dir.to_path_buf(),
        source,
    })?;

    let handle = Logger::try_with_str(level)?
        .log_to_file(
            FileSpec::default()
                .directory(log_dir)
                .basename(LOG_FILE_BASENAME),
        )
        .rotate(
            Criterion::Size(MAX_LOG_FILE_SIZE_BYTES),
            Naming::Numbers,
            Cleanup::KeepLogFiles(MAX_LOG_FILES),
        )
        .write_mode(WriteMode::BufferAndFlush)
        .append()
        .format_for_files(flexi_logger::detailed_format)
        .start()?;

    log::info!(
        "event=app_start status=ok version={} level={} log_dir={}",
        env!("CARGO_PKG_VERSION"),
        level,
        log_dir.display()
    );
    Ok(handle)
}

fn normalize_level(level: &str) -> Result<&'static str, LoggingError> {
    match level.trim().to_ascii_lowercase().as_str() {
        "trace" => Ok("trace"),
        "debug" => Ok("debug"),
        "info" => Ok("info"),
        "warn" | "warning" => Ok("warn"),
        "error" => Ok("error"),
        "off" => Ok("off"),
        other => Err(LoggingError::Level(other.to_string())),
    }
}
