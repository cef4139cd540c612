// Rust guideline compliant 2026-02-09

//! Tracing setup for the CLI.
//!
//! Logs are JSON lines on stderr, or in a file when one is given. Stdout
//! carries only the response envelope.

use anyhow::{bail, Context, Result};
use std::fs::OpenOptions;
use std::path::Path;
use tracing::{warn, Level};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::fmt;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

/// Installs the global subscriber.
///
/// If a subscriber is already installed it is kept and a warning is logged
/// through it.
///
/// # Arguments
///
/// * `log_level` - One of error, warn, info, debug, trace
/// * `log_file` - Optional file receiving the logs
///
/// # Returns
///
/// The guard flushing the file writer; keep it alive until exit.
///
/// # Errors
///
/// Returns an error if the level is unknown or the file cannot be opened.
pub fn init_tracing(log_level: &str, log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let level = parse_log_level(log_level)?;

    let (writer, guard) = match log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let (writer, guard) = tracing_appender::non_blocking(file);
            (BoxMakeWriter::new(writer), Some(guard))
        }
        None => (BoxMakeWriter::new(std::io::stderr), None),
    };

    let subscriber = fmt()
        .with_max_level(level)
        .with_target(false)
        .json()
        .with_writer(writer)
        .finish();
    if let Err(err) = tracing::subscriber::set_global_default(subscriber) {
        warn!(error = %err, "tracing subscriber already installed, keeping it");
    }
    Ok(guard)
}

/// Parses a log level name.
///
/// # Errors
///
/// Returns an error for unknown names.
pub fn parse_log_level(level: &str) -> Result<Level> {
    match level.to_lowercase().as_str() {
        "error" => Ok(Level::ERROR),
        "warn" => Ok(Level::WARN),
        "info" => Ok(Level::INFO),
        "debug" => Ok(Level::DEBUG),
        "trace" => Ok(Level::TRACE),
        other => bail!("Invalid log level '{other}', expected error|warn|info|debug|trace"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_log_level() {
        assert_eq!(parse_log_level("WARN").unwrap(), Level::WARN);
        assert_eq!(parse_log_level("trace").unwrap(), Level::TRACE);
        assert!(parse_log_level("loud").is_err());
    }

    #[test]
    fn test_second_init_keeps_installed_subscriber() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let log_path = temp_dir.path().join("tabula.log");

        assert!(init_tracing("info", None).is_ok());
        let guard = init_tracing("debug", Some(&log_path)).unwrap();
        assert!(guard.is_some());
        assert!(log_path.exists());
    }
}
