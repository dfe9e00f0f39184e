//! Logging setup.
//!
//! The TUI owns the terminal, so interactive runs log to a file or nowhere.
//! Export mode logs to stderr. `RUST_LOG` overrides the default filter.

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "crewwatch=info";

/// Where log lines go.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LogTarget {
    /// Append to a file.
    File(PathBuf),
    /// Write to stderr.
    Stderr,
    /// Drop everything.
    #[default]
    Disabled,
}

impl LogTarget {
    /// Log file when given, otherwise nothing (the TUI owns stdout and stderr).
    pub fn for_tui(log_file: Option<PathBuf>) -> Self {
        log_file.map(LogTarget::File).unwrap_or(LogTarget::Disabled)
    }
}

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install the global subscriber. Calling it again is a no-op.
pub fn init_logging(target: LogTarget) -> Result<()> {
    match target {
        LogTarget::Disabled => Ok(()),
        LogTarget::Stderr => {
            let subscriber = tracing_subscriber::registry().with(env_filter()).with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_file(false)
                    .with_line_number(false),
            );
            let _ = subscriber.try_init();
            Ok(())
        }
        LogTarget::File(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(&path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            let subscriber = tracing_subscriber::registry().with(env_filter()).with(
                fmt::layer()
                    .with_writer(Mutex::new(file))
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(false),
            );
            let _ = subscriber.try_init();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tui_target() {
        assert_eq!(LogTarget::for_tui(None), LogTarget::Disabled);
        assert_eq!(
            LogTarget::for_tui(Some(PathBuf::from("crewwatch.log"))),
            LogTarget::File(PathBuf::from("crewwatch.log"))
        );
    }

    #[test]
    fn test_init_logging_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("crewwatch.log");
        init_logging(LogTarget::File(path.clone())).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn test_unwritable_log_file_is_an_error() {
        let result = init_logging(LogTarget::File(PathBuf::from("/nonexistent/dir/x.log")));
        assert!(result.is_err());
    }

    #[test]
    fn test_init_logging_disabled_does_not_panic() {
        init_logging(LogTarget::Disabled).unwrap();
        init_logging(LogTarget::Stderr).unwrap();
    }
}
