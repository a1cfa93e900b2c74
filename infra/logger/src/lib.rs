//! # Logger
//!
//! Installs the global `tracing` subscriber for binaries that embed the secman store.
//! The library crates only emit events; this crate decides where they go.
//!
//! * Console output in a compact, pretty or JSON format.
//! * Optional rolling log files written through a non-blocking worker.
//! * Filtering through `RUST_LOG`, or explicit directives set with
//!   [`LoggerBuilder::env_filter`].
//!
//! The store never logs secret values or key material, so no output needs scrubbing.
//!
//! ## Example
//!
//! ```rust
//! use secman_logger::{LevelFilter, Logger};
//!
//! let _logger = Logger::builder()
//!     .name("secman")
//!     .level(LevelFilter::DEBUG)
//!     .init()
//!     .unwrap();
//! ```

mod builder;
mod error;

pub use crate::builder::{LoggerBuilder, NoDirectory, NoName, WithDirectory, WithName};
pub use crate::error::{LoggerError, LoggerErrorExt};
pub use tracing::level_filters::LevelFilter;
pub use tracing_appender::rolling::Rotation;

use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;

/// Console output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Compact,
    Pretty,
    Json,
}

/// A handle to the installed logging system.
///
/// Holds the file writer's worker guard, if any. Drop it only on shutdown.
#[must_use = "Dropping this handle will stop background logging threads."]
#[derive(Debug)]
pub struct Logger {
    name: String,
    guard: Option<WorkerGuard>,
}

impl Logger {
    /// Returns a new [`LoggerBuilder`].
    #[must_use = "The builder must be configured before it can be used to initialize the logger."]
    pub fn builder() -> LoggerBuilder {
        LoggerBuilder::new()
    }

    pub(crate) const fn new(name: String, guard: Option<WorkerGuard>) -> Self {
        Self { name, guard }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if logs are also written to files.
    #[must_use]
    pub const fn is_file_backed(&self) -> bool {
        self.guard.is_some()
    }
}

impl Drop for Logger {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::info!(logger = %self.name, "Logging system shutting down, flushing buffers");
        }
    }
}

/// Parses a level name such as `"debug"` or `"off"`, case-insensitively.
///
/// # Errors
/// Returns [`LoggerError::InvalidConfiguration`] for an unknown level.
pub fn parse_level(level: &str) -> Result<LevelFilter, LoggerError> {
    LevelFilter::from_str(level.trim()).map_err(|e| LoggerError::InvalidConfiguration {
        message: format!("Invalid log level '{level}': {e}").into(),
        context: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::fs;
    use std::time::Duration;
    use tempfile::tempdir;

    #[test]
    fn test_parse_level() {
        assert_eq!(parse_level("debug").unwrap(), LevelFilter::DEBUG);
        assert_eq!(parse_level(" WARN ").unwrap(), LevelFilter::WARN);
        assert_eq!(parse_level("off").unwrap(), LevelFilter::OFF);
        assert!(matches!(parse_level("loud"), Err(LoggerError::InvalidConfiguration { .. })));
    }

    #[test]
    #[serial]
    fn test_file_logging_setup() -> Result<(), Box<dyn std::error::Error>> {
        let tmp_dir = tempdir()?;
        let log_dir = tmp_dir.path().join("logs");

        let logger = Logger::builder()
            .name("secman-test")
            .console(false)
            .directory(&log_dir)
            .level(LevelFilter::INFO)
            .init()?;
        assert!(logger.is_file_backed());
        assert_eq!(logger.name(), "secman-test");

        tracing::info!("hello world");
        std::thread::sleep(Duration::from_millis(30));
        drop(logger);

        let has_log = fs::read_dir(&log_dir)?
            .flatten()
            .any(|entry| entry.path().extension().and_then(|e| e.to_str()) == Some("log"));
        assert!(has_log, "at least one log file should be created");
        Ok(())
    }
}
