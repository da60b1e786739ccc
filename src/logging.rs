//! `tracing` subscriber setup for the newswire binary.
//!
//! Events always go to stderr so that stdout stays clean for results and
//! `--json` output. When a log directory is configured, events are also
//! written to a daily rolling `newswire.log` in that directory.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{NewswireError, Result};

/// Filter used when neither `RUST_LOG` nor `[logging] filter` is set.
pub const DEFAULT_FILTER: &str = "newswire=info,newswire_search=info";

const LOG_FILE_NAME: &str = "newswire.log";

/// Resolve the effective filter directives.
///
/// `RUST_LOG` wins, then the configured filter, then [`DEFAULT_FILTER`].
pub fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let directives = config.filter.as_deref().unwrap_or(DEFAULT_FILTER);
        EnvFilter::try_new(directives).unwrap_or_else(|e| {
            eprintln!("invalid log filter '{directives}': {e}; using {DEFAULT_FILTER}");
            EnvFilter::new(DEFAULT_FILTER)
        })
    })
}

/// Install the global subscriber.
///
/// Returns the file writer's guard when file logging is enabled; keep it
/// alive until exit so buffered lines are flushed.
///
/// # Errors
///
/// Returns an error if the log directory cannot be created or a global
/// subscriber is already installed.
pub fn init(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let filter = env_filter(config);
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);

    match config.directory.as_deref() {
        Some(dir) => {
            let (writer, guard) = file_writer(dir)?;
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .with(fmt::layer().with_writer(writer).with_ansi(false))
                .try_init()
                .map_err(|e| NewswireError::Config(format!("tracing setup failed: {e}")))?;
            Ok(Some(guard))
        }
        None => {
            tracing_subscriber::registry()
                .with(filter)
                .with(stderr_layer)
                .try_init()
                .map_err(|e| NewswireError::Config(format!("tracing setup failed: {e}")))?;
            Ok(None)
        }
    }
}

fn file_writer(dir: &Path) -> Result<(tracing_appender::non_blocking::NonBlocking, WorkerGuard)> {
    std::fs::create_dir_all(dir)?;
    let appender = tracing_appender::rolling::daily(dir, LOG_FILE_NAME);
    Ok(tracing_appender::non_blocking(appender))
}
