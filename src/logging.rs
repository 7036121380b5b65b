//! Logging setup for the bridge binary.
//!
//! Console output always, plus a daily rolling file when a log directory is
//! configured. `RUST_LOG` overrides the configured level.

use std::fs;
use std::io;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// File name prefix of the rolling log files
pub const LOG_FILE_PREFIX: &str = "hitl-bridge.log";

/// Keeps the file writer alive; dropping it flushes pending log lines
#[derive(Debug)]
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter seeded from `RUST_LOG`, falling back to the configured level
pub fn env_filter(level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level))
}

/// Install the global tracing subscriber
///
/// # Errors
///
/// Returns error if the log directory cannot be created
pub fn init_logging(config: &LoggingConfig) -> io::Result<LoggingGuard> {
    let stdout_layer = tracing_subscriber::fmt::layer().with_writer(io::stdout);

    let (file_layer, file_guard) = if config.log_dir.is_empty() {
        (None, None)
    } else {
        fs::create_dir_all(&config.log_dir)?;
        let appender = tracing_appender::rolling::daily(&config.log_dir, LOG_FILE_PREFIX);
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    };

    tracing_subscriber::registry()
        .with(env_filter(&config.level))
        .with(stdout_layer)
        .with(file_layer)
        .init();

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
