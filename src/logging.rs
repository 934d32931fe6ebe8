//! Log file setup.
//!
//! Every run appends to one log file. Lines carry a timestamp, level, target
//! (the logger name) and message; nothing goes to the terminal unless
//! `--verbose` mirrors it to stderr. `RUST_LOG` replaces the configured level
//! when set.

use crate::config::LogLevel;
use std::fs::OpenOptions;
use std::io;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes buffered lines and closes the log file.
pub struct LoggingGuard {
    _file_guard: WorkerGuard,
}

/// Filter directive for a configured level.
///
/// Our own events use `level`; dependencies (HTTP, TLS, HTML parsing) are held
/// at `warn` so a debug log stays readable.
#[must_use]
pub fn filter_directive(level: LogLevel) -> String {
    let dependencies = if level == LogLevel::Error { "error" } else { "warn" };
    format!("{dependencies},addon_updater={level}")
}

/// Opens `log_file` for appending and installs the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file (or its parent directory) cannot be
/// created, or if a global subscriber is already installed.
pub fn init_logging(log_file: &Path, level: LogLevel, mirror_to_stderr: bool) -> io::Result<LoggingGuard> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(log_file)?;
    let (non_blocking_file, file_guard) = tracing_appender::non_blocking(file);

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false)
        .with_target(true);

    let stderr_layer = mirror_to_stderr.then(|| {
        tracing_subscriber::fmt::layer().with_writer(io::stderr).with_target(true)
    });

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(level)));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}
