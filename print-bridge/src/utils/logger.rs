//! Logging Infrastructure
//!
//! `tracing` subscriber setup: stdout by default, daily rolling files when a
//! log directory is configured.

use std::path::Path;
use tracing_subscriber::EnvFilter;

const DEFAULT_FILTER: &str = "print_bridge=info,tower_http=info";

/// Initialize the logger from `RUST_LOG`, falling back to [`DEFAULT_FILTER`]
pub fn init_logger() {
    init_logger_with_file(None, None);
}

/// Initialize the logger with an optional level override and file output
///
/// The returned guard must be held for the lifetime of the process when
/// file output is active, otherwise buffered lines are lost.
pub fn init_logger_with_file(
    log_level: Option<&str>,
    log_dir: Option<&str>,
) -> Option<tracing_appender::non_blocking::WorkerGuard> {
    let filter = match log_level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_file(false)
        .with_line_number(false)
        .with_thread_ids(false)
        .with_target(false);

    if let Some(dir) = log_dir {
        let log_path = Path::new(dir);
        if log_path.exists() {
            let file_appender = tracing_appender::rolling::daily(log_path, "print-bridge");
            let (writer, guard) = tracing_appender::non_blocking(file_appender);
            let _ = subscriber.with_ansi(false).with_writer(writer).try_init();
            return Some(guard);
        }
        eprintln!("LOG_DIR {dir} does not exist, logging to stdout");
    }

    let _ = subscriber.try_init();
    None
}
