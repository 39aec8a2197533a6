use std::path::PathBuf;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

pub const LOG_ENV: &str = "GNODRIVER_LOG";
pub const LOG_DIR_ENV: &str = "GNODRIVER_LOG_DIR";

/// Install the global subscriber.
///
/// Diagnostics always go to stderr since stdout carries the protocol. When
/// `GNODRIVER_LOG_DIR` is set, a daily rolling file named after `component`
/// is written as well; the returned guard must be kept alive until exit so
/// buffered lines get flushed.
pub fn init_logging(component: &str) -> Option<WorkerGuard> {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("info"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    let (file_layer, guard) = match std::env::var_os(LOG_DIR_ENV).filter(|v| !v.is_empty()) {
        Some(dir) => {
            let log_dir = PathBuf::from(dir);
            let _ = std::fs::create_dir_all(&log_dir);

            // e.g. gnopackagesdriver.2024-01-21
            let file_appender = tracing_appender::rolling::daily(&log_dir, component);
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(true);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A second call (tests, embedding) keeps the first subscriber.
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init();

    guard
}
