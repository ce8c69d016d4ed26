//! Logging setup
//!
//! Console output goes to stderr, filtered by `RUST_LOG` or the `-v` count.
//! Headless runs also append to a log file because nobody watches the
//! console of a scheduled task.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{fmt, EnvFilter};

/// Name of the headless run log inside the log directory
pub const LOG_FILE_NAME: &str = "snapmirror.log";

/// Keeps the background log writer alive; drop it to flush
pub struct LogGuard {
    _file: Option<WorkerGuard>,
}

/// Default console level for a `-v` count
pub fn console_level(verbosity: u8) -> &'static str {
    match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

/// Install the global subscriber
///
/// When `log_dir` is given, `info` and above are also appended to
/// `<log_dir>/snapmirror.log`.
pub fn init(verbosity: u8, log_dir: Option<&Path>) -> LogGuard {
    let console_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(console_level(verbosity)));

    let console = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let appender = log_dir.and_then(|dir| {
        RollingFileAppender::builder()
            .rotation(Rotation::NEVER)
            .filename_prefix(LOG_FILE_NAME)
            .build(dir)
            .map_err(|e| eprintln!("warning: file logging disabled: {}", e))
            .ok()
    });

    let (file, guard) = match appender {
        Some(appender) => {
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer()
                .with_writer(writer)
                .with_ansi(false)
                .with_filter(LevelFilter::INFO);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    // A second init (e.g. from an embedding program) keeps the first subscriber
    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();

    LogGuard { _file: guard }
}
