//! Run logs and process-wide tracing.
//!
//! Each batch run gets its own `RunLogger` file (optionally echoed through a
//! callback). Library diagnostics go through `tracing`; the binary installs
//! the subscriber with `init_tracing_with_file`.
//!
//! # Example
//!
//! ```no_run
//! use abp_core::logging::{LogConfig, RunLogger};
//!
//! let logger = RunLogger::new("batch", "/path/to/logs", LogConfig::default(), None).unwrap();
//!
//! logger.phase("File 1/3: episode.mp3");
//! logger.command("ffmpeg", &["-i".into(), "input_0.mp3".into()]);
//! logger.progress(33);
//! logger.success("Run completed");
//! ```

mod run_logger;
mod types;

use std::path::Path;

pub use run_logger::{RunLogger, RunLoggerBuilder};
pub use types::{LogConfig, LogLevel, LogLineCallback, MessagePrefix};

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const APP_LOG_FILE: &str = "audio-batch.log";

fn env_filter(default_level: LogLevel) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level.as_filter()))
}

/// Install the global subscriber: stderr only. `RUST_LOG` wins over
/// `default_level`. Later calls are ignored.
pub fn init_tracing(default_level: LogLevel) {
    let _ = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .try_init();
}

/// Like `init_tracing`, plus a plain-text copy in `<logs_dir>/audio-batch.log`.
///
/// Hold the returned guard until exit or buffered lines are lost. Falls back
/// to stderr only when the folder cannot be created.
pub fn init_tracing_with_file(default_level: LogLevel, logs_dir: &Path) -> Option<WorkerGuard> {
    if let Err(e) = std::fs::create_dir_all(logs_dir) {
        init_tracing(default_level);
        tracing::warn!("Failed to create logs folder {}: {}", logs_dir.display(), e);
        return None;
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::never(logs_dir, APP_LOG_FILE));

    let _ = tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
        .with(fmt::layer().with_ansi(false).with_writer(file_writer))
        .try_init();

    Some(guard)
}
