//! Logging setup for the `loanprep` binary
//!
//! Logs always go to stderr. When a log directory is configured, a daily
//! rolling `loanprep.<date>.log` file receives the same events without ANSI
//! colour codes.
//!
//! ```no_run
//! use std::path::Path;
//!
//! loanprep::logging::init(Some(Path::new("logs")))?;
//! tracing::info!("ready");
//! # Ok::<(), anyhow::Error>(())
//! ```

use anyhow::{Context as _, Result};
use std::path::Path;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, Layer as _, fmt, layer::SubscriberExt as _, util::SubscriberInitExt as _,
};

/// Log files kept before the oldest is removed.
const MAX_LOG_FILES: usize = 10;

/// Build the level filter: `RUST_LOG` when set, `info` otherwise.
fn env_filter() -> Result<EnvFilter> {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .context("Failed to create env filter")
}

/// Initializes console logging and, if `log_dir` is given, a rolling file.
///
/// # Errors
///
/// Returns error if the log directory cannot be created, the file appender
/// fails, or a global subscriber is already installed.
pub fn init(log_dir: Option<&Path>) -> Result<()> {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    let file_layer = match log_dir {
        Some(dir) => {
            std::fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;

            let appender = RollingFileAppender::builder()
                .rotation(Rotation::DAILY)
                .max_log_files(MAX_LOG_FILES)
                .filename_prefix("loanprep")
                .filename_suffix("log")
                .build(dir)
                .context("Failed to create log file appender")?;

            Some(
                fmt::layer()
                    .with_target(true)
                    .with_line_number(true)
                    .with_file(true)
                    .with_ansi(false)
                    .with_writer(appender)
                    .boxed(),
            )
        }
        None => None,
    };

    tracing_subscriber::registry()
        .with(env_filter()?)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    if let Some(dir) = log_dir {
        tracing::debug!(log_dir = %dir.display(), "Logging initialized");
    }
    Ok(())
}
