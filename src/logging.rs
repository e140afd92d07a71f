//! Tracing subscriber setup for the host binary.
//!
//! Console output always goes to stderr. With `file_logging` enabled a
//! daily rolling file is written under [`crate::app_dirs::logs_dir`].

use std::path::Path;

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::LoggingConfig;
use crate::error::{Result, ScreenwiseError};

const LOG_PREFIX: &str = "screenwise";
const MAX_LOG_FILES: usize = 5;

/// `RUST_LOG` wins; otherwise the configured default, with noisy HTTP
/// internals capped at `warn`.
fn env_filter(config: &LoggingConfig) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{},hyper=warn,reqwest=warn,rustls=warn",
            config.default_filter
        ))
    })
}

fn file_appender(dir: &Path) -> Result<RollingFileAppender> {
    std::fs::create_dir_all(dir)?;
    RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix(LOG_PREFIX)
        .filename_suffix("log")
        .max_log_files(MAX_LOG_FILES)
        .build(dir)
        .map_err(|e| ScreenwiseError::Config(format!("cannot create log file appender: {e}")))
}

/// Install the global subscriber.
///
/// # Errors
///
/// Fails if the log directory cannot be created or a subscriber is
/// already installed.
pub fn init(config: &LoggingConfig) -> Result<()> {
    let file_layer = if config.file_logging {
        let appender = file_appender(&crate::app_dirs::logs_dir())?;
        Some(
            fmt::layer()
                .with_writer(appender)
                .with_ansi(false)
                .with_target(true)
                .with_line_number(true),
        )
    } else {
        None
    };

    let console_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .compact();

    tracing_subscriber::registry()
        .with(env_filter(config))
        .with(file_layer)
        .with(console_layer)
        .try_init()
        .map_err(|e| ScreenwiseError::Config(format!("tracing already initialised: {e}")))
}
