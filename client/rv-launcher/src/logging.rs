//! Logging setup with file rotation.

use crate::error::{LauncherError, Result as LauncherResult};

use rv_config::LoggingConfig;

use std::path::{Path, PathBuf};

use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{
    EnvFilter, fmt, prelude::__tracing_subscriber_SubscriberExt, util::SubscriberInitExt,
};

const LOG_FILE_PREFIX: &str = "roboview";
const LOG_FILE_SUFFIX: &str = "log";
const MAX_LOG_FILES: usize = 7;

/// Setup logging with console and rotating file output.
///
/// `RUST_LOG` overrides the configured level. Records emitted through the
/// `log` facade (configuration loading) are bridged into tracing.
pub fn setup_logging(config_dir: &Path, config: &LoggingConfig) -> LauncherResult<PathBuf> {
    let logs_dir = config_dir.join(&config.dir);
    std::fs::create_dir_all(&logs_dir)?;

    let console_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(true)
        .with_writer(std::io::stderr);

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .max_log_files(MAX_LOG_FILES)
        .filename_prefix(LOG_FILE_PREFIX)
        .filename_suffix(LOG_FILE_SUFFIX)
        .build(&logs_dir)
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    let file_layer = fmt::layer()
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_writer(file_appender);

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(filter_directive(config)));

    tracing_subscriber::registry()
        .with(filter)
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .map_err(|e| LauncherError::logging(e.to_string()))?;

    Ok(logs_dir)
}

/// Default filter: the configured level for everything, including the
/// `backend` target carrying child process output.
pub fn filter_directive(config: &LoggingConfig) -> String {
    let level = config.level.as_directive();
    format!("{level},backend={level}")
}

/// Path of today's log file.
pub fn current_log_path(logs_dir: &Path) -> PathBuf {
    let today = chrono::Local::now().format("%Y-%m-%d");
    logs_dir.join(format!("{LOG_FILE_PREFIX}.{today}.{LOG_FILE_SUFFIX}"))
}
