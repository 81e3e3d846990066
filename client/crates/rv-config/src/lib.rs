mod backend_config;
mod config;
mod config_discovery;
mod endpoint_config;
mod error;
mod log_level;
mod logging_config;
mod project_config;
mod startup_config;

#[cfg(test)]
mod tests;

pub use backend_config::BackendConfig;
pub use config::Config;
pub use config_discovery::LintConfigDiscovery;
pub use endpoint_config::EndpointConfig;
pub use error::{ConfigError, ConfigErrorResult};
pub use log_level::LogLevel;
pub use logging_config::LoggingConfig;
pub use project_config::ProjectConfig;
pub use startup_config::StartupConfig;

const DEFAULT_CONFIG_DIR: &str = ".roboview";
const CONFIG_FILENAME: &str = "config.toml";
const CONFIG_DIR_ENV: &str = "RV_CONFIG_DIR";

const DEFAULT_PROGRAM: &str = "python";
const DEFAULT_MODULE: &str = "roboview.main";
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api/v1/system";

const DEFAULT_LOG_LEVEL_STRING: &str = "info";
const DEFAULT_LOG_LEVEL: log::LevelFilter = log::LevelFilter::Info;
const DEFAULT_LOG_DIRECTORY: &str = "logs";

const LINT_CONFIG_ENV_FILE: &str = ".env";
const LINT_CONFIG_ENV_KEY: &str = "ROBOCOP_CONFIG_PATH";
