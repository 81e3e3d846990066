use crate::{
    BackendConfig, CONFIG_DIR_ENV, CONFIG_FILENAME, ConfigError, ConfigErrorResult,
    DEFAULT_CONFIG_DIR, EndpointConfig, LoggingConfig, ProjectConfig, StartupConfig,
};

use std::path::{Path, PathBuf};

use log::info;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub backend: BackendConfig,
    pub endpoint: EndpointConfig,
    pub startup: StartupConfig,
    pub project: ProjectConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load config from the default config directory.
    ///
    /// Loading order:
    /// 1. Check for RV_CONFIG_DIR env var, else use ./.roboview/
    /// 2. Auto-create config directory if it doesn't exist
    /// 3. Load config.toml if it exists, else use defaults
    /// 4. Apply RV_* environment variable overrides
    ///
    /// Does NOT validate - call validate() after load().
    pub fn load() -> ConfigErrorResult<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from_dir(&config_dir)
    }

    /// Same as [`Config::load`] but with an explicit config directory.
    pub fn load_from_dir(config_dir: &Path) -> ConfigErrorResult<Self> {
        if !config_dir.exists() {
            std::fs::create_dir_all(config_dir).map_err(|e| ConfigError::Io {
                path: config_dir.to_path_buf(),
                source: e,
            })?;
        }

        let config_path = config_dir.join(CONFIG_FILENAME);

        let mut config = if config_path.exists() {
            Self::load_toml(&config_path)?
        } else {
            Config::default()
        };

        config.apply_env_overrides();

        Ok(config)
    }

    /// Load and parse TOML file with detailed error context.
    fn load_toml(path: &Path) -> ConfigErrorResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;

        toml::from_str(&contents).map_err(|e| ConfigError::Toml {
            path: path.to_path_buf(),
            source: e,
        })
    }

    /// Get the config directory.
    /// Priority: RV_CONFIG_DIR env var > ./.roboview/ (relative to cwd)
    pub fn config_dir() -> ConfigErrorResult<PathBuf> {
        if let Ok(dir) = std::env::var(CONFIG_DIR_ENV) {
            return Ok(PathBuf::from(dir));
        }

        let cwd = std::env::current_dir()
            .map_err(|_| ConfigError::config("Cannot determine current working directory"))?;
        Ok(cwd.join(DEFAULT_CONFIG_DIR))
    }

    /// Validate all configuration.
    /// Call after load() to catch all errors at startup.
    pub fn validate(&self) -> ConfigErrorResult<()> {
        self.backend.validate()?;
        self.endpoint.validate()?;
        self.startup.validate()?;
        self.project.validate()?;

        let log_dir = Path::new(&self.logging.dir);
        if log_dir.is_absolute() || self.logging.dir.contains("..") {
            return Err(ConfigError::config(
                "logging.dir must be relative and cannot contain '..'",
            ));
        }

        Ok(())
    }

    /// Directory the backend process is started in.
    ///
    /// Explicit `backend.working_dir` wins, then the project root.
    pub fn backend_working_dir(&self) -> Option<PathBuf> {
        self.backend
            .working_dir
            .clone()
            .or_else(|| self.project.root_dir.clone())
    }

    /// Log configuration summary.
    pub fn log_summary(&self) {
        info!("Configuration loaded:");
        info!(
            "  backend: {} {}",
            self.backend.program,
            self.backend.args.join(" ")
        );
        info!("  endpoint: {}", self.endpoint.base_url);
        info!(
            "  startup: timeout={}s, poll={}ms, probe={}ms, initialize={}s, kill_grace={}ms",
            self.startup.startup_timeout_secs,
            self.startup.poll_interval_ms,
            self.startup.probe_timeout_ms,
            self.startup.initialize_timeout_secs,
            self.startup.kill_grace_ms
        );
        match self.project.root_dir {
            Some(ref root) => info!("  project: {}", root.display()),
            None => info!("  project: <not set>"),
        }
        info!("  logging: {} (dir: {})", *self.logging.level, self.logging.dir);
    }

    fn apply_env_overrides(&mut self) {
        // Backend
        Self::apply_env_string("RV_BACKEND_PROGRAM", &mut self.backend.program);
        Self::apply_env_option_path("RV_BACKEND_WORKING_DIR", &mut self.backend.working_dir);

        // Endpoint
        Self::apply_env_string("RV_ENDPOINT_BASE_URL", &mut self.endpoint.base_url);

        // Startup
        Self::apply_env_parse(
            "RV_STARTUP_TIMEOUT_SECS",
            &mut self.startup.startup_timeout_secs,
        );
        Self::apply_env_parse("RV_POLL_INTERVAL_MS", &mut self.startup.poll_interval_ms);
        Self::apply_env_parse("RV_PROBE_TIMEOUT_MS", &mut self.startup.probe_timeout_ms);
        Self::apply_env_parse(
            "RV_INITIALIZE_TIMEOUT_SECS",
            &mut self.startup.initialize_timeout_secs,
        );
        Self::apply_env_parse("RV_KILL_GRACE_MS", &mut self.startup.kill_grace_ms);

        // Project
        Self::apply_env_option_path("RV_PROJECT_ROOT_DIR", &mut self.project.root_dir);

        // Logging
        Self::apply_env_parse("RV_LOG_LEVEL", &mut self.logging.level);
        Self::apply_env_string("RV_LOG_DIR", &mut self.logging.dir);
    }

    /// Helper: Apply environment variable override for String values
    fn apply_env_string(var_name: &str, target: &mut String) {
        if let Ok(val) = std::env::var(var_name) {
            *target = val;
        }
    }

    /// Helper: Apply environment variable override for parseable values
    fn apply_env_parse<T: std::str::FromStr>(var_name: &str, target: &mut T) {
        if let Ok(val) = std::env::var(var_name)
            && let Ok(parsed) = val.parse()
        {
            *target = parsed;
        }
    }

    /// Helper: Apply environment variable override for Option<PathBuf> values
    fn apply_env_option_path(var_name: &str, target: &mut Option<PathBuf>) {
        if let Ok(val) = std::env::var(var_name)
            && !val.is_empty()
        {
            *target = Some(PathBuf::from(val));
        }
    }
}
