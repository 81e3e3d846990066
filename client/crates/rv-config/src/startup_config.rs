use crate::{ConfigError, ConfigErrorResult};

use std::time::Duration;

use serde::Deserialize;

pub const DEFAULT_STARTUP_TIMEOUT_SECS: u64 = 100;
pub const MAX_STARTUP_TIMEOUT_SECS: u64 = 600;

pub const DEFAULT_POLL_INTERVAL_MS: u64 = 500;
pub const MIN_POLL_INTERVAL_MS: u64 = 50;
pub const MAX_POLL_INTERVAL_MS: u64 = 10_000;

pub const DEFAULT_PROBE_TIMEOUT_MS: u64 = 1000;
pub const MIN_PROBE_TIMEOUT_MS: u64 = 50;

pub const DEFAULT_INITIALIZE_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_KILL_GRACE_MS: u64 = 5000;

/// Timing knobs for the start sequence.
///
/// The backend can take a long time to come up (interpreter start plus
/// imports), and initialization scans the whole project, so both budgets
/// are generous.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StartupConfig {
    /// Total time allowed for the backend to become reachable
    pub startup_timeout_secs: u64,
    /// Delay between health probes
    pub poll_interval_ms: u64,
    /// Per-probe HTTP timeout
    pub probe_timeout_ms: u64,
    /// Timeout for the initialize request
    pub initialize_timeout_secs: u64,
    /// Time between SIGTERM and SIGKILL when stopping the backend
    pub kill_grace_ms: u64,
}

impl Default for StartupConfig {
    fn default() -> Self {
        Self {
            startup_timeout_secs: DEFAULT_STARTUP_TIMEOUT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            probe_timeout_ms: DEFAULT_PROBE_TIMEOUT_MS,
            initialize_timeout_secs: DEFAULT_INITIALIZE_TIMEOUT_SECS,
            kill_grace_ms: DEFAULT_KILL_GRACE_MS,
        }
    }
}

impl StartupConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.startup_timeout_secs > MAX_STARTUP_TIMEOUT_SECS {
            return Err(ConfigError::startup(format!(
                "startup.startup_timeout_secs must be <= {}, got {}",
                MAX_STARTUP_TIMEOUT_SECS, self.startup_timeout_secs
            )));
        }

        if self.poll_interval_ms < MIN_POLL_INTERVAL_MS
            || self.poll_interval_ms > MAX_POLL_INTERVAL_MS
        {
            return Err(ConfigError::startup(format!(
                "startup.poll_interval_ms must be {}-{}, got {}",
                MIN_POLL_INTERVAL_MS, MAX_POLL_INTERVAL_MS, self.poll_interval_ms
            )));
        }

        if self.probe_timeout_ms < MIN_PROBE_TIMEOUT_MS {
            return Err(ConfigError::startup(format!(
                "startup.probe_timeout_ms must be >= {}, got {}",
                MIN_PROBE_TIMEOUT_MS, self.probe_timeout_ms
            )));
        }

        if self.initialize_timeout_secs == 0 {
            return Err(ConfigError::startup(
                "startup.initialize_timeout_secs must be > 0",
            ));
        }

        Ok(())
    }

    pub fn startup_timeout(&self) -> Duration {
        Duration::from_secs(self.startup_timeout_secs)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms)
    }

    pub fn initialize_timeout(&self) -> Duration {
        Duration::from_secs(self.initialize_timeout_secs)
    }

    pub fn kill_grace(&self) -> Duration {
        Duration::from_millis(self.kill_grace_ms)
    }
}
