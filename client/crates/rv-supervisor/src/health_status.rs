use std::fmt;

use serde::Serialize;

/// Last observed reachability of the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// No probe has run yet
    Unknown,
    /// Waiting for the backend to come up
    Polling,
    /// Health endpoint answered 200
    Healthy,
    /// Last probe failed
    Unreachable,
    /// Polling gave up
    TimedOut,
}

impl HealthStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unknown => "unknown",
            Self::Polling => "polling",
            Self::Healthy => "healthy",
            Self::Unreachable => "unreachable",
            Self::TimedOut => "timed_out",
        }
    }
}

impl fmt::Display for HealthStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of [`HealthChecker::poll_until_healthy`](crate::HealthChecker::poll_until_healthy).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PollOutcome {
    Healthy,
    TimedOut,
    Cancelled,
}
