use std::panic::Location;
use std::path::PathBuf;

use error_location::ErrorLocation;
use thiserror::Error;

/// Broad category of a terminal run failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Spawn,
    HealthTimeout,
    Init,
    ProcessCrash,
    Other,
}

#[derive(Error, Debug)]
pub enum SupervisorError {
    #[error("Failed to spawn backend process {program}: {source} {location}")]
    Spawn {
        program: PathBuf,
        #[source]
        source: std::io::Error,
        location: ErrorLocation,
    },

    #[error("Backend process exited with code {code:?} before becoming reachable {location}")]
    ExitedBeforeHealthy {
        code: Option<i32>,
        location: ErrorLocation,
    },

    #[error("Backend failed to become reachable within {timeout_ms}ms {location}")]
    HealthTimeout {
        timeout_ms: u64,
        location: ErrorLocation,
    },

    #[error("Initialization failed: {message} {location}")]
    Initialize {
        status: Option<u16>,
        message: String,
        location: ErrorLocation,
    },

    #[error("No project root directory configured {location}")]
    MissingProjectRoot { location: ErrorLocation },

    #[error("Backend process crashed with exit code {code:?} {location}")]
    ProcessCrashed {
        code: Option<i32>,
        location: ErrorLocation,
    },

    #[error("A start sequence is already in progress {location}")]
    RunInProgress { location: ErrorLocation },

    #[error("Start sequence cancelled {location}")]
    Cancelled { location: ErrorLocation },

    #[error("Invalid backend endpoint {url}: {message} {location}")]
    InvalidEndpoint {
        url: String,
        message: String,
        location: ErrorLocation,
    },

    #[error("HTTP client error: {source} {location}")]
    Http {
        #[source]
        source: reqwest::Error,
        location: ErrorLocation,
    },
}

impl SupervisorError {
    #[track_caller]
    pub fn spawn(program: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Spawn {
            program: program.into(),
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn exited_before_healthy(code: Option<i32>) -> Self {
        Self::ExitedBeforeHealthy {
            code,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn health_timeout(timeout_ms: u64) -> Self {
        Self::HealthTimeout {
            timeout_ms,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn initialize(status: Option<u16>, message: impl Into<String>) -> Self {
        Self::Initialize {
            status,
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn missing_project_root() -> Self {
        Self::MissingProjectRoot {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn process_crashed(code: Option<i32>) -> Self {
        Self::ProcessCrashed {
            code,
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn run_in_progress() -> Self {
        Self::RunInProgress {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn cancelled() -> Self {
        Self::Cancelled {
            location: ErrorLocation::from(Location::caller()),
        }
    }

    #[track_caller]
    pub fn invalid_endpoint(url: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            url: url.into(),
            message: message.into(),
            location: ErrorLocation::from(Location::caller()),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Spawn { .. } | Self::ExitedBeforeHealthy { .. } => FailureKind::Spawn,
            Self::HealthTimeout { .. } => FailureKind::HealthTimeout,
            Self::Initialize { .. } | Self::MissingProjectRoot { .. } => FailureKind::Init,
            Self::ProcessCrashed { .. } => FailureKind::ProcessCrash,
            _ => FailureKind::Other,
        }
    }

    /// Human-readable message without source location, for notices.
    pub fn summary(&self) -> String {
        match self {
            Self::Spawn {
                program, source, ..
            } => format!("Could not start {}: {source}", program.display()),
            Self::ExitedBeforeHealthy { code, .. } => {
                format!("Backend exited (code {code:?}) before it became reachable")
            }
            Self::HealthTimeout { timeout_ms, .. } => format!(
                "Backend not reachable after {} seconds",
                timeout_ms / 1000
            ),
            Self::Initialize { message, .. } => format!("Initialization failed: {message}"),
            Self::MissingProjectRoot { .. } => "Please open a project folder first".into(),
            Self::ProcessCrashed { code, .. } => {
                format!("Backend process exited unexpectedly (code {code:?})")
            }
            Self::RunInProgress { .. } => "Backend is already starting".into(),
            Self::Cancelled { .. } => "Start cancelled".into(),
            Self::InvalidEndpoint { url, message, .. } => {
                format!("Invalid backend address {url}: {message}")
            }
            Self::Http { source, .. } => format!("HTTP error: {source}"),
        }
    }

    pub fn recovery_hint(&self) -> &'static str {
        match self {
            Self::Spawn { .. } => {
                "Check that the backend executable exists and that the backend \
                   package is installed in the selected Python environment."
            }
            Self::ExitedBeforeHealthy { .. } => {
                "The backend crashed during startup. \
                   Check the backend output for details."
            }
            Self::HealthTimeout { .. } => {
                "The backend is taking too long to start. \
                   Try restarting or check the backend output."
            }
            Self::Initialize { .. } => {
                "The backend is running but could not analyze the project. \
                   Check the project path and lint configuration, then restart."
            }
            Self::MissingProjectRoot { .. } => "Open a project folder and start again.",
            Self::ProcessCrashed { .. } => {
                "The backend stopped unexpectedly. \
                   Restart it and check the backend output."
            }
            Self::RunInProgress { .. } => "Wait for the current start to finish.",
            Self::InvalidEndpoint { .. } => {
                "Fix endpoint.base_url in the configuration file."
            }
            _ => "An unexpected error occurred. Please check the logs for details.",
        }
    }
}

impl From<reqwest::Error> for SupervisorError {
    #[track_caller]
    fn from(source: reqwest::Error) -> Self {
        Self::Http {
            source,
            location: ErrorLocation::from(Location::caller()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SupervisorError>;
