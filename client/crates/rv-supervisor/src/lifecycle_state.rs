use std::fmt;

/// Position of the controller in the start sequence.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LifecycleState {
    /// Nothing running or in progress
    #[default]
    Idle,
    /// Spawning the backend process
    Starting,
    /// Process spawned, waiting for the health endpoint
    WaitingHealthy,
    /// Sending the initialize request
    Initializing,
    /// Backend initialized and serving
    Ready,
    /// Sequence ended with an error; kept until the next start or restart
    Failed { error: String },
}

impl LifecycleState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Starting => "starting",
            Self::WaitingHealthy => "waiting_healthy",
            Self::Initializing => "initializing",
            Self::Ready => "ready",
            Self::Failed { .. } => "failed",
        }
    }

    pub fn is_in_progress(&self) -> bool {
        matches!(
            self,
            Self::Starting | Self::WaitingHealthy | Self::Initializing
        )
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed { .. })
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed { error } => write!(f, "failed: {error}"),
            other => f.write_str(other.name()),
        }
    }
}
