use crate::{HealthStatus, LifecycleState};

use serde::Serialize;

/// Point-in-time view of the backend for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerStatus {
    pub state: String,
    pub ready: bool,
    pub health: HealthStatus,
    pub pid: Option<u32>,
    pub base_url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recovery_hint: Option<String>,
}

pub fn build_server_status(
    state: &LifecycleState,
    ready: bool,
    health: HealthStatus,
    pid: Option<u32>,
    base_url: &str,
) -> ServerStatus {
    let (error, recovery_hint) = match state {
        LifecycleState::Failed { error } => (
            Some(error.clone()),
            Some("Check the backend output and restart the server.".to_string()),
        ),
        LifecycleState::Idle if pid.is_none() => (
            None,
            Some("The backend is not running. Start it to enable features.".to_string()),
        ),
        _ => (None, None),
    };

    ServerStatus {
        state: state.name().to_string(),
        ready,
        health,
        pid,
        base_url: base_url.to_string(),
        error,
        recovery_hint,
    }
}

impl ServerStatus {
    /// Single-line summary for terminal output.
    pub fn headline(&self) -> String {
        let pid = self
            .pid
            .map(|pid| format!(" (PID {pid})"))
            .unwrap_or_default();
        format!(
            "{}{} at {} - health {}, ready {}",
            self.state, pid, self.base_url, self.health, self.ready
        )
    }
}
