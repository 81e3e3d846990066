use serde::Serialize;

/// Milestones reported while bringing the backend up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Checking,
    Starting,
    WaitingHealthy,
    Initializing,
    Done,
}

impl Stage {
    pub fn percent(self) -> u8 {
        match self {
            Self::Checking => 0,
            Self::Starting => 20,
            Self::WaitingHealthy => 40,
            Self::Initializing => 70,
            Self::Done => 100,
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            Self::Checking => "Checking backend...",
            Self::Starting => "Starting server...",
            Self::WaitingHealthy => "Waiting for server...",
            Self::Initializing => "Initializing server...",
            Self::Done => "Done!",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressEvent {
    pub stage: Stage,
    pub percent: u8,
    pub message: String,
}

impl From<Stage> for ProgressEvent {
    fn from(stage: Stage) -> Self {
        Self {
            stage,
            percent: stage.percent(),
            message: stage.message().to_string(),
        }
    }
}

/// User-facing message emitted by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    Info { message: String },
    Error { message: String, hint: String },
}

impl Notice {
    pub fn info(message: impl Into<String>) -> Self {
        Self::Info {
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error { .. })
    }
}
