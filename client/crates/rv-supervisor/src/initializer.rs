//! Project initialization handshake.

use crate::{ServerEndpoint, SupervisorError, SupervisorResult};

use std::borrow::Cow;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Serialize)]
struct InitializeRequest<'a> {
    project_root_dir: Cow<'a, str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    config_file: Option<Cow<'a, str>>,
}

/// Backend acknowledgement of a successful initialization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct InitializeAck {
    #[serde(default)]
    pub status: Option<String>,
}

/// Sends the one-shot initialize request once the backend is healthy.
pub struct Initializer {
    client: reqwest::Client,
    endpoint: ServerEndpoint,
}

impl Initializer {
    /// `timeout` bounds the whole request; initial analysis can be slow.
    pub fn new(endpoint: ServerEndpoint, timeout: Duration) -> SupervisorResult<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    /// POST `{project_root_dir, config_file?}` to `<base>/initialize`.
    ///
    /// `config_file` is omitted from the body when absent. Non-2xx answers
    /// surface the backend's `detail` field when it has one.
    pub async fn initialize(
        &self,
        project_root_dir: &Path,
        config_file: Option<&Path>,
    ) -> SupervisorResult<InitializeAck> {
        if project_root_dir.as_os_str().is_empty() {
            return Err(SupervisorError::missing_project_root());
        }

        let body = InitializeRequest {
            project_root_dir: project_root_dir.to_string_lossy(),
            config_file: config_file.map(Path::to_string_lossy),
        };

        info!(
            "Initializing backend for {} (config file: {})",
            body.project_root_dir,
            body.config_file.as_deref().unwrap_or("none")
        );

        let response = self
            .client
            .post(self.endpoint.initialize_url())
            .json(&body)
            .send()
            .await
            .map_err(|e| SupervisorError::initialize(None, format!("request failed: {e}")))?;

        let status = response.status();
        if status.is_success() {
            let ack = response.json::<InitializeAck>().await.unwrap_or_default();
            info!("Backend initialized (HTTP {status})");
            return Ok(ack);
        }

        let detail = response
            .json::<serde_json::Value>()
            .await
            .ok()
            .and_then(|body| error_detail(&body));

        let message = detail.unwrap_or_else(|| format!("backend answered HTTP {status}"));
        warn!("Backend rejected initialization: {message}");

        Err(SupervisorError::initialize(Some(status.as_u16()), message))
    }
}

/// The `detail` field of an error body, verbatim when it is a string.
fn error_detail(body: &serde_json::Value) -> Option<String> {
    match body.get("detail")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(detail) => Some(detail.clone()),
        other => Some(other.to_string()),
    }
}
