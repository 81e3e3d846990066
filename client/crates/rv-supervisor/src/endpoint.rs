use crate::{SupervisorError, SupervisorResult};

use std::fmt;

use reqwest::Url;

const HEALTH_SEGMENT: &str = "health";
const INITIALIZE_SEGMENT: &str = "initialize";

/// Immutable base address of the backend API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerEndpoint {
    base: Url,
}

impl ServerEndpoint {
    /// Parse a base URL such as `http://127.0.0.1:8000/api/v1/system`.
    ///
    /// Trailing slashes are dropped; query and fragment are rejected.
    pub fn parse(base_url: &str) -> SupervisorResult<Self> {
        let mut base = Url::parse(base_url.trim())
            .map_err(|e| SupervisorError::invalid_endpoint(base_url, e.to_string()))?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(SupervisorError::invalid_endpoint(
                base_url,
                "scheme must be http or https",
            ));
        }

        if base.host_str().is_none() {
            return Err(SupervisorError::invalid_endpoint(base_url, "missing host"));
        }

        if base.query().is_some() || base.fragment().is_some() {
            return Err(SupervisorError::invalid_endpoint(
                base_url,
                "query and fragment are not allowed",
            ));
        }

        let path = base.path().trim_end_matches('/').to_string();
        base.set_path(&path);

        Ok(Self { base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    pub fn health_url(&self) -> Url {
        self.join(HEALTH_SEGMENT)
    }

    pub fn initialize_url(&self) -> Url {
        self.join(INITIALIZE_SEGMENT)
    }

    fn join(&self, segment: &str) -> Url {
        let mut url = self.base.clone();
        let path = format!("{}/{}", self.base.path().trim_end_matches('/'), segment);
        url.set_path(&path);
        url
    }
}

impl fmt::Display for ServerEndpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.base.as_str().trim_end_matches('/'))
    }
}
