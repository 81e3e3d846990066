use crate::{ConfigError, ConfigErrorResult, DEFAULT_BASE_URL};

use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EndpointConfig {
    /// Base address of the backend API; `/health` and `/initialize` hang off it
    pub base_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
        }
    }
}

impl EndpointConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        let url = self.base_url.trim();

        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::endpoint(format!(
                "endpoint.base_url must start with http:// or https://, got {}",
                self.base_url
            )));
        }

        Ok(())
    }
}
