use crate::{ConfigError, ConfigErrorResult, DEFAULT_MODULE, DEFAULT_PROGRAM};

use std::path::PathBuf;

use serde::Deserialize;

/// How to launch the backend process.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Executable (absolute path or resolved via PATH)
    pub program: String,
    pub args: Vec<String>,
    /// Working directory; falls back to the project root when unset
    pub working_dir: Option<PathBuf>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            program: String::from(DEFAULT_PROGRAM),
            args: vec![String::from("-m"), String::from(DEFAULT_MODULE)],
            working_dir: None,
        }
    }
}

impl BackendConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if self.program.trim().is_empty() {
            return Err(ConfigError::backend("backend.program must not be empty"));
        }

        if let Some(ref dir) = self.working_dir
            && !dir.is_dir()
        {
            return Err(ConfigError::backend(format!(
                "backend.working_dir is not a directory: {}",
                dir.display()
            )));
        }

        Ok(())
    }
}
