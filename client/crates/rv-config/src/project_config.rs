use crate::{ConfigError, ConfigErrorResult};

use std::path::PathBuf;

use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProjectConfig {
    /// Directory the backend analyzes; required before initialization
    pub root_dir: Option<PathBuf>,
}

impl ProjectConfig {
    pub fn validate(&self) -> ConfigErrorResult<()> {
        if let Some(ref root) = self.root_dir
            && !root.is_dir()
        {
            return Err(ConfigError::config(format!(
                "project.root_dir is not a directory: {}",
                root.display()
            )));
        }

        Ok(())
    }
}
