//! Lint configuration discovery from the project's `.env` file.

use crate::{LINT_CONFIG_ENV_FILE, LINT_CONFIG_ENV_KEY};

use std::path::{Path, PathBuf};

use log::{debug, warn};

/// Finds the lint config file the backend should use during initialization.
///
/// The project's `.env` file names it via `ROBOCOP_CONFIG_PATH`. A value
/// already present in the process environment takes precedence over the
/// file, matching dotenv semantics. Relative paths resolve against the
/// project root. Only existing regular files are returned.
pub struct LintConfigDiscovery {
    project_root: PathBuf,
}

impl LintConfigDiscovery {
    pub fn new(project_root: impl Into<PathBuf>) -> Self {
        Self {
            project_root: project_root.into(),
        }
    }

    /// Absolute path of the configured lint file, if any.
    pub fn find(&self) -> Option<PathBuf> {
        let configured = self.configured_path()?;

        let resolved = if configured.is_absolute() {
            configured
        } else {
            self.project_root.join(configured)
        };

        if resolved.is_file() {
            debug!("Lint config resolved to {}", resolved.display());
            Some(resolved)
        } else {
            warn!(
                "{LINT_CONFIG_ENV_KEY} points to {} which is not a readable file, ignoring",
                resolved.display()
            );
            None
        }
    }

    fn configured_path(&self) -> Option<PathBuf> {
        if self.project_root.as_os_str().is_empty() {
            return None;
        }

        let env_path = self.project_root.join(LINT_CONFIG_ENV_FILE);
        if !env_path.is_file() {
            return None;
        }

        if let Ok(value) = std::env::var(LINT_CONFIG_ENV_KEY)
            && !value.is_empty()
        {
            return Some(PathBuf::from(value));
        }

        Self::read_env_file(&env_path)
    }

    fn read_env_file(env_path: &Path) -> Option<PathBuf> {
        let entries = match dotenvy::from_path_iter(env_path) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Failed to read {}: {e}", env_path.display());
                return None;
            }
        };

        entries
            .filter_map(Result::ok)
            .find(|(key, value)| key == LINT_CONFIG_ENV_KEY && !value.is_empty())
            .map(|(_, value)| PathBuf::from(value))
    }
}
