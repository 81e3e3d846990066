//! roboview - RoboView backend launcher
//!
//! Starts the analysis backend for a project, waits until it answers its
//! health endpoint, initializes it, and keeps it supervised.
//!
//! # Examples
//!
//! ```bash
//! # Start and supervise the backend for the current directory
//! roboview start
//!
//! # Analyze another project with an explicit config directory
//! roboview --project-root ~/robot-tests --config-dir ~/.roboview start
//!
//! # One-shot health check
//! roboview status --json
//! ```

mod cli;
mod commands;
mod error;
mod logging;
mod runner;

#[cfg(test)]
mod tests;

use crate::{cli::Cli, commands::Commands, error::Result as LauncherResult};

use rv_config::Config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let (config_dir, config) = match load_config(&cli) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    let logs_dir = match logging::setup_logging(&config_dir, &config.logging) {
        Ok(dir) => dir,
        Err(e) => {
            eprintln!("Error: {e}");
            return ExitCode::FAILURE;
        }
    };

    info!("Starting RoboView launcher v{}", env!("CARGO_PKG_VERSION"));
    info!("Config directory: {}", config_dir.display());
    info!(
        "Log file: {}",
        logging::current_log_path(&logs_dir).display()
    );
    config.log_summary();

    let result = match cli.command() {
        Commands::Start => runner::supervise(&config, false).await,
        Commands::Restart => runner::supervise(&config, true).await,
        Commands::Status => runner::print_status(&config, cli.json).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Load and validate configuration, applying command-line overrides.
fn load_config(cli: &Cli) -> LauncherResult<(PathBuf, Config)> {
    let config_dir = match &cli.config_dir {
        Some(dir) => dir.clone(),
        None => Config::config_dir()?,
    };

    let mut config = Config::load_from_dir(&config_dir)?;

    if let Some(root) = &cli.project_root {
        config.project.root_dir = Some(root.clone());
    }
    if config.project.root_dir.is_none() {
        config.project.root_dir = Some(std::env::current_dir()?);
    }

    config.validate()?;

    Ok((config_dir, config))
}
