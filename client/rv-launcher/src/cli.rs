use crate::commands::Commands;

use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "roboview")]
#[command(about = "Launches and supervises the RoboView analysis backend")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub(crate) command: Option<Commands>,

    /// Config directory (defaults to $RV_CONFIG_DIR or ./.roboview)
    #[arg(long, global = true)]
    pub(crate) config_dir: Option<PathBuf>,

    /// Project to analyze (defaults to project.root_dir, then the current directory)
    #[arg(long, global = true)]
    pub(crate) project_root: Option<PathBuf>,

    /// Print status as JSON
    #[arg(long, global = true)]
    pub(crate) json: bool,
}

impl Cli {
    pub(crate) fn command(&self) -> Commands {
        self.command.unwrap_or(Commands::Start)
    }
}
