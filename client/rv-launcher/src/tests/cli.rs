use crate::cli::Cli;
use crate::commands::{Commands, ConsoleCommand};

use std::path::PathBuf;

use clap::Parser;

#[test]
fn test_no_subcommand_defaults_to_start() {
    let cli = Cli::try_parse_from(["roboview"]).unwrap();

    assert_eq!(cli.command(), Commands::Start);
    assert!(cli.config_dir.is_none());
    assert!(!cli.json);
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::try_parse_from([
        "roboview",
        "status",
        "--json",
        "--config-dir",
        "/tmp/rv",
        "--project-root",
        "/work/robot-tests",
    ])
    .unwrap();

    assert_eq!(cli.command(), Commands::Status);
    assert!(cli.json);
    assert_eq!(cli.config_dir, Some(PathBuf::from("/tmp/rv")));
    assert_eq!(cli.project_root, Some(PathBuf::from("/work/robot-tests")));
}

#[test]
fn test_restart_subcommand() {
    let cli = Cli::try_parse_from(["roboview", "restart"]).unwrap();

    assert_eq!(cli.command(), Commands::Restart);
}

#[test]
fn test_unknown_subcommand_rejected() {
    assert!(Cli::try_parse_from(["roboview", "deploy"]).is_err());
}

#[test]
fn test_console_commands() {
    assert_eq!(ConsoleCommand::parse("r"), Some(ConsoleCommand::Restart));
    assert_eq!(ConsoleCommand::parse(" Restart \n"), Some(ConsoleCommand::Restart));
    assert_eq!(ConsoleCommand::parse("s"), Some(ConsoleCommand::Status));
    assert_eq!(ConsoleCommand::parse("quit"), Some(ConsoleCommand::Quit));
    assert_eq!(ConsoleCommand::parse("exit"), Some(ConsoleCommand::Quit));
    assert_eq!(ConsoleCommand::parse("launch"), None);
    assert_eq!(ConsoleCommand::parse(""), None);
}
