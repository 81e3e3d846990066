use clap::Subcommand;

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Commands {
    /// Start the backend and keep it supervised until interrupted
    Start,

    /// Kill any backend this launcher owns and run the start sequence again
    Restart,

    /// Probe the backend once and print its status
    Status,
}

/// Commands accepted on stdin while the backend is supervised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ConsoleCommand {
    Restart,
    Status,
    Quit,
}

impl ConsoleCommand {
    pub(crate) fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "r" | "restart" => Some(Self::Restart),
            "s" | "status" => Some(Self::Status),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}
