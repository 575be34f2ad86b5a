use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "carechat", about = "Terminal client for marketplace conversations")]
pub struct Cli {
    /// Path to config file (default: ./config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Start the TUI conversation view
    Run(RunArgs),
    /// Print one page of conversations and exit
    List(ListArgs),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Args)]
pub struct RunArgs {
    /// Conversation to open on start: a partner id or a conversation link
    #[arg(long, value_name = "ID_OR_LINK")]
    pub open: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Args)]
pub struct ListArgs {
    /// Filter conversations by partner name
    #[arg(long)]
    pub search: Option<String>,
    /// Only show conversations with unread messages
    #[arg(long)]
    pub unread: bool,
    /// Page to fetch (1-based)
    #[arg(long, default_value_t = 1)]
    pub page: u32,
}

impl Cli {
    pub fn command_or_default(&self) -> Command {
        self.command
            .clone()
            .unwrap_or_else(|| Command::Run(RunArgs::default()))
    }
}
