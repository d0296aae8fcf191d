//! CLI subcommand definitions and handlers.
//!
//! Implements a git-like subcommand architecture:
//! - `netwarden scan [range]` - Discover hosts and audit their ports
//! - `netwarden block domain|ip` - Block a domain or address
//! - `netwarden unblock domain|ip` - Undo a block
//! - `netwarden blocklist` - Show domains blocked through the hosts file

mod block;
mod scan;

pub use block::{BlockCommand, BlocklistCommand, UnblockCommand};
pub use scan::ScanCommand;

use crate::error::CliResult;
use clap::{Parser, Subcommand};

/// netwarden - sweep your network, surface risky exposures, block
/// offenders.
#[derive(Parser, Debug)]
#[command(name = "netwarden")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "A local network sentinel", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Discover hosts on a network range and audit their open ports
    #[command(alias = "s")]
    Scan(ScanCommand),

    /// Block a domain (hosts file) or an IP address (firewall)
    #[command(alias = "b")]
    Block(BlockCommand),

    /// Remove a previously created block
    Unblock(UnblockCommand),

    /// List domains currently blocked through the hosts file
    Blocklist(BlocklistCommand),
}

impl Cli {
    /// Dispatch to the selected subcommand.
    pub async fn run(self) -> CliResult<()> {
        match self.command {
            Commands::Scan(cmd) => cmd.execute(self.verbose, self.quiet).await,
            Commands::Block(cmd) => cmd.execute(),
            Commands::Unblock(cmd) => cmd.execute(),
            Commands::Blocklist(cmd) => cmd.execute(),
        }
    }
}

/// Output format for scan results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Human-readable plain text
    Plain,
    /// JSON structured output
    Json,
}

impl Default for OutputFormat {
    fn default() -> Self {
        Self::Plain
    }
}
