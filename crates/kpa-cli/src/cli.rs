//! CLI argument definitions.

use clap::{Parser, Subcommand};

use crate::commands::store::StoreCommand;

/// Inspect the association kpa keeps with KeePassXC.
#[derive(Parser, Debug)]
#[command(name = "kpa")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Output logs as JSON
    #[arg(long, global = true)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Credential store operations
    Store(StoreCommand),
}
