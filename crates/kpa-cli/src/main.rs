//! kpa - CLI tool for the stored KeePassXC proxy association.
//!
//! A thin wrapper over the `kpa` library for checking which association a
//! machine will resume, and for forcing a fresh pairing by clearing it.

mod cli;
mod commands;
mod output;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use cli::{Cli, Commands};
use commands::store;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose, cli.json_logs);

    match cli.command {
        Commands::Store(store_cmd) => store::handle(store_cmd),
    }
}

/// Logs go to stderr so command output on stdout stays parseable.
/// `RUST_LOG` overrides the `-v` level.
fn init_logging(verbosity: u8, json: bool) {
    let level = ["warn", "info", "debug"]
        .get(usize::from(verbosity))
        .copied()
        .unwrap_or("trace");
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,kpa={level},kpa_cli={level}")));

    let layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(verbosity > 1);
    let (plain, structured) = if json {
        (None, Some(layer.json()))
    } else {
        (Some(layer), None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(plain)
        .with(structured)
        .init();
}
