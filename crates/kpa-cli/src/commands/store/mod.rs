//! Credential store subcommands.

mod clear;
mod path;
mod show;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Subcommand};

use kpa::CredentialStore;
use kpa::paths::STORE_PATH_ENV;

#[derive(Args, Debug)]
pub struct StoreCommand {
    /// Credential store file (defaults to the platform config directory)
    #[arg(long, global = true, env = STORE_PATH_ENV)]
    pub store: Option<PathBuf>,

    #[command(subcommand)]
    pub command: StoreSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum StoreSubcommand {
    /// Print the location of the credential store
    Path(path::PathArgs),

    /// Display the stored association
    Show(show::ShowArgs),

    /// Delete the stored association, forcing a new pairing
    Clear(clear::ClearArgs),
}

pub fn handle(cmd: StoreCommand) -> Result<()> {
    let store = open_store(cmd.store)?;
    match cmd.command {
        StoreSubcommand::Path(args) => path::run(&store, args),
        StoreSubcommand::Show(args) => show::run(&store, args),
        StoreSubcommand::Clear(args) => clear::run(&store, args),
    }
}

fn open_store(path: Option<PathBuf>) -> Result<CredentialStore> {
    match path {
        Some(path) => Ok(CredentialStore::new(path)),
        None => CredentialStore::at_default_location().context("Could not locate credential store"),
    }
}
