//! Path command implementation.

use anyhow::Result;
use clap::Args;

use kpa::CredentialStore;

#[derive(Args, Debug)]
pub struct PathArgs {}

pub fn run(store: &CredentialStore, _args: PathArgs) -> Result<()> {
    println!("{}", store.path().display());
    Ok(())
}
