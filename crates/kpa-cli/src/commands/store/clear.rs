//! Clear command implementation.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use kpa::CredentialStore;

use crate::output;

#[derive(Args, Debug)]
pub struct ClearArgs {}

pub fn run(store: &CredentialStore, _args: ClearArgs) -> Result<()> {
    let removed = store
        .clear()
        .with_context(|| format!("Failed to remove {}", store.path().display()))?;

    if removed {
        info!(path = %store.path().display(), "Removed stored credentials");
        output::success("Stored association removed");
    } else {
        output::success("No stored association");
    }

    Ok(())
}
