//! Show command implementation.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use kpa::CredentialStore;

use crate::output;

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// The public parts of a stored association.
#[derive(Serialize)]
struct StoredAssociation<'a> {
    id: &'a str,
    key: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    server_public_key: Option<&'a str>,
    path: String,
}

pub fn run(store: &CredentialStore, args: ShowArgs) -> Result<()> {
    let credentials = store.load().with_context(|| {
        format!(
            "No stored association at {}. Pair with KeePassXC first.",
            store.path().display()
        )
    })?;

    let association = StoredAssociation {
        id: credentials.associate_id(),
        key: credentials.id_key_public_key(),
        server_public_key: credentials.server_public_key(),
        path: store.path().display().to_string(),
    };

    if args.json {
        return output::json_pretty(&association);
    }

    output::field("Association", association.id);
    output::field("Identity key", association.key);
    if let Some(server_key) = association.server_public_key {
        output::field("Server key", server_key);
    }
    output::field("Store", &association.path);

    Ok(())
}
