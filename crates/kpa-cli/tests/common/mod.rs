#![allow(dead_code)]

use std::path::Path;
use std::process::{Command, Output};

use kpa::{CredentialStore, Credentials, KeyPair, SecretKey};

/// Run the CLI binary against an explicit store file.
pub fn run_cli(args: &[&str], store: &Path) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_kpa"));
    cmd.args(args);
    cmd.env("KPA_STORE_PATH", store);
    cmd.env_remove("RUST_LOG");
    cmd.output().expect("Failed to execute CLI")
}

/// Run the CLI and expect success.
pub fn run_cli_success(args: &[&str], store: &Path) -> String {
    let output = run_cli(args, store);
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        panic!("CLI command failed: {:?}\nstderr: {}", args, stderr);
    }
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Save a known association into `store`.
pub fn seed_store(store: &Path) -> Credentials {
    let credentials = Credentials::new(
        KeyPair::new("b3duLXB1YmxpYw==", SecretKey::new("dG9wLXNlY3JldA==")),
        "aWRlbnRpdHkta2V5",
        "desktop",
    )
    .with_server_public_key("c2VydmVyLWtleQ==");
    CredentialStore::new(store).save(&credentials).unwrap();
    credentials
}
