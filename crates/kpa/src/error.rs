//! Errors from credential persistence.

use thiserror::Error;

/// Failures while locating or writing the credential store.
#[derive(Debug, Error)]
pub enum Error {
    /// No home directory to derive the store location from.
    #[error("could not determine the configuration directory")]
    NoConfigDir,

    /// Reading or writing the store failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The credentials could not be encoded.
    #[error("serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
