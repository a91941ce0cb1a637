//! kpa-core - Core types and traits for a KeePassXC proxy session.

pub mod credentials;
pub mod error;
pub mod groups;
pub mod responses;
pub mod traits;

pub use credentials::{AssociationKey, Credentials, KeyPair, SecretKey};
pub use error::Error;
pub use groups::{DatabaseGroups, Group, flatten};
pub use responses::{
    GeneratedPassword, GeneratedPasswords, LoginEntry, Logins, NewGroup, SetLoginRequest,
    SetLoginResponse, Totp,
};
pub use traits::{Connection, CredentialsListener};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
