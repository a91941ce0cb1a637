//! kpa - A KeePassXC proxy session that survives restarts.
//!
//! A [`Session`] wraps a [`Connection`] to the KeePassXC browser-integration
//! proxy. The association credentials the connection negotiates are written
//! to disk in the background (debounced, atomically replaced) and restored on
//! the next start, so the pairing prompt in KeePassXC only appears once.
//!
//! Every session operation reports failure as a plain value (`false`, an
//! empty string, an empty collection); the underlying error is logged.
//!
//! # Example
//!
//! ```no_run
//! # fn example<C: kpa::Connection + 'static>(connection: C) -> Result<(), kpa::Error> {
//! let session = kpa::Session::new(connection)?;
//!
//! if !session.connection_available() {
//!     session.connect();
//!     session.associate();
//! }
//!
//! for (name, uuid) in session.database_group_map() {
//!     println!("{name}: {uuid}");
//! }
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod options;
pub mod paths;
pub mod scheduler;
pub mod session;
pub mod store;

pub use error::Error;
pub use kpa_core::{
    AssociationKey, Connection, Credentials, CredentialsListener, DatabaseGroups, Group, KeyPair,
    LoginEntry, Logins, NewGroup, SecretKey, SetLoginRequest,
};
pub use options::SessionOptions;
pub use scheduler::{CredentialSink, SaveScheduler};
pub use session::Session;
pub use store::CredentialStore;

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
