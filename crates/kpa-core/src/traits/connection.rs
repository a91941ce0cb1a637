//! Connection trait.

use std::sync::Arc;

use serde_json::Value;

use crate::{AssociationKey, Credentials, Result, SetLoginRequest};

use super::CredentialsListener;

/// An encrypted request channel to the KeePassXC browser-integration proxy.
///
/// Every request blocks for one protocol round trip. Methods returning a
/// [`Value`] hand back the decrypted response body unchanged; parsing it is
/// the caller's job (see [`crate::responses`]).
pub trait Connection: Send + Sync {
    /// Open the socket and perform the key exchange.
    fn connect(&self) -> Result<()>;

    /// Run the association handshake, producing new credentials.
    fn associate(&self) -> Result<()>;

    /// Check that KeePassXC still knows the association `id` with `key`.
    fn test_associate(&self, id: &str, key: &str) -> Result<()>;

    /// Request the hash of the open database. `Some(true)` asks KeePassXC to
    /// prompt for unlocking if the database is locked.
    fn database_hash(&self, unlock: Option<bool>) -> Result<String>;

    /// Look up stored logins for `url`, including matches from databases
    /// associated under the extra `keys`.
    fn get_logins(
        &self,
        url: &str,
        submit_url: Option<&str>,
        http_auth: bool,
        keys: &[AssociationKey],
    ) -> Result<Value>;

    /// Create or update a login entry.
    fn set_login(&self, request: &SetLoginRequest<'_>) -> Result<Value>;

    fn generate_password(&self) -> Result<Value>;

    fn lock_database(&self) -> Result<Value>;

    /// Create a group at `path` (segments separated by `/`).
    fn create_new_group(&self, path: &str) -> Result<Value>;

    fn get_totp(&self, uuid: &str) -> Result<Value>;

    fn get_database_groups(&self) -> Result<Value>;

    /// Identity public key of the current association, if any.
    fn id_key_public_key(&self) -> Option<String>;

    /// Id of the current association, if any.
    fn associate_id(&self) -> Option<String>;

    /// Replace the credentials used to resume an association.
    fn set_credentials(&self, credentials: Option<Credentials>);

    /// Register the listener notified on every credential change.
    fn subscribe(&self, listener: Arc<dyn CredentialsListener>);

    /// Drop the registered listener.
    fn unsubscribe(&self);
}
