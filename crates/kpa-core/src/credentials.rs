//! Association credentials.

use std::fmt;

use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// The secret half of a key pair, base64 encoded.
///
/// # Security
///
/// - Zeroized when dropped
/// - Never displayed in Debug output
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(transparent)]
pub struct SecretKey(String);

impl SecretKey {
    /// Wrap a base64 encoded secret key.
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Returns the encoded key.
    ///
    /// # Security
    ///
    /// Use only when performing the key exchange. Never log this value.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecretKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecretKey").field(&"[REDACTED]").finish()
    }
}

/// A local key pair (base64 encoded curve25519 keys).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyPair {
    public_key: String,
    secret_key: SecretKey,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, secret_key: SecretKey) -> Self {
        Self {
            public_key: public_key.into(),
            secret_key,
        }
    }

    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    pub fn secret_key(&self) -> &SecretKey {
        &self.secret_key
    }
}

/// An association id together with the identity public key it was
/// registered with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssociationKey {
    pub id: String,
    pub key: String,
}

impl AssociationKey {
    pub fn new(id: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            key: key.into(),
        }
    }
}

/// Everything needed to resume an association without pairing again.
///
/// Produced by a [`Connection`](crate::Connection) once the association
/// handshake completes. Values are never mutated after construction; a new
/// association replaces the whole value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    own_key_pair: KeyPair,
    #[serde(default)]
    server_public_key: Option<String>,
    id_key_public_key: String,
    associate_id: String,
}

impl Credentials {
    /// Create new credentials.
    ///
    /// # Arguments
    ///
    /// * `own_key_pair` - The local key pair used for message encryption
    /// * `id_key_public_key` - The identity public key sent during association
    /// * `associate_id` - The id KeePassXC assigned to this association
    pub fn new(
        own_key_pair: KeyPair,
        id_key_public_key: impl Into<String>,
        associate_id: impl Into<String>,
    ) -> Self {
        Self {
            own_key_pair,
            server_public_key: None,
            id_key_public_key: id_key_public_key.into(),
            associate_id: associate_id.into(),
        }
    }

    /// Attach the server public key negotiated in the last key exchange.
    pub fn with_server_public_key(mut self, key: impl Into<String>) -> Self {
        self.server_public_key = Some(key.into());
        self
    }

    pub fn own_key_pair(&self) -> &KeyPair {
        &self.own_key_pair
    }

    pub fn server_public_key(&self) -> Option<&str> {
        self.server_public_key.as_deref()
    }

    pub fn id_key_public_key(&self) -> &str {
        &self.id_key_public_key
    }

    pub fn associate_id(&self) -> &str {
        &self.associate_id
    }

    /// The `{id, key}` pair identifying this association to KeePassXC.
    pub fn association_key(&self) -> AssociationKey {
        AssociationKey::new(&self.associate_id, &self.id_key_public_key)
    }
}
