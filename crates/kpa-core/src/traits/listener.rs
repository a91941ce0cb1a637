//! Credential change notifications.

use crate::Credentials;

/// Receives the connection's credentials whenever they change.
///
/// `None` means the connection currently holds no credentials (for example
/// before the first association).
pub trait CredentialsListener: Send + Sync {
    fn credentials_changed(&self, credentials: Option<Credentials>);
}
