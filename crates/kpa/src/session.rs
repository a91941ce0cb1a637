//! The session facade over a [`Connection`].

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tracing::{debug, info, instrument};

use kpa_core::responses::{self, GeneratedPasswords, SetLoginResponse, Totp};
use kpa_core::{
    AssociationKey, Connection, DatabaseGroups, Logins, NewGroup, SetLoginRequest, flatten,
};

use crate::{CredentialStore, Result, SaveScheduler, SessionOptions};

/// A KeePassXC proxy session whose association survives restarts.
///
/// On construction the credentials saved by an earlier run are handed to the
/// connection, and from then on every credential change the connection
/// reports is saved in the background.
///
/// Operations never fail: each returns `false`, an empty string or an empty
/// collection when the connection reports an error, and logs the error at
/// `info` level.
pub struct Session<C: Connection> {
    connection: C,
    store: Arc<CredentialStore>,
    scheduler: Arc<SaveScheduler>,
    closed: AtomicBool,
}

impl<C: Connection> Session<C> {
    /// Create a session storing credentials at the default location.
    pub fn new(connection: C) -> Result<Self> {
        Self::with_options(connection, SessionOptions::default())
    }

    /// Create a session with explicit options.
    pub fn with_options(connection: C, options: SessionOptions) -> Result<Self> {
        let store = match options.store_path {
            Some(path) => CredentialStore::new(path),
            None => CredentialStore::at_default_location()?,
        };
        let store = Arc::new(store);

        store.discard_stale_temp();
        let restored = store.load();
        debug!(
            path = %store.path().display(),
            restored = restored.is_some(),
            "Opening session"
        );
        connection.set_credentials(restored);

        let scheduler = Arc::new(SaveScheduler::new(store.clone(), options.save_delay)?);
        connection.subscribe(scheduler.clone());

        Ok(Self {
            connection,
            store,
            scheduler,
            closed: AtomicBool::new(false),
        })
    }

    /// The underlying connection.
    pub fn connection(&self) -> &C {
        &self.connection
    }

    /// The credential store backing this session.
    pub fn store(&self) -> &CredentialStore {
        &self.store
    }

    // ========================================================================
    // Association
    // ========================================================================

    #[instrument(skip(self))]
    pub fn connect(&self) -> bool {
        settle("connect", self.connection.connect()).is_some()
    }

    #[instrument(skip(self))]
    pub fn associate(&self) -> bool {
        settle("associate", self.connection.associate()).is_some()
    }

    #[instrument(skip(self, key))]
    pub fn test_associate(&self, id: &str, key: &str) -> bool {
        settle("test-associate", self.connection.test_associate(id, key)).is_some()
    }

    /// True if an association is known *and* KeePassXC still accepts it.
    pub fn connection_available(&self) -> bool {
        let (Some(key), Some(id)) = (self.id_key_public_key(), self.associate_id()) else {
            return false;
        };
        !key.is_empty() && !id.is_empty() && self.test_associate(&id, &key)
    }

    pub fn id_key_public_key(&self) -> Option<String> {
        self.connection.id_key_public_key()
    }

    pub fn associate_id(&self) -> Option<String> {
        self.connection.associate_id()
    }

    /// The current association as an `{id, key}` pair, for handing to other
    /// tools that need to talk to the same database.
    pub fn export_connection(&self) -> Option<AssociationKey> {
        Some(AssociationKey::new(self.associate_id()?, self.id_key_public_key()?))
    }

    // ========================================================================
    // Database
    // ========================================================================

    /// Hash of the open database, or `""`.
    ///
    /// Accepts at most one unlock flag; more than one is rejected and yields
    /// `""` like any other failure.
    #[instrument(skip(self))]
    pub fn database_hash(&self, unlock: &[bool]) -> String {
        let result = match unlock {
            [] => self.connection.database_hash(None),
            [flag] => self.connection.database_hash(Some(*flag)),
            _ => Err(kpa_core::Error::illegal_state(format!(
                "expected at most one unlock flag, got {}",
                unlock.len()
            ))),
        };
        settle("get-databasehash", result).unwrap_or_default()
    }

    /// True if KeePassXC reports that no database is open.
    #[instrument(skip(self))]
    pub fn is_database_locked(&self) -> bool {
        match self.connection.database_hash(None) {
            Ok(_) => false,
            Err(kpa_core::Error::Protocol(e)) if e.is_database_not_opened() => true,
            Err(e) => {
                info!(operation = "get-databasehash", error = %e, "Request failed");
                false
            }
        }
    }

    #[instrument(skip(self))]
    pub fn lock_database(&self) -> bool {
        settle("lock-database", self.connection.lock_database()).is_some()
    }

    #[instrument(skip(self))]
    pub fn database_groups(&self) -> DatabaseGroups {
        let result = self
            .connection
            .get_database_groups()
            .and_then(responses::parse::<DatabaseGroups>);
        settle("get-database-groups", result).unwrap_or_default()
    }

    /// All groups as `name -> uuid`. Duplicate names keep the uuid of the
    /// group visited last.
    pub fn database_group_map(&self) -> HashMap<String, String> {
        flatten(&self.database_groups())
    }

    /// Create a group at `path`; `None` on failure.
    #[instrument(skip(self))]
    pub fn create_new_group(&self, path: &str) -> Option<NewGroup> {
        let result = self
            .connection
            .create_new_group(path)
            .and_then(responses::parse::<NewGroup>);
        settle("create-new-group", result)
    }

    // ========================================================================
    // Logins
    // ========================================================================

    /// Logins stored for `url`; empty on failure.
    #[instrument(skip(self, keys))]
    pub fn logins(
        &self,
        url: &str,
        submit_url: Option<&str>,
        http_auth: bool,
        keys: &[AssociationKey],
    ) -> Logins {
        let result = self
            .connection
            .get_logins(url, submit_url, http_auth, keys)
            .and_then(responses::parse::<Logins>);
        settle("get-logins", result).unwrap_or_default()
    }

    /// True if a login for `url` stores exactly `password`.
    pub fn login_exists(
        &self,
        url: &str,
        submit_url: Option<&str>,
        http_auth: bool,
        keys: &[AssociationKey],
        password: &str,
    ) -> bool {
        self.logins(url, submit_url, http_auth, keys)
            .contains_password(password)
    }

    #[instrument(skip(self, request), fields(url = request.url))]
    pub fn set_login(&self, request: &SetLoginRequest<'_>) -> bool {
        let result = self
            .connection
            .set_login(request)
            .and_then(responses::parse::<SetLoginResponse>);
        settle("set-login", result).is_some_and(|response| response.succeeded())
    }

    /// A fresh password from KeePassXC's generator, or `""`.
    #[instrument(skip(self))]
    pub fn generate_password(&self) -> String {
        let result = self
            .connection
            .generate_password()
            .and_then(responses::parse::<GeneratedPasswords>)
            .and_then(|generated| {
                generated
                    .entries
                    .into_iter()
                    .next()
                    .map(|entry| entry.password)
                    .ok_or_else(|| {
                        kpa_core::error::ProtocolError::malformed("no generated password").into()
                    })
            });
        settle("generate-password", result).unwrap_or_default()
    }

    /// Current TOTP code of the entry `uuid`, or `""`.
    #[instrument(skip(self))]
    pub fn totp(&self, uuid: &str) -> String {
        let result = self
            .connection
            .get_totp(uuid)
            .and_then(responses::parse::<Totp>)
            .map(|totp| totp.totp);
        settle("get-totp", result).unwrap_or_default()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Stop listening for credential changes and finish pending saves.
    ///
    /// The subscription is dropped before the scheduler stops, so no save can
    /// be scheduled against a worker that is going away.
    pub fn shutdown(&self) -> bool {
        if self.closed.swap(true, Ordering::SeqCst) {
            return true;
        }
        self.connection.unsubscribe();
        self.scheduler.shutdown();
        debug!("Session shut down");
        true
    }
}

impl<C: Connection> Drop for Session<C> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<C: Connection + std::fmt::Debug> std::fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("connection", &self.connection)
            .field("store", &self.store)
            .field("scheduler", &self.scheduler)
            .finish()
    }
}

/// Collapse a connection result into `Some(value)` or a logged `None`.
///
/// This is the single place where transport, state and protocol errors lose
/// their detail.
fn settle<T>(operation: &'static str, result: kpa_core::Result<T>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            info!(operation, error = %e, "Request failed");
            None
        }
    }
}
