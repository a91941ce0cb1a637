//! Shared test doubles.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use serde_json::Value;

use kpa::{
    AssociationKey, Connection, Credentials, CredentialsListener, KeyPair, SecretKey,
    SessionOptions, SetLoginRequest,
};
use kpa_core::Result;
use kpa_core::error::{Error, ProtocolError, TransportError};

/// How a scripted request fails.
#[derive(Debug, Clone)]
pub enum Failure {
    Transport,
    IllegalState,
    Protocol(Option<&'static str>),
}

impl Failure {
    fn into_error(self) -> Error {
        match self {
            Failure::Transport => Error::Transport(TransportError::Closed),
            Failure::IllegalState => Error::illegal_state("not associated"),
            Failure::Protocol(code) => Error::Protocol(ProtocolError::new(
                code.map(str::to_string),
                Some("scripted failure".to_string()),
            )),
        }
    }
}

#[derive(Debug, Clone)]
enum Reply {
    Body(Value),
    Fail(Failure),
}

#[derive(Default)]
struct MockState {
    replies: Mutex<HashMap<&'static str, Reply>>,
    calls: Mutex<Vec<String>>,
    credentials: Mutex<Option<Credentials>>,
    listener: Mutex<Option<Arc<dyn CredentialsListener>>>,
    associate_with: Mutex<Option<Credentials>>,
}

/// A scripted [`Connection`]. Clones share state, so a test can keep one
/// handle while the session owns another.
#[derive(Clone, Default)]
pub struct MockConnection {
    state: Arc<MockState>,
}

impl std::fmt::Debug for MockConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockConnection").finish_non_exhaustive()
    }
}

impl MockConnection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `operation` with `body`.
    pub fn respond(&self, operation: &'static str, body: Value) -> &Self {
        self.state.replies.lock().insert(operation, Reply::Body(body));
        self
    }

    /// Fail `operation` with `failure`.
    pub fn fail(&self, operation: &'static str, failure: Failure) -> &Self {
        self.state.replies.lock().insert(operation, Reply::Fail(failure));
        self
    }

    /// Credentials produced by a successful `associate`.
    pub fn associate_with(&self, credentials: Credentials) -> &Self {
        *self.state.associate_with.lock() = Some(credentials);
        self
    }

    /// Replace the credentials and notify the listener, as a real
    /// connection does during a handshake.
    pub fn emit(&self, credentials: Option<Credentials>) {
        *self.state.credentials.lock() = credentials.clone();
        let listener = self.state.listener.lock().clone();
        if let Some(listener) = listener {
            listener.credentials_changed(credentials);
        }
    }

    pub fn credentials(&self) -> Option<Credentials> {
        self.state.credentials.lock().clone()
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.calls.lock().clone()
    }

    pub fn called(&self, operation: &str) -> bool {
        self.calls().iter().any(|call| call.starts_with(operation))
    }

    pub fn has_listener(&self) -> bool {
        self.state.listener.lock().is_some()
    }

    fn record(&self, call: impl Into<String>) {
        self.state.calls.lock().push(call.into());
    }

    fn reply(&self, operation: &'static str) -> Result<Value> {
        match self.state.replies.lock().get(operation).cloned() {
            Some(Reply::Body(body)) => Ok(body),
            Some(Reply::Fail(failure)) => Err(failure.into_error()),
            None => Ok(Value::Object(Default::default())),
        }
    }
}

impl Connection for MockConnection {
    fn connect(&self) -> Result<()> {
        self.record("connect");
        self.reply("connect").map(|_| ())
    }

    fn associate(&self) -> Result<()> {
        self.record("associate");
        self.reply("associate")?;
        let credentials = self.state.associate_with.lock().clone();
        self.emit(credentials);
        Ok(())
    }

    fn test_associate(&self, id: &str, key: &str) -> Result<()> {
        self.record(format!("test-associate {id} {key}"));
        self.reply("test-associate").map(|_| ())
    }

    fn database_hash(&self, unlock: Option<bool>) -> Result<String> {
        self.record(format!("get-databasehash {unlock:?}"));
        let body = self.reply("get-databasehash")?;
        Ok(body.as_str().unwrap_or_default().to_string())
    }

    fn get_logins(
        &self,
        url: &str,
        _submit_url: Option<&str>,
        _http_auth: bool,
        keys: &[AssociationKey],
    ) -> Result<Value> {
        self.record(format!("get-logins {url} {}", keys.len()));
        self.reply("get-logins")
    }

    fn set_login(&self, request: &SetLoginRequest<'_>) -> Result<Value> {
        self.record(format!("set-login {}", request.url));
        self.reply("set-login")
    }

    fn generate_password(&self) -> Result<Value> {
        self.record("generate-password");
        self.reply("generate-password")
    }

    fn lock_database(&self) -> Result<Value> {
        self.record("lock-database");
        self.reply("lock-database")
    }

    fn create_new_group(&self, path: &str) -> Result<Value> {
        self.record(format!("create-new-group {path}"));
        self.reply("create-new-group")
    }

    fn get_totp(&self, uuid: &str) -> Result<Value> {
        self.record(format!("get-totp {uuid}"));
        self.reply("get-totp")
    }

    fn get_database_groups(&self) -> Result<Value> {
        self.record("get-database-groups");
        self.reply("get-database-groups")
    }

    fn id_key_public_key(&self) -> Option<String> {
        self.credentials()
            .map(|c| c.id_key_public_key().to_string())
    }

    fn associate_id(&self) -> Option<String> {
        self.credentials().map(|c| c.associate_id().to_string())
    }

    fn set_credentials(&self, credentials: Option<Credentials>) {
        self.record("set-credentials");
        *self.state.credentials.lock() = credentials;
    }

    fn subscribe(&self, listener: Arc<dyn CredentialsListener>) {
        self.record("subscribe");
        *self.state.listener.lock() = Some(listener);
    }

    fn unsubscribe(&self) {
        self.record("unsubscribe");
        *self.state.listener.lock() = None;
    }
}

pub fn credentials(associate_id: &str) -> Credentials {
    credentials_with_key(associate_id, "aWRlbnRpdHkta2V5")
}

pub fn credentials_with_key(associate_id: &str, id_key: &str) -> Credentials {
    Credentials::new(
        KeyPair::new("b3duLXB1YmxpYw==", SecretKey::new("b3duLXNlY3JldA==")),
        id_key,
        associate_id,
    )
    .with_server_public_key("c2VydmVyLWtleQ==")
}

pub fn options(store: &Path, save_delay: Duration) -> SessionOptions {
    SessionOptions::default()
        .with_store_path(store)
        .with_save_delay(save_delay)
}

/// Poll `check` until it holds or `timeout` passes.
pub fn wait_until(timeout: Duration, mut check: impl FnMut() -> bool) -> bool {
    let deadline = std::time::Instant::now() + timeout;
    while std::time::Instant::now() < deadline {
        if check() {
            return true;
        }
        std::thread::sleep(Duration::from_millis(10));
    }
    check()
}
