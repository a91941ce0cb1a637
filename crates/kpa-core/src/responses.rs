//! Typed views of KeePassXC response bodies.
//!
//! A [`Connection`](crate::Connection) hands back the decrypted JSON body of
//! each response; [`parse`] turns it into one of the types below. A body of
//! the wrong shape is a protocol error.

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::Result;

/// Decode a response body into `T`.
pub fn parse<T: DeserializeOwned>(body: serde_json::Value) -> Result<T> {
    Ok(serde_json::from_value(body)?)
}

/// The `get-logins` response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Logins {
    #[serde(default, deserialize_with = "lenient_count")]
    pub count: Option<u32>,
    #[serde(default)]
    pub entries: Vec<LoginEntry>,
}

impl Logins {
    /// True if any entry stores exactly `password`.
    pub fn contains_password(&self, password: &str) -> bool {
        self.entries.iter().any(|entry| entry.password == password)
    }
}

// KeePassXC sends `count` as a string, older versions as a number.
fn lenient_count<'de, D>(deserializer: D) -> std::result::Result<Option<u32>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Count {
        Number(u32),
        Text(String),
    }

    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Number(n)) => Some(n),
        Some(Count::Text(s)) => s.parse().ok(),
        None => None,
    })
}

/// One matching entry from `get-logins`.
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEntry {
    #[serde(default)]
    pub login: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub group: Option<String>,
    #[serde(default)]
    pub totp: Option<String>,
    #[serde(default)]
    pub string_fields: Vec<HashMap<String, String>>,
}

// Intentionally hide password in Debug output
impl fmt::Debug for LoginEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginEntry")
            .field("login", &self.login)
            .field("name", &self.name)
            .field("password", &"[REDACTED]")
            .field("uuid", &self.uuid)
            .field("group", &self.group)
            .finish()
    }
}

/// Arguments of a `set-login` request.
///
/// Leaving `uuid` empty creates a new entry; otherwise the entry with that
/// uuid is updated.
#[derive(Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SetLoginRequest<'a> {
    pub url: &'a str,
    pub submit_url: &'a str,
    pub id: &'a str,
    pub login: &'a str,
    pub password: &'a str,
    pub group: &'a str,
    pub group_uuid: &'a str,
    pub uuid: &'a str,
}

impl fmt::Debug for SetLoginRequest<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SetLoginRequest")
            .field("url", &self.url)
            .field("login", &self.login)
            .field("password", &"[REDACTED]")
            .field("group", &self.group)
            .field("uuid", &self.uuid)
            .finish()
    }
}

/// The `set-login` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SetLoginResponse {
    /// KeePassXC reports success as the *string* `"true"`.
    #[serde(default)]
    pub success: Option<String>,
}

impl SetLoginResponse {
    pub fn succeeded(&self) -> bool {
        self.success.as_deref() == Some("true")
    }
}

/// The `generate-password` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GeneratedPasswords {
    #[serde(default)]
    pub entries: Vec<GeneratedPassword>,
}

#[derive(Clone, Deserialize)]
pub struct GeneratedPassword {
    pub password: String,
}

impl fmt::Debug for GeneratedPassword {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeneratedPassword")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The `create-new-group` response.
///
/// When a nested path such as `level1/level2` is created, `name` holds only
/// the last segment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewGroup {
    pub name: String,
    pub uuid: String,
}

/// The `get-totp` response.
#[derive(Debug, Clone, Deserialize)]
pub struct Totp {
    pub totp: String,
}
