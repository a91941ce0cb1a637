//! Session configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Quiet period before changed credentials are written.
pub const DEFAULT_SAVE_DELAY: Duration = Duration::from_millis(1000);

/// Options for [`Session::with_options`](crate::Session::with_options).
#[derive(Debug, Clone)]
pub struct SessionOptions {
    /// Credential store file. `None` uses [`paths::store_path`](crate::paths::store_path).
    pub store_path: Option<PathBuf>,
    /// How long the credential stream must be quiet before a save runs.
    pub save_delay: Duration,
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            store_path: None,
            save_delay: DEFAULT_SAVE_DELAY,
        }
    }
}

impl SessionOptions {
    pub fn with_store_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.store_path = Some(path.into());
        self
    }

    pub fn with_save_delay(mut self, delay: Duration) -> Self {
        self.save_delay = delay;
        self
    }
}
