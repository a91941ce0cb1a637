//! Crash-safe file storage for association credentials.

use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, instrument};

use kpa_core::Credentials;

use crate::{Result, paths};

#[cfg(unix)]
use std::os::unix::fs::OpenOptionsExt;

/// A temp file untouched for this long belongs to a save that will never
/// finish. Younger ones may still be in use by another process.
pub const STALE_TEMP_AGE: Duration = Duration::from_secs(30);

/// A single file holding the last saved [`Credentials`].
///
/// The file is only ever replaced by renaming a fully written sibling
/// `<name>.tmp` over it, so it holds either a complete previous version or
/// does not exist. Contents are the JSON encoding of [`Credentials`].
#[derive(Debug, Clone)]
pub struct CredentialStore {
    path: PathBuf,
}

impl CredentialStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a store at the platform default location.
    pub fn at_default_location() -> Result<Self> {
        Ok(Self::new(paths::store_path()?))
    }

    /// Get the store file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the sibling temp file path used while saving.
    pub fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    /// Read the stored credentials.
    ///
    /// A missing, unreadable or undecodable file means "nothing stored" and
    /// yields `None`.
    pub fn load(&self) -> Option<Credentials> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Credentials could not be read from disk");
                return None;
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                debug!(path = %self.path.display(), error = %e, "Credentials on disk could not be decoded");
                None
            }
        }
    }

    /// Atomically replace the stored credentials.
    ///
    /// On failure the previously stored file is left as it was and the temp
    /// file this call created is removed again, so the next save starts clean.
    #[instrument(skip(self, credentials), fields(path = %self.path.display()))]
    pub fn save(&self, credentials: &Credentials) -> Result<()> {
        debug!("Attempting to save credentials");
        let temp_path = self.write_temp(credentials)?;
        if let Err(e) = fs::rename(&temp_path, &self.path) {
            self.abandon_temp(&temp_path);
            return Err(e.into());
        }
        debug!("Credentials saved");
        Ok(())
    }

    /// Write `credentials` to the temp file without publishing it.
    ///
    /// The temp file is opened with `create_new`, so a concurrent writer makes
    /// this fail instead of interleaving. A leftover older than
    /// [`STALE_TEMP_AGE`] is discarded and the open retried once.
    pub(crate) fn write_temp(&self, credentials: &Credentials) -> Result<PathBuf> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let payload = serde_json::to_vec(credentials)?;
        let temp_path = self.temp_path();

        let mut file = match open_temp(&temp_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists && self.discard_stale_temp() => {
                open_temp(&temp_path)?
            }
            Err(e) => return Err(e.into()),
        };

        let written = file
            .write_all(&payload)
            .and_then(|()| file.flush())
            .and_then(|()| file.sync_all());
        if let Err(e) = written {
            drop(file);
            self.abandon_temp(&temp_path);
            return Err(e.into());
        }

        Ok(temp_path)
    }

    /// Remove a temp file left behind by an interrupted save.
    ///
    /// Only a temp file older than [`STALE_TEMP_AGE`] is removed; a younger
    /// one may be another process's save in progress. Returns true if a file
    /// was removed.
    pub fn discard_stale_temp(&self) -> bool {
        let temp_path = self.temp_path();
        let age = fs::metadata(&temp_path)
            .and_then(|meta| meta.modified())
            .map(|modified| modified.elapsed().unwrap_or_default());

        match age {
            Ok(age) if age >= STALE_TEMP_AGE => {}
            Ok(age) => {
                debug!(path = %temp_path.display(), age_ms = age.as_millis() as u64, "Temp file is recent, leaving it in place");
                return false;
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => return false,
            Err(e) => {
                debug!(path = %temp_path.display(), error = %e, "Could not inspect temp file");
                return false;
            }
        }

        match fs::remove_file(&temp_path) {
            Ok(()) => {
                debug!(path = %temp_path.display(), "Removed stale temp file");
                true
            }
            Err(e) => {
                debug!(path = %temp_path.display(), error = %e, "Could not remove stale temp file");
                false
            }
        }
    }

    fn abandon_temp(&self, temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path) {
            debug!(path = %temp_path.display(), error = %e, "Could not remove temp file after failed save");
        }
    }

    /// Delete the stored credentials, if any.
    pub fn clear(&self) -> Result<bool> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }
}
