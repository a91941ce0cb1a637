//! Location of the credential store.

use std::path::PathBuf;
use std::sync::OnceLock;

use directories::ProjectDirs;

use crate::{Error, Result};

pub const APP_NAME: &str = "keepass-proxy-access";
pub const STORE_FILE_NAME: &str = "keepass-proxy-access.dat";

/// Overrides the platform location when set.
pub const STORE_PATH_ENV: &str = "KPA_STORE_PATH";

static STORE_PATH: OnceLock<Option<PathBuf>> = OnceLock::new();

/// The credential store file for this user.
///
/// `$KPA_STORE_PATH` if set, otherwise `<config dir>/keepass-proxy-access/`
/// `keepass-proxy-access.dat` (`~/.config` on Linux, `~/Library/Application
/// Support` on macOS, `%APPDATA%` on Windows). Resolved once per process.
pub fn store_path() -> Result<PathBuf> {
    STORE_PATH
        .get_or_init(resolve_store_path)
        .clone()
        .ok_or(Error::NoConfigDir)
}

fn resolve_store_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(STORE_PATH_ENV).filter(|p| !p.is_empty()) {
        return Some(PathBuf::from(path));
    }
    let dirs = ProjectDirs::from("", "", APP_NAME)?;
    Some(dirs.config_dir().join(STORE_FILE_NAME))
}
