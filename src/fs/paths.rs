//! Path helpers for the undo log and its lock file.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_LOG_FILE, DEFAULT_STATE_DIR, LOCK_SUFFIX};

/// `$HOME/.chef/policy_undo/undo_log.json`, or relative to the working directory when `HOME` is unset.
#[must_use]
pub fn default_log_path() -> PathBuf {
    let home = std::env::var_os("HOME").map_or_else(|| PathBuf::from("."), PathBuf::from);
    home.join(DEFAULT_STATE_DIR).join(DEFAULT_LOG_FILE)
}

/// Lock file guarding `log_path` (`<log_path>.lock`).
#[must_use]
pub fn lock_path_for(log_path: &Path) -> PathBuf {
    let mut s = OsString::from(log_path.as_os_str());
    s.push(LOCK_SUFFIX);
    PathBuf::from(s)
}
