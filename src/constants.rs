//! Shared crate-wide constants for the undelete service.
//!
//! Centralizes magic values and default labels used across modules.
//! Adjusting these here will propagate through the crate.

/// Schema tag written into every persisted undo log document.
pub const LOG_SCHEMA: &str = "undo_log.v1";

/// File name of the undo log inside the state directory.
pub const DEFAULT_LOG_FILE: &str = "undo_log.json";

/// State directory, relative to `$HOME`, holding the undo log.
pub const DEFAULT_STATE_DIR: &str = ".chef/policy_undo";

/// Suffix appended to the log path to name the lock file (`undo_log.json.lock`).
pub const LOCK_SUFFIX: &str = ".lock";

/// Temporary filename suffix used when staging a replacement log document.
/// The temporary name is constructed as `.{fname}.{pid}.{ctr}{TMP_SUFFIX}`.
pub const TMP_SUFFIX: &str = ".undelete.tmp";

/// Poll interval in milliseconds for the file-backed lock manager (see `adapters/lock/file.rs`).
pub const LOCK_POLL_MS: u64 = 25;

/// Default lock timeout used by `UndoLog::open()` unless overridden by `with_lock_timeout_ms()`.
pub const DEFAULT_LOCK_TIMEOUT_MS: u64 = 5_000;

/// Number of undo records kept by default. Older records are dropped on push.
pub const DEFAULT_MAX_RECORDS: usize = 10;

/// Default request timeout for the HTTP policy client.
pub const DEFAULT_HTTP_TIMEOUT_MS: u64 = 30_000;

/// UUIDv5 namespace tag for deterministic run ids.
pub const NS_TAG: &str = "https://policyfile/undelete";
