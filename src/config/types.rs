use std::path::PathBuf;

use crate::constants::{DEFAULT_HTTP_TIMEOUT_MS, DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_RECORDS};
use crate::fs::paths::default_log_path;

/// What happens to an undo record when only some of its revisions were restored.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PartialFailurePolicy {
    /// Keep the record so the restore can be retried.
    #[default]
    Retain,
    /// Drop the record anyway and report the failed units.
    Consume,
}

#[derive(Clone, Debug)]
pub struct Store {
    pub log_path: PathBuf,
    /// Defaults to `<log_path>.lock` when unset.
    pub lock_path: Option<PathBuf>,
    pub lock_timeout_ms: u64,
    /// Records kept on push; `None` keeps everything.
    pub max_records: Option<usize>,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            log_path: default_log_path(),
            lock_path: None,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            max_records: Some(DEFAULT_MAX_RECORDS),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Replay {
    pub partial_failure: PartialFailurePolicy,
    /// Upper bound on concurrent PUTs while replaying one record.
    pub concurrency: usize,
}

impl Default for Replay {
    fn default() -> Self {
        Self {
            partial_failure: PartialFailurePolicy::Retain,
            concurrency: 1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct Server {
    pub base_url: Option<String>,
    pub timeout_ms: u64,
    pub headers: Vec<(String, String)>,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            base_url: None,
            timeout_ms: DEFAULT_HTTP_TIMEOUT_MS,
            headers: Vec::new(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Audit {
    /// Zero timestamps and drop timings in emitted facts.
    pub redact: bool,
}
