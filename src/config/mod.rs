pub mod types;

use std::path::PathBuf;

use crate::fs::paths::lock_path_for;

pub use types::{Audit, PartialFailurePolicy, Replay, Server, Store};

/// Config governs where the undo log lives, how replays behave and which server they target.
///
/// Grouped fields provide clearer ownership and ergonomics.
#[derive(Clone, Debug, Default)]
pub struct Config {
    pub store: Store,
    pub replay: Replay,
    pub server: Server,
    pub audit: Audit,
}

impl Config {
    /// Construct a Config with recommended **production defaults**.
    ///
    /// Compared to `Config::default()`:
    /// - `store.lock_timeout_ms = 10_000` to ride out a second operator's restore
    /// - `replay.concurrency = 4`
    ///
    /// Partial failures still retain the record.
    ///
    /// # Example
    /// ```rust
    /// use policy_undelete::config::{Config, PartialFailurePolicy};
    ///
    /// let mut cfg = Config::production_preset();
    /// cfg.server.base_url = Some("https://chef.example.com/organizations/acme".to_string());
    /// assert_eq!(cfg.replay.partial_failure, PartialFailurePolicy::Retain);
    /// ```
    #[must_use]
    pub fn production_preset() -> Self {
        let mut c = Self::default();
        c.apply_production_preset();
        c
    }

    /// Mutate this Config to apply the recommended **production defaults**.
    pub fn apply_production_preset(&mut self) -> &mut Self {
        self.store.lock_timeout_ms = 10_000;
        self.replay.concurrency = 4;
        self
    }

    /// Effective lock file path.
    #[must_use]
    pub fn lock_path(&self) -> PathBuf {
        self.store
            .lock_path
            .clone()
            .unwrap_or_else(|| lock_path_for(&self.store.log_path))
    }
}
