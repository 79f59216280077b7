use crate::adapters::{FileLockManager, HttpPolicyClient, LockManager, PolicyClient};
use crate::api::errors::UndeleteError;
use crate::config::Config;
use crate::logging::{AuditSink, FactsEmitter};
use crate::undo::UndoLog;

/// Builder for constructing an Undeleter from a `Config`.
///
/// Opens the undo log behind a `FileLockManager` and builds an
/// `HttpPolicyClient` from `config.server` unless collaborators are injected.
pub struct UndeleterBuilder<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    config: Config,
    client: Option<Box<dyn PolicyClient>>,
    lock: Option<Box<dyn LockManager>>,
}

impl<E: FactsEmitter, A: AuditSink> UndeleterBuilder<E, A> {
    pub fn new(facts: E, audit: A, config: Config) -> Self {
        Self {
            facts,
            audit,
            config,
            client: None,
            lock: None,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: Box<dyn PolicyClient>) -> Self {
        self.client = Some(client);
        self
    }

    #[must_use]
    pub fn with_lock_manager(mut self, lock: Box<dyn LockManager>) -> Self {
        self.lock = Some(lock);
        self
    }

    /// # Errors
    ///
    /// `Config` for unusable settings, or any error from `UndoLog::open`.
    pub fn build(self) -> Result<super::Undeleter<E, A>, UndeleteError> {
        let cfg = self.config;
        if cfg.replay.concurrency == 0 {
            return Err(UndeleteError::Config(
                "replay.concurrency must be at least 1".to_string(),
            ));
        }
        let lock = self
            .lock
            .unwrap_or_else(|| Box::new(FileLockManager::new(cfg.lock_path())));
        let log = UndoLog::open(&cfg.store.log_path, lock)?
            .with_lock_timeout_ms(cfg.store.lock_timeout_ms)
            .with_max_records(cfg.store.max_records);

        let client = match (self.client, cfg.server.base_url.as_deref()) {
            (Some(c), _) => Some(c),
            (None, Some(url)) => {
                let mut http = HttpPolicyClient::new(url, cfg.server.timeout_ms)
                    .map_err(|e| UndeleteError::Config(e.to_string()))?;
                for (name, value) in &cfg.server.headers {
                    http = http.with_header(name.as_str(), value.as_str());
                }
                Some(Box::new(http) as Box<dyn PolicyClient>)
            }
            // Listing works without a server; restores report the gap.
            (None, None) => None,
        };
        Ok(super::Undeleter::new(self.facts, self.audit, cfg, log, client))
    }
}
