// Facade for API module; delegates to submodules under src/api/

use crate::adapters::PolicyClient;
use crate::config::Config;
use crate::logging::{AuditSink, FactsEmitter};
use crate::types::{Listing, RestoreReport, UndoId};
use crate::undo::UndoLog;

mod builder;
pub mod errors;
mod list;
mod restore;

pub use builder::UndeleterBuilder;
use errors::UndeleteError;

/// Restores deleted policies from the undo log.
///
/// One value per invocation: it owns the log handle, the server client and
/// the sinks facts and audit lines go to.
pub struct Undeleter<E: FactsEmitter, A: AuditSink> {
    facts: E,
    audit: A,
    config: Config,
    log: UndoLog,
    client: Option<Box<dyn PolicyClient>>, // None when no server is configured; list-only
}

impl<E: FactsEmitter, A: AuditSink> Undeleter<E, A> {
    pub fn new(
        facts: E,
        audit: A,
        config: Config,
        log: UndoLog,
        client: Option<Box<dyn PolicyClient>>,
    ) -> Self {
        Self {
            facts,
            audit,
            config,
            log,
            client,
        }
    }

    pub fn builder(facts: E, audit: A, config: Config) -> UndeleterBuilder<E, A> {
        UndeleterBuilder::new(facts, audit, config)
    }

    /// Replay the most recent record and remove it on success.
    ///
    /// # Errors
    ///
    /// `EmptyLog`, `PartialFailure` with the per-unit report, or any
    /// persistence error from the undo log.
    pub fn restore_latest(&mut self) -> Result<RestoreReport, UndeleteError> {
        restore::run(self, None)
    }

    /// Replay the record carrying `id`. An unknown id leaves the log untouched.
    ///
    /// # Errors
    ///
    /// `UnknownId`, otherwise as [`Undeleter::restore_latest`].
    pub fn restore_by_id(&mut self, id: &UndoId) -> Result<RestoreReport, UndeleteError> {
        restore::run(self, Some(id))
    }

    /// Restore `target`, or the latest record when `None`.
    ///
    /// # Errors
    ///
    /// See [`Undeleter::restore_by_id`].
    pub fn run(&mut self, target: Option<&UndoId>) -> Result<RestoreReport, UndeleteError> {
        match target {
            Some(id) => self.restore_by_id(id),
            None => self.restore_latest(),
        }
    }

    /// Newest-first listing of the restorable records.
    pub fn list(&self) -> Listing {
        list::run(self)
    }

    pub fn undo_log(&self) -> &UndoLog {
        &self.log
    }

    /// Mutable access for recording new deletions.
    pub fn undo_log_mut(&mut self) -> &mut UndoLog {
        &mut self.log
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}
