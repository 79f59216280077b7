//! The undo log: a persisted LIFO stack of undo records with removal by id.
//!
//! Reads (`is_empty`, `has_id`, `iter`, `peek_top`) use the snapshot loaded at
//! `open` (or the last `reload`/mutation). Every mutation runs as one critical
//! section under the exclusive process lock: reload from disk, apply, and on
//! success atomically replace the document before the lock is released.
pub mod document;
pub(crate) mod retention;

use std::fs;
use std::path::{Path, PathBuf};

use time::OffsetDateTime;

use crate::adapters::LockManager;
use crate::api::errors::UndeleteError;
use crate::constants::{DEFAULT_LOCK_TIMEOUT_MS, DEFAULT_MAX_RECORDS};
use crate::fs::atomic::{atomic_write, fsync_parent_dir};
use crate::types::{UndoId, UndoRecord, UndoRecordDraft};

pub use document::LogState;

pub struct UndoLog {
    path: PathBuf,
    lock: Box<dyn LockManager>,
    lock_timeout_ms: u64,
    max_records: Option<usize>,
    state: LogState,
}

impl std::fmt::Debug for UndoLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UndoLog")
            .field("path", &self.path)
            .field("lock", &self.lock.backend())
            .field("len", &self.state.records.len())
            .finish_non_exhaustive()
    }
}

fn load(path: &Path) -> Result<LogState, UndeleteError> {
    match fs::read(path) {
        Ok(bytes) => Ok(document::decode(&bytes)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(LogState::default()),
        Err(e) => Err(UndeleteError::FilesystemError(format!(
            "cannot read undo log {}: {e}",
            path.display()
        ))),
    }
}

fn ensure_parent_dir(path: &Path) -> Result<(), UndeleteError> {
    let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) else {
        return Ok(());
    };
    if parent.is_dir() {
        return Ok(());
    }
    fs::create_dir_all(parent).map_err(|e| {
        UndeleteError::FilesystemError(format!("cannot create {}: {e}", parent.display()))
    })?;
    if let Err(e) = fsync_parent_dir(parent) {
        log::warn!("cannot fsync parent of new state dir {}: {e}", parent.display());
    }
    Ok(())
}

impl UndoLog {
    /// Load the log at `path`; a missing file is an empty log.
    ///
    /// # Errors
    ///
    /// `PersistenceCorruption` if the file exists but fails verification,
    /// `FilesystemError` if it cannot be read.
    pub fn open(path: impl Into<PathBuf>, lock: Box<dyn LockManager>) -> Result<Self, UndeleteError> {
        let path = path.into();
        let state = load(&path)?;
        log::debug!(
            "undo log {} opened with {} record(s)",
            path.display(),
            state.records.len()
        );
        Ok(Self {
            path,
            lock,
            lock_timeout_ms: DEFAULT_LOCK_TIMEOUT_MS,
            max_records: Some(DEFAULT_MAX_RECORDS),
            state,
        })
    }

    #[must_use]
    pub fn with_lock_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.lock_timeout_ms = timeout_ms;
        self
    }

    #[must_use]
    pub fn with_max_records(mut self, max_records: Option<usize>) -> Self {
        self.max_records = max_records;
        self
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn lock_backend(&self) -> &'static str {
        self.lock.backend()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.records.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.state.records.len()
    }

    #[must_use]
    pub fn high_water(&self) -> Option<UndoId> {
        self.state.high_water
    }

    fn position(records: &[UndoRecord], id: &UndoId) -> Option<usize> {
        // Ids are strictly increasing (checked on load and maintained by push).
        records.binary_search_by(|r| r.id().cmp(id)).ok()
    }

    #[must_use]
    pub fn has_id(&self, id: &UndoId) -> bool {
        Self::position(&self.state.records, id).is_some()
    }

    /// Oldest-first traversal. Calling again restarts from the oldest record.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (UndoId, &UndoRecord)> + ExactSizeIterator + '_ {
        self.state.records.iter().map(|r| (r.id(), r))
    }

    /// The most recently pushed record.
    #[must_use]
    pub fn peek_top(&self) -> Option<&UndoRecord> {
        self.state.records.last()
    }

    /// Refresh the snapshot from disk.
    ///
    /// # Errors
    ///
    /// Same as `open`.
    pub fn reload(&mut self) -> Result<(), UndeleteError> {
        self.state = load(&self.path)?;
        Ok(())
    }

    /// Append `draft` at the top with a fresh id and persist.
    ///
    /// # Errors
    ///
    /// `InvalidRecord` for a draft that could never be restored; otherwise
    /// locking, corruption or filesystem errors.
    pub fn push(&mut self, draft: UndoRecordDraft) -> Result<UndoId, UndeleteError> {
        self.push_at(draft, OffsetDateTime::now_utc())
    }

    /// `push` with an explicit creation time.
    ///
    /// # Errors
    ///
    /// See [`UndoLog::push`].
    pub fn push_at(&mut self, draft: UndoRecordDraft, now: OffsetDateTime) -> Result<UndoId, UndeleteError> {
        draft.validate()?;
        let max_records = self.max_records;
        self.transact(move |state| {
            let id = UndoId::next_after(now, state.high_water.as_ref());
            let timestamp = UndoId::new(now).at();
            state.records.push(draft.into_record(id, timestamp));
            state.high_water = Some(id);
            let pruned = retention::prune_oldest(&mut state.records, max_records);
            if pruned.pruned_count > 0 {
                log::debug!(
                    "undo log retention dropped {} record(s), {} retained",
                    pruned.pruned_count,
                    pruned.retained_count
                );
            }
            Ok((id, true))
        })
    }

    /// Hand the top record to `action` and remove it only if `action` succeeds.
    ///
    /// # Errors
    ///
    /// `EmptyLog` when there is nothing to pop; any error from `action`, in
    /// which case the record stays in the log.
    pub fn pop<T, F>(&mut self, action: F) -> Result<T, UndeleteError>
    where
        F: FnOnce(&UndoRecord) -> Result<T, UndeleteError>,
    {
        self.transact(|state| {
            let Some(top) = state.records.last() else {
                return Err(UndeleteError::EmptyLog);
            };
            let value = action(top)?;
            state.records.pop();
            Ok((value, true))
        })
    }

    /// `pop` for an arbitrary record.
    ///
    /// # Errors
    ///
    /// `UnknownId` when no record carries `id`; any error from `action`, in
    /// which case the record stays in the log.
    pub fn delete<T, F>(&mut self, id: &UndoId, action: F) -> Result<T, UndeleteError>
    where
        F: FnOnce(&UndoRecord) -> Result<T, UndeleteError>,
    {
        self.transact(|state| {
            let Some(idx) = Self::position(&state.records, id) else {
                return Err(UndeleteError::UnknownId(id.to_string()));
            };
            let value = action(&state.records[idx])?;
            state.records.remove(idx);
            Ok((value, true))
        })
    }

    /// Reload, mutate and persist under the process lock.
    ///
    /// `f` returns the value and whether the state changed. Nothing is written
    /// when `f` fails or reports no change.
    fn transact<T, F>(&mut self, f: F) -> Result<T, UndeleteError>
    where
        F: FnOnce(&mut LogState) -> Result<(T, bool), UndeleteError>,
    {
        ensure_parent_dir(&self.path)?;
        let _guard = self.lock.acquire_process_lock(self.lock_timeout_ms)?;
        self.state = load(&self.path)?;
        let mut next = self.state.clone();
        let (value, dirty) = f(&mut next)?;
        if dirty {
            document::validate(&next)?;
            let bytes = document::encode(&next)?;
            atomic_write(&self.path, &bytes).map_err(|e| {
                UndeleteError::FilesystemError(format!(
                    "cannot write undo log {}: {e}",
                    self.path.display()
                ))
            })?;
            self.state = next;
        }
        Ok(value)
    }
}
