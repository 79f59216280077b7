use thiserror::Error;

use crate::types::RestoreReport;

/// Caller-facing outcome errors for restore and list operations.
///
/// Everything except `PersistenceCorruption` is recoverable: the caller decides
/// how to present it and which exit code to use.
#[derive(Debug, Error)]
pub enum UndeleteError {
    #[error("nothing to undo")]
    EmptyLog,
    #[error("no undo record with id '{0}' exists")]
    UnknownId(String),
    #[error(
        "failed to restore {} of {} policy revisions: {}",
        .0.failed.len(),
        .0.total_units(),
        .0.failed_list()
    )]
    PartialFailure(Box<RestoreReport>),
    #[error("undo log is corrupt: {0}")]
    PersistenceCorruption(String),
    #[error("locking timeout: {0}")]
    LockingTimeout(String),
    #[error("filesystem error: {0}")]
    FilesystemError(String),
    #[error("invalid undo record: {0}")]
    InvalidRecord(String),
    #[error("configuration error: {0}")]
    Config(String),
}

impl UndeleteError {
    #[must_use]
    pub const fn error_id(&self) -> ErrorId {
        match self {
            UndeleteError::EmptyLog => ErrorId::E_EMPTY_LOG,
            UndeleteError::UnknownId(_) => ErrorId::E_UNKNOWN_ID,
            UndeleteError::PartialFailure(_) => ErrorId::E_PARTIAL_FAILURE,
            UndeleteError::PersistenceCorruption(_) => ErrorId::E_CORRUPT_LOG,
            UndeleteError::LockingTimeout(_) => ErrorId::E_LOCKING,
            UndeleteError::FilesystemError(_) => ErrorId::E_FILESYSTEM,
            UndeleteError::InvalidRecord(_) => ErrorId::E_INVALID_RECORD,
            UndeleteError::Config(_) => ErrorId::E_CONFIG,
        }
    }

    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        exit_code_for(self.error_id())
    }

    /// Only a corrupt log aborts an invocation outright.
    #[must_use]
    pub const fn is_fatal(&self) -> bool {
        matches!(self, UndeleteError::PersistenceCorruption(_))
    }

    /// The partial report, when some revision units were restored and others were not.
    #[must_use]
    pub fn partial_report(&self) -> Option<&RestoreReport> {
        match self {
            UndeleteError::PartialFailure(r) => Some(r),
            _ => None,
        }
    }
}

impl From<crate::types::errors::Error> for UndeleteError {
    fn from(e: crate::types::errors::Error) -> Self {
        use crate::types::errors::ErrorKind::{Corrupt, InvalidId, InvalidRecord, Io, Locking};
        match e.kind {
            InvalidId => UndeleteError::UnknownId(e.msg),
            InvalidRecord => UndeleteError::InvalidRecord(e.msg),
            Io => UndeleteError::FilesystemError(e.msg),
            Locking => UndeleteError::LockingTimeout(e.msg),
            Corrupt => UndeleteError::PersistenceCorruption(e.msg),
        }
    }
}

// Stable identifiers emitted in facts and mapped to process exit codes.
// We intentionally keep SCREAMING_SNAKE_CASE to match emitted IDs.
#[allow(non_camel_case_types)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorId {
    E_EMPTY_LOG,
    E_UNKNOWN_ID,
    E_LOCKING,
    E_PARTIAL_FAILURE,
    E_CORRUPT_LOG,
    E_INVALID_RECORD,
    E_FILESYSTEM,
    E_CONFIG,
    E_GENERIC,
}

#[must_use]
pub const fn id_str(id: ErrorId) -> &'static str {
    match id {
        ErrorId::E_EMPTY_LOG => "E_EMPTY_LOG",
        ErrorId::E_UNKNOWN_ID => "E_UNKNOWN_ID",
        ErrorId::E_LOCKING => "E_LOCKING",
        ErrorId::E_PARTIAL_FAILURE => "E_PARTIAL_FAILURE",
        ErrorId::E_CORRUPT_LOG => "E_CORRUPT_LOG",
        ErrorId::E_INVALID_RECORD => "E_INVALID_RECORD",
        ErrorId::E_FILESYSTEM => "E_FILESYSTEM",
        ErrorId::E_CONFIG => "E_CONFIG",
        ErrorId::E_GENERIC => "E_GENERIC",
    }
}

#[must_use]
pub const fn exit_code_for(id: ErrorId) -> i32 {
    match id {
        ErrorId::E_EMPTY_LOG => 10,
        ErrorId::E_UNKNOWN_ID => 20,
        ErrorId::E_LOCKING => 30,
        ErrorId::E_PARTIAL_FAILURE => 40,
        ErrorId::E_CORRUPT_LOG => 50,
        ErrorId::E_INVALID_RECORD => 60,
        ErrorId::E_FILESYSTEM => 70,
        ErrorId::E_CONFIG => 80,
        ErrorId::E_GENERIC => 1,
    }
}
