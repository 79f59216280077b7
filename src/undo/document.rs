//! On-disk form of the undo log.
//!
//! The whole log is one JSON document (`undo_log.v1`) carrying the id
//! high-water mark, the records oldest first and a SHA-256 digest over the
//! compact encoding of both. Encoding is deterministic, so decoding a document
//! and encoding it again yields the same bytes.
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::constants::LOG_SCHEMA;
use crate::types::errors::{Error, ErrorKind, Result};
use crate::types::{UndoId, UndoRecord};

/// In-memory contents of the undo log.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogState {
    /// Largest id ever allocated. Survives deletion of the record that carried it.
    pub high_water: Option<UndoId>,
    pub records: Vec<UndoRecord>,
}

#[derive(Serialize)]
struct DigestInput<'a> {
    high_water: &'a Option<UndoId>,
    records: &'a [UndoRecord],
}

#[derive(Serialize)]
struct DocumentOut<'a> {
    schema: &'a str,
    high_water: &'a Option<UndoId>,
    records: &'a [UndoRecord],
    digest: String,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct DocumentIn {
    schema: String,
    high_water: Option<UndoId>,
    records: Vec<UndoRecord>,
    digest: String,
}

/// Hex SHA-256 over the compact JSON of `high_water` and `records`.
///
/// # Errors
///
/// Returns `ErrorKind::Io` if the state cannot be serialized.
pub fn digest_of(state: &LogState) -> Result<String> {
    let bytes = serde_json::to_vec(&DigestInput {
        high_water: &state.high_water,
        records: &state.records,
    })
    .map_err(|e| Error::new(ErrorKind::Io, format!("cannot serialize undo log: {e}")))?;
    Ok(hex::encode(Sha256::digest(&bytes)))
}

/// # Errors
///
/// Returns `ErrorKind::Io` if the state cannot be serialized.
pub fn encode(state: &LogState) -> Result<Vec<u8>> {
    let doc = DocumentOut {
        schema: LOG_SCHEMA,
        high_water: &state.high_water,
        records: &state.records,
        digest: digest_of(state)?,
    };
    let mut out = serde_json::to_vec_pretty(&doc)
        .map_err(|e| Error::new(ErrorKind::Io, format!("cannot serialize undo log: {e}")))?;
    out.push(b'\n');
    Ok(out)
}

/// Parse and verify a persisted document.
///
/// # Errors
///
/// Returns `ErrorKind::Corrupt` for an empty, unparseable, foreign-schema,
/// digest-mismatched or structurally invalid document.
pub fn decode(bytes: &[u8]) -> Result<LogState> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(Error::corrupt("undo log is empty"));
    }
    let doc: DocumentIn = serde_json::from_slice(bytes)
        .map_err(|e| Error::corrupt(format!("cannot parse undo log: {e}")))?;
    if doc.schema != LOG_SCHEMA {
        return Err(Error::corrupt(format!(
            "unsupported undo log schema '{}' (expected '{LOG_SCHEMA}')",
            doc.schema
        )));
    }
    let state = LogState {
        high_water: doc.high_water,
        records: doc.records,
    };
    if digest_of(&state)? != doc.digest {
        return Err(Error::corrupt("undo log digest mismatch"));
    }
    validate(&state)?;
    Ok(state)
}

/// # Errors
///
/// Returns `ErrorKind::Corrupt` if ids are not strictly increasing, the
/// high-water mark is behind the newest record, or a record is malformed.
pub fn validate(state: &LogState) -> Result<()> {
    let mut prev: Option<UndoId> = None;
    for rec in &state.records {
        rec.validate()
            .map_err(|e| Error::corrupt(format!("record {}: {}", rec.id(), e.msg)))?;
        if prev.is_some_and(|p| p >= rec.id()) {
            return Err(Error::corrupt(format!(
                "record ids out of order at {}",
                rec.id()
            )));
        }
        prev = Some(rec.id());
    }
    match (prev, state.high_water) {
        (Some(last), None) => Err(Error::corrupt(format!(
            "missing high-water mark for record {last}"
        ))),
        (Some(last), Some(hw)) if hw < last => Err(Error::corrupt(format!(
            "high-water mark {hw} is behind record {last}"
        ))),
        _ => Ok(()),
    }
}
