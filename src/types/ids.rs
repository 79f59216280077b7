//! Undo record identifiers and deterministic run ids.
//!
//! An `UndoId` is a UTC instant truncated to whole seconds plus a tie-break
//! sequence. It renders as RFC 3339 (`2023-01-01T00:00:00Z`), with a `-<seq>`
//! suffix when more than one record is allocated within the same second
//! (`2023-01-01T00:00:00Z-2`). Ids order by `(instant, seq)`.
use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::{Duration, OffsetDateTime, UtcOffset};
use uuid::Uuid;

use super::errors::{Error, ErrorKind};
use crate::constants::NS_TAG;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UndoId {
    at: OffsetDateTime,
    seq: u32,
}

fn truncate_to_utc_second(at: OffsetDateTime) -> OffsetDateTime {
    let utc = at.to_offset(UtcOffset::UTC);
    utc.replace_nanosecond(0).unwrap_or(utc)
}

impl UndoId {
    /// Id for `at` (truncated to the second) with no tie-break suffix.
    #[must_use]
    pub fn new(at: OffsetDateTime) -> Self {
        Self {
            at: truncate_to_utc_second(at),
            seq: 0,
        }
    }

    #[must_use]
    pub const fn at(&self) -> OffsetDateTime {
        self.at
    }

    #[must_use]
    pub const fn seq(&self) -> u32 {
        self.seq
    }

    /// Allocate the id that follows `high_water` at wall-clock time `now`.
    ///
    /// The result is strictly greater than `high_water`, including when the
    /// clock stalls within a second or moves backwards.
    #[must_use]
    pub fn next_after(now: OffsetDateTime, high_water: Option<&UndoId>) -> Self {
        let now = truncate_to_utc_second(now);
        match high_water {
            Some(hw) if now <= hw.at => match hw.seq.checked_add(1) {
                Some(seq) => Self { at: hw.at, seq },
                None => Self {
                    at: hw.at + Duration::SECOND,
                    seq: 0,
                },
            },
            _ => Self { at: now, seq: 0 },
        }
    }
}

impl fmt::Display for UndoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ts = self.at.format(&Rfc3339).map_err(|_| fmt::Error)?;
        if self.seq == 0 {
            f.write_str(&ts)
        } else {
            write!(f, "{ts}-{}", self.seq)
        }
    }
}

impl FromStr for UndoId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || Error::new(ErrorKind::InvalidId, format!("invalid undo record id '{s}'"));
        let (ts, seq) = match s.rsplit_once("Z-") {
            Some((head, tail)) => {
                let seq = tail.parse::<u32>().map_err(|_| invalid())?;
                (format!("{head}Z"), seq)
            }
            None => (s.to_string(), 0),
        };
        let at = OffsetDateTime::parse(&ts, &Rfc3339).map_err(|_| invalid())?;
        if at.nanosecond() != 0 {
            return Err(invalid());
        }
        let id = Self {
            at: at.to_offset(UtcOffset::UTC),
            seq,
        };
        // Only the canonical rendering is accepted so ids round-trip exactly.
        if id.to_string() != s {
            return Err(invalid());
        }
        Ok(id)
    }
}

impl Serialize for UndoId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for UndoId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|e: Error| de::Error::custom(e.msg))
    }
}

/// Internal: return the UUID namespace used for deterministic run ids.
fn namespace() -> Uuid {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, NS_TAG.as_bytes())
}

/// Compute a deterministic UUIDv5 for one invocation of `op` against `target`.
///
/// Facts from the same operation on the same record share a `run_id` across
/// retries, which lets a reader correlate repeated partial restores.
#[must_use]
pub fn run_id(op: &str, target: Option<&UndoId>) -> Uuid {
    let s = match target {
        Some(id) => format!("{op}:{id}"),
        None => op.to_string(),
    };
    Uuid::new_v5(&namespace(), s.as_bytes())
}
