//! Undo records: the prior state of deleted policies and the groups they belonged to.
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::errors::{Error, ErrorKind, Result};
use super::ids::UndoId;
use super::report::RevisionRef;

/// Serde adapter storing opaque payloads as base64 so they are resent byte-for-byte.
mod payload {
    use super::STANDARD;
    use base64::Engine as _;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub(super) fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub(super) fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        STANDARD.decode(s.as_bytes()).map_err(de::Error::custom)
    }
}

/// One revision unit: the document a policy held inside a policy group before deletion.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyRevision {
    pub policy_group: String,
    pub policy_name: String,
    #[serde(with = "payload")]
    pub data: Vec<u8>,
}

impl PolicyRevision {
    pub fn new(
        policy_group: impl Into<String>,
        policy_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        Self {
            policy_group: policy_group.into(),
            policy_name: policy_name.into(),
            data: data.into(),
        }
    }

    /// Server-relative URI the revision is restored to.
    #[must_use]
    pub fn rel_uri(&self) -> String {
        format!(
            "/policy_groups/{}/policies/{}",
            self.policy_group, self.policy_name
        )
    }

    #[must_use]
    pub fn key(&self) -> RevisionRef {
        RevisionRef {
            policy_group: self.policy_group.clone(),
            policy_name: self.policy_name.clone(),
        }
    }
}

fn check_invariants(policy_groups: &[String], policy_revisions: &[PolicyRevision]) -> Result<()> {
    if policy_groups.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidRecord,
            "undo record names no policy group",
        ));
    }
    if policy_revisions.is_empty() {
        return Err(Error::new(
            ErrorKind::InvalidRecord,
            "undo record has no policy revisions to restore",
        ));
    }
    for rev in policy_revisions {
        if rev.policy_group.is_empty() || rev.policy_name.is_empty() {
            return Err(Error::new(
                ErrorKind::InvalidRecord,
                "policy revision with empty policy group or policy name",
            ));
        }
        if !policy_groups.iter().any(|g| *g == rev.policy_group) {
            return Err(Error::new(
                ErrorKind::InvalidRecord,
                format!(
                    "policy revision '{}' references policy group '{}' which the record does not list",
                    rev.policy_name, rev.policy_group
                ),
            ));
        }
    }
    Ok(())
}

/// A persisted, numbered undo record. Immutable once pushed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoRecord {
    id: UndoId,
    #[serde(with = "time::serde::rfc3339")]
    timestamp: OffsetDateTime,
    description: String,
    policy_groups: Vec<String>,
    policy_revisions: Vec<PolicyRevision>,
}

impl UndoRecord {
    #[must_use]
    pub const fn id(&self) -> UndoId {
        self.id
    }

    #[must_use]
    pub const fn timestamp(&self) -> OffsetDateTime {
        self.timestamp
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn policy_groups(&self) -> &[String] {
        &self.policy_groups
    }

    #[must_use]
    pub fn policy_revisions(&self) -> &[PolicyRevision] {
        &self.policy_revisions
    }

    /// The group the deletion was issued against; reported after a full restore.
    #[must_use]
    pub fn primary_policy_group(&self) -> Option<&str> {
        self.policy_groups.first().map(String::as_str)
    }

    /// Check the structural invariants of a loaded record.
    ///
    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidRecord` naming the first violated invariant.
    pub fn validate(&self) -> Result<()> {
        check_invariants(&self.policy_groups, &self.policy_revisions)
    }
}

/// An undo record before the log has assigned it an id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct UndoRecordDraft {
    pub description: String,
    pub policy_groups: Vec<String>,
    pub policy_revisions: Vec<PolicyRevision>,
}

impl UndoRecordDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_policy_group(mut self, policy_group: impl Into<String>) -> Self {
        let g = policy_group.into();
        if !self.policy_groups.contains(&g) {
            self.policy_groups.push(g);
        }
        self
    }

    #[must_use]
    pub fn with_policy_revision(
        mut self,
        policy_group: impl Into<String>,
        policy_name: impl Into<String>,
        data: impl Into<Vec<u8>>,
    ) -> Self {
        self.policy_revisions
            .push(PolicyRevision::new(policy_group, policy_name, data));
        self
    }

    /// # Errors
    ///
    /// Returns `ErrorKind::InvalidRecord` when the draft could never be restored.
    pub fn validate(&self) -> Result<()> {
        check_invariants(&self.policy_groups, &self.policy_revisions)
    }

    pub(crate) fn into_record(self, id: UndoId, timestamp: OffsetDateTime) -> UndoRecord {
        UndoRecord {
            id,
            timestamp,
            description: self.description,
            policy_groups: self.policy_groups,
            policy_revisions: self.policy_revisions,
        }
    }
}
