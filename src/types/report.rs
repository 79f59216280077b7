use std::fmt;

use serde::Serialize;

use super::ids::UndoId;

/// Address of one revision unit on the server.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct RevisionRef {
    pub policy_group: String,
    pub policy_name: String,
}

impl fmt::Display for RevisionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.policy_group, self.policy_name)
    }
}

/// A revision unit the server did not accept, with the transport's reason.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct FailedUnit {
    pub revision: RevisionRef,
    pub reason: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RestoreReport {
    pub record_id: UndoId,
    pub description: String,
    pub policy_group: Option<String>,
    pub restored: Vec<RevisionRef>,
    pub failed: Vec<FailedUnit>,
    pub duration_ms: u64,
    /// Whether the record was removed from the undo log.
    pub consumed: bool,
}

impl RestoreReport {
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }

    #[must_use]
    pub fn total_units(&self) -> usize {
        self.restored.len() + self.failed.len()
    }

    /// `group/name` pairs of the failed units, comma separated.
    #[must_use]
    pub fn failed_list(&self) -> String {
        self.failed
            .iter()
            .map(|u| u.revision.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// One line of `list` output.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ListingEntry {
    pub id: UndoId,
    pub description: String,
}

impl fmt::Display for ListingEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.id, self.description)
    }
}

/// Newest-first view of the undo log. An empty log is reported explicitly.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Listing {
    NothingToUndo,
    Entries(Vec<ListingEntry>),
}

impl Listing {
    #[must_use]
    pub fn lines(&self) -> Vec<String> {
        match self {
            Listing::NothingToUndo => Vec::new(),
            Listing::Entries(entries) => entries.iter().map(ToString::to_string).collect(),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PruneResult {
    pub pruned_count: usize,
    pub retained_count: usize,
}
