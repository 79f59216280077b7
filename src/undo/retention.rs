use crate::types::{PruneResult, UndoRecord};

/// Drop the oldest records so at most `limit` remain. Never drops the newest record,
/// so a limit of zero behaves like one.
pub(crate) fn prune_oldest(records: &mut Vec<UndoRecord>, limit: Option<usize>) -> PruneResult {
    let Some(limit) = limit else {
        return PruneResult {
            pruned_count: 0,
            retained_count: records.len(),
        };
    };
    let keep = limit.max(1);
    let excess = records.len().saturating_sub(keep);
    records.drain(..excess);
    PruneResult {
        pruned_count: excess,
        retained_count: records.len(),
    }
}
