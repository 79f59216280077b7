//! Restore stage: replays one undo record against the policy server.
//!
//! Side-effects:
//! - Sends one `PUT` per revision unit; units are independent and a failed unit
//!   never stops the remaining ones.
//! - Removes the record from the undo log on full success, and on partial
//!   failure only under `PartialFailurePolicy::Consume`.
//! - Emits `restore.attempt` before the log transaction, then one `restore.unit`
//!   per unit and `restore.result` once it has finished, on the calling thread.
use std::thread;
use std::time::Instant;

use log::Level;
use serde_json::json;

use crate::adapters::{PolicyClient, TransportError};
use crate::api::errors::UndeleteError;
use crate::api::Undeleter;
use crate::config::PartialFailurePolicy;
use crate::logging::audit::AuditCtx;
use crate::logging::redact::ts_for;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::ids::run_id;
use crate::types::{FailedUnit, PolicyRevision, RestoreReport, RevisionRef, UndoId, UndoRecord};

/// Result of sending one revision unit.
#[derive(Debug)]
pub(crate) struct UnitOutcome {
    pub revision: RevisionRef,
    pub rel_uri: String,
    pub result: Result<(), TransportError>,
}

fn put_one(client: &dyn PolicyClient, rev: &PolicyRevision) -> UnitOutcome {
    let rel_uri = rev.rel_uri();
    let result = client.put(&rel_uri, &rev.data);
    UnitOutcome {
        revision: rev.key(),
        rel_uri,
        result,
    }
}

/// Send every revision, at most `concurrency` at a time. Outcomes come back in
/// stored order whatever the completion order.
pub(crate) fn put_all(
    client: &dyn PolicyClient,
    revisions: &[PolicyRevision],
    concurrency: usize,
) -> Vec<UnitOutcome> {
    if concurrency <= 1 || revisions.len() <= 1 {
        return revisions.iter().map(|rev| put_one(client, rev)).collect();
    }
    let mut out = Vec::with_capacity(revisions.len());
    for wave in revisions.chunks(concurrency) {
        thread::scope(|s| {
            let handles: Vec<_> = wave
                .iter()
                .map(|rev| (rev, s.spawn(move || put_one(client, rev))))
                .collect();
            for (rev, h) in handles {
                out.push(h.join().unwrap_or_else(|_| UnitOutcome {
                    revision: rev.key(),
                    rel_uri: rev.rel_uri(),
                    result: Err(TransportError::Request("restore worker panicked".to_string())),
                }));
            }
        });
    }
    out
}

pub(crate) fn build_report(record: &UndoRecord, units: &[UnitOutcome], duration_ms: u64) -> RestoreReport {
    let mut restored = Vec::new();
    let mut failed = Vec::new();
    for u in units {
        match &u.result {
            Ok(()) => restored.push(u.revision.clone()),
            Err(e) => failed.push(FailedUnit {
                revision: u.revision.clone(),
                reason: e.to_string(),
            }),
        }
    }
    RestoreReport {
        record_id: record.id(),
        description: record.description().to_string(),
        policy_group: record.primary_policy_group().map(str::to_string),
        restored,
        failed,
        duration_ms,
        consumed: false,
    }
}

fn elapsed_ms(t0: Instant) -> u64 {
    u64::try_from(t0.elapsed().as_millis()).unwrap_or(u64::MAX)
}

// Outer error keeps the record in the log; an inner error is reported after
// the record has been removed.
type ActionResult = Result<Result<RestoreReport, UndeleteError>, UndeleteError>;

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(
    api: &mut Undeleter<E, A>,
    target: Option<&UndoId>,
) -> Result<RestoreReport, UndeleteError> {
    let t0 = Instant::now();
    let redact = api.config.audit.redact;
    let policy = api.config.replay.partial_failure;
    let concurrency = api.config.replay.concurrency;

    // The snapshot top names the record a latest restore expects to take;
    // the transaction reloads and may find a newer one.
    let expected = target
        .copied()
        .or_else(|| api.log.peek_top().map(UndoRecord::id));
    let rid = run_id("restore", expected.as_ref());
    let tctx = AuditCtx::new(&api.facts, rid.to_string(), ts_for(redact), redact);
    let slog = StageLogger::new(&tctx);

    let mut attempt = slog
        .restore_attempt()
        .field("target", json!(if target.is_some() { "by_id" } else { "latest" }))
        .field("lock_backend", json!(api.log.lock_backend()));
    if let Some(id) = expected {
        attempt = attempt.record(id);
    }
    attempt.emit_success();

    let mut replayed: Option<(UndoId, Vec<UnitOutcome>)> = None;
    let result = match (target, api.client.as_deref()) {
        (Some(id), _) if !api.log.has_id(id) => Err(UndeleteError::UnknownId(id.to_string())),
        (None, _) if api.log.is_empty() => Err(UndeleteError::EmptyLog),
        (_, None) => Err(UndeleteError::Config(
            "no policy server configured; set server.base_url".to_string(),
        )),
        (_, Some(client)) => {
            let action = |rec: &UndoRecord| -> ActionResult {
                if rec.policy_revisions().is_empty() {
                    return Err(UndeleteError::InvalidRecord(format!(
                        "record {} has no policy revisions",
                        rec.id()
                    )));
                }
                let units = put_all(client, rec.policy_revisions(), concurrency);
                let mut report = build_report(rec, &units, elapsed_ms(t0));
                replayed = Some((rec.id(), units));
                if report.is_success() {
                    report.consumed = true;
                    return Ok(Ok(report));
                }
                match policy {
                    PartialFailurePolicy::Retain => Err(UndeleteError::PartialFailure(Box::new(report))),
                    PartialFailurePolicy::Consume => {
                        report.consumed = true;
                        Ok(Err(UndeleteError::PartialFailure(Box::new(report))))
                    }
                }
            };
            let outcome = match target {
                None => api.log.pop(action),
                Some(id) => api.log.delete(id, action),
            };
            outcome.and_then(|inner| inner)
        }
    };

    let record_id = replayed.as_ref().map(|(id, _)| *id).or(expected);

    if let Some((id, units)) = &replayed {
        for u in units {
            let ev = slog.restore_unit().record(id).merge(&json!({
                "policy_group": u.revision.policy_group,
                "policy_name": u.revision.policy_name,
                "rel_uri": u.rel_uri,
            }));
            match &u.result {
                Ok(()) => {
                    ev.emit_success();
                    api.audit.log(
                        Level::Info,
                        &format!("Restored policy '{}'", u.revision.policy_name),
                    );
                }
                Err(e) => {
                    ev.field("error", json!(e.to_string())).emit_failure();
                    api.audit.log(
                        Level::Warn,
                        &format!(
                            "Failed to restore policy '{}' in policy group '{}': {e}",
                            u.revision.policy_name, u.revision.policy_group
                        ),
                    );
                }
            }
        }
    }

    let mut fin = slog.restore_result();
    if let Some(id) = record_id {
        fin = fin.record(id);
    }
    match &result {
        Ok(report) => {
            fin.merge(&json!({
                "restored_count": report.restored.len(),
                "failed_count": 0,
                "consumed": report.consumed,
                "duration_ms": report.duration_ms,
            }))
            .emit_success();
            if let Some(group) = &report.policy_group {
                api.audit
                    .log(Level::Info, &format!("Restored policy group '{group}'"));
            }
        }
        Err(e) => {
            let mut fin = fin
                .error_id(e.error_id())
                .field("error", json!(e.to_string()))
                .field("duration_ms", json!(elapsed_ms(t0)));
            if let Some(report) = e.partial_report() {
                fin = fin.merge(&json!({
                    "restored_count": report.restored.len(),
                    "failed_count": report.failed.len(),
                    "consumed": report.consumed,
                }));
            }
            fin.emit_failure();
        }
    }
    result
}
