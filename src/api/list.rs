use serde_json::json;

use crate::api::Undeleter;
use crate::logging::audit::AuditCtx;
use crate::logging::redact::ts_for;
use crate::logging::{AuditSink, FactsEmitter, StageLogger};
use crate::types::ids::run_id;
use crate::types::{Listing, ListingEntry};

pub(crate) fn run<E: FactsEmitter, A: AuditSink>(api: &Undeleter<E, A>) -> Listing {
    let entries: Vec<ListingEntry> = api
        .log
        .iter()
        .rev()
        .map(|(id, rec)| ListingEntry {
            id,
            description: rec.description().to_string(),
        })
        .collect();

    let redact = api.config.audit.redact;
    let tctx = AuditCtx::new(
        &api.facts,
        run_id("list", None).to_string(),
        ts_for(redact),
        redact,
    );
    let mut ev = StageLogger::new(&tctx).list().field("count", json!(entries.len()));
    if let Some(top) = entries.first() {
        ev = ev.field("top", json!(top.id.to_string()));
    }
    ev.emit_success();

    if entries.is_empty() {
        Listing::NothingToUndo
    } else {
        Listing::Entries(entries)
    }
}
