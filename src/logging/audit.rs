// Audit helpers that emit facts for each undelete stage.
//
// Side-effects:
// - Emits JSON facts via `FactsEmitter` for `restore.attempt`, one `restore.unit`
//   per revision unit, `restore.result` and `list`.
// - Ensures a minimal envelope is present on every fact: `schema_version`, `ts`,
//   `run_id`, `record_id`.
// - Applies redaction when requested to zero timestamps and drop timings.
use serde_json::{json, Value};

use crate::api::errors::{exit_code_for, id_str, ErrorId};
use crate::logging::{redact_event, FactsEmitter};

pub(crate) const SCHEMA_VERSION: i64 = 1;

const SUBSYSTEM: &str = "undelete";

pub(crate) struct AuditCtx<'a> {
    pub facts: &'a dyn FactsEmitter,
    pub run_id: String,
    pub ts: String,
    pub redact: bool,
}

impl<'a> AuditCtx<'a> {
    pub(crate) fn new(facts: &'a dyn FactsEmitter, run_id: String, ts: String, redact: bool) -> Self {
        Self {
            facts,
            run_id,
            ts,
            redact,
        }
    }
}

/// Stage for typed audit emission.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Stage {
    RestoreAttempt,
    RestoreUnit,
    RestoreResult,
    List,
}

impl Stage {
    #[must_use]
    pub const fn as_event(&self) -> &'static str {
        match self {
            Stage::RestoreAttempt => "restore.attempt",
            Stage::RestoreUnit => "restore.unit",
            Stage::RestoreResult => "restore.result",
            Stage::List => "list",
        }
    }
}

/// Decision severity for audit events.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Decision {
    Success,
    Failure,
}

impl Decision {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Decision::Success => "success",
            Decision::Failure => "failure",
        }
    }
}

/// Builder facade over audit emission with centralized envelope+redaction.
pub struct StageLogger<'a> {
    ctx: &'a AuditCtx<'a>,
}

impl<'a> StageLogger<'a> {
    pub(crate) fn new(ctx: &'a AuditCtx<'a>) -> Self {
        Self { ctx }
    }

    pub fn restore_attempt(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RestoreAttempt)
    }
    pub fn restore_unit(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RestoreUnit)
    }
    pub fn restore_result(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::RestoreResult)
    }
    pub fn list(&self) -> EventBuilder<'a> {
        EventBuilder::new(self.ctx, Stage::List)
    }
}

pub struct EventBuilder<'a> {
    ctx: &'a AuditCtx<'a>,
    stage: Stage,
    fields: serde_json::Map<String, Value>,
}

impl<'a> EventBuilder<'a> {
    fn new(ctx: &'a AuditCtx<'a>, stage: Stage) -> Self {
        let mut fields = serde_json::Map::new();
        fields.insert("stage".to_string(), json!(stage.as_event()));
        Self { ctx, stage, fields }
    }

    #[must_use]
    pub fn record(mut self, record_id: impl ToString) -> Self {
        self.fields
            .insert("record_id".into(), json!(record_id.to_string()));
        self
    }

    #[must_use]
    pub fn field(mut self, key: &str, value: Value) -> Self {
        self.fields.insert(key.to_string(), value);
        self
    }

    #[must_use]
    pub fn merge(mut self, extra: &Value) -> Self {
        if let Some(obj) = extra.as_object() {
            for (k, v) in obj {
                self.fields.insert(k.clone(), v.clone());
            }
        }
        self
    }

    /// Attach a stable `error_id` and its `exit_code`.
    #[must_use]
    pub fn error_id(mut self, id: ErrorId) -> Self {
        self.fields.insert("error_id".into(), json!(id_str(id)));
        self.fields.insert("exit_code".into(), json!(exit_code_for(id)));
        self
    }

    pub fn emit(self, decision: Decision) {
        let mut fields = Value::Object(self.fields);
        if let Some(obj) = fields.as_object_mut() {
            obj.entry("decision").or_insert(json!(decision.as_str()));
        }
        redact_and_emit(self.ctx, self.stage.as_event(), decision.as_str(), fields);
    }

    pub fn emit_success(self) {
        self.emit(Decision::Success);
    }
    pub fn emit_failure(self) {
        self.emit(Decision::Failure);
    }
}

fn redact_and_emit(ctx: &AuditCtx<'_>, event: &str, decision: &str, mut fields: Value) {
    if let Some(obj) = fields.as_object_mut() {
        obj.entry("schema_version").or_insert(json!(SCHEMA_VERSION));
        obj.entry("ts").or_insert(json!(ctx.ts));
        obj.entry("run_id").or_insert(json!(ctx.run_id));
        obj.entry("record_id").or_insert(Value::Null);
    }
    let out = if ctx.redact {
        redact_event(fields)
    } else {
        fields
    };
    ctx.facts.emit(SUBSYSTEM, event, decision, out);
}
