use log::Level;
use serde_json::Value;

/// Receives structured facts (one JSON object per stage event).
pub trait FactsEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value);
}

/// Receives human-oriented audit lines.
pub trait AuditSink {
    fn log(&self, level: Level, msg: &str);
}

/// Discards everything. Default for library embedding and tests.
#[derive(Default, Clone, Copy, Debug)]
pub struct JsonlSink;

impl FactsEmitter for JsonlSink {
    fn emit(&self, _subsystem: &str, _event: &str, _decision: &str, _fields: Value) {}
}

impl AuditSink for JsonlSink {
    fn log(&self, _level: Level, _msg: &str) {}
}

/// Forwards facts as JSON lines and audit lines to the `log` facade.
///
/// Facts go to target `undelete::facts` at `Debug` (failures at `Warn`);
/// audit lines go to target `undelete::audit` at their own level.
#[derive(Default, Clone, Copy, Debug)]
pub struct LogSink;

impl FactsEmitter for LogSink {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        let level = if decision == "failure" {
            Level::Warn
        } else {
            Level::Debug
        };
        log::log!(target: "undelete::facts", level, "{subsystem} {event} {fields}");
    }
}

impl AuditSink for LogSink {
    fn log(&self, level: Level, msg: &str) {
        log::log!(target: "undelete::audit", level, "{msg}");
    }
}
