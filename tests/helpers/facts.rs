// tests/helpers/facts.rs
// Capturing sinks for facts and audit lines.

use std::sync::{Arc, Mutex};

use log::Level;
use policy_undelete::logging::{AuditSink, FactsEmitter};
use serde_json::Value;

#[derive(Default, Clone, Debug)]
pub struct TestEmitter {
    pub events: Arc<Mutex<Vec<(String, String, String, Value)>>>,
}

impl FactsEmitter for TestEmitter {
    fn emit(&self, subsystem: &str, event: &str, decision: &str, fields: Value) {
        self.events.lock().unwrap().push((
            subsystem.to_string(),
            event.to_string(),
            decision.to_string(),
            fields,
        ));
    }
}

impl TestEmitter {
    /// `(event, decision)` pairs in emission order.
    pub fn stages(&self) -> Vec<(String, String)> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .map(|(_, e, d, _)| (e.clone(), d.clone()))
            .collect()
    }

    pub fn fields_of(&self, event: &str) -> Vec<Value> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter(|(_, e, _, _)| e == event)
            .map(|(_, _, _, f)| f.clone())
            .collect()
    }
}

#[derive(Default, Clone, Debug)]
pub struct TestAudit {
    pub lines: Arc<Mutex<Vec<(Level, String)>>>,
}

impl AuditSink for TestAudit {
    fn log(&self, level: Level, msg: &str) {
        self.lines.lock().unwrap().push((level, msg.to_string()));
    }
}

impl TestAudit {
    pub fn messages(&self) -> Vec<String> {
        self.lines
            .lock()
            .unwrap()
            .iter()
            .map(|(_, m)| m.clone())
            .collect()
    }
}
