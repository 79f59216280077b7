use std::sync::{Arc, Mutex};

use policy_undelete::adapters::{PolicyClient, TransportError};
use policy_undelete::logging::TS_ZERO;
use policy_undelete::Undeleter;
use serde_json::json;

use crate::helpers::{draft, Harness, TestAudit, TestEmitter, TestRoot};

#[test]
fn partial_restore_emits_attempt_units_and_result() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["base", "web"])).unwrap();
    let h = Harness::default();
    h.client.fail_policy("web");

    let mut u = root.undeleter(&h, root.config());
    let _ = u.restore_latest();

    let stages = h.facts.stages();
    let expect = [
        ("restore.attempt", "success"),
        ("restore.unit", "success"),
        ("restore.unit", "failure"),
        ("restore.result", "failure"),
    ];
    let got: Vec<(&str, &str)> = stages.iter().map(|(e, d)| (e.as_str(), d.as_str())).collect();
    assert_eq!(got, expect);

    let events = h.facts.events.lock().unwrap();
    let run_id = events[0].3["run_id"].clone();
    for (subsystem, _, _, f) in events.iter() {
        assert_eq!(subsystem, "undelete");
        assert_eq!(f["schema_version"], json!(1));
        assert_eq!(f["run_id"], run_id);
        assert_eq!(f["record_id"], json!(id.to_string()));
        assert_eq!(f["ts"], json!(TS_ZERO));
        assert!(f.get("duration_ms").is_none());
    }
    drop(events);

    let result = &h.facts.fields_of("restore.result")[0];
    assert_eq!(result["error_id"], json!("E_PARTIAL_FAILURE"));
    assert_eq!(result["exit_code"], json!(40));
    assert_eq!(result["restored_count"], json!(1));
    assert_eq!(result["failed_count"], json!(1));
    assert_eq!(result["consumed"], json!(false));

    let units = h.facts.fields_of("restore.unit");
    assert_eq!(units[1]["policy_name"], json!("web"));
    assert!(units[1]["error"].as_str().unwrap().contains("500"));
}

#[test]
fn retries_of_the_same_record_share_a_run_id() {
    let root = TestRoot::new();
    root.open_log().push(draft("prod", &["base"])).unwrap();
    let h = Harness::default();
    h.client.fail_policy("base");
    let mut u = root.undeleter(&h, root.config());
    let _ = u.restore_latest();
    h.client.heal();
    u.restore_latest().unwrap();

    let attempts = h.facts.fields_of("restore.attempt");
    assert_eq!(attempts.len(), 2);
    assert_eq!(attempts[0]["run_id"], attempts[1]["run_id"]);
    let results = h.facts.fields_of("restore.result");
    assert_eq!(results[1]["consumed"], json!(true));
}

#[test]
fn empty_log_result_carries_no_record_id() {
    let root = TestRoot::new();
    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    let _ = u.restore_latest();
    let result = &h.facts.fields_of("restore.result")[0];
    assert_eq!(result["error_id"], json!("E_EMPTY_LOG"));
    assert_eq!(result["exit_code"], json!(10));
    assert!(result["record_id"].is_null());
}

#[test]
fn list_emits_a_count() {
    let root = TestRoot::new();
    root.open_log().push(draft("prod", &["a"])).unwrap();
    let h = Harness::default();
    let u = root.undeleter(&h, root.config());
    let _ = u.list();
    assert_eq!(h.facts.fields_of("list")[0]["count"], json!(1));
}

// Records which stages had been emitted when each PUT went out.
#[derive(Clone, Default)]
struct StageSnooper {
    facts: TestEmitter,
    seen_at_put: Arc<Mutex<Vec<Vec<(String, String)>>>>,
}

impl PolicyClient for StageSnooper {
    fn put(&self, _rel_uri: &str, _body: &[u8]) -> Result<(), TransportError> {
        self.seen_at_put.lock().unwrap().push(self.facts.stages());
        Ok(())
    }
}

#[test]
fn attempt_is_emitted_before_any_request_is_sent() {
    let root = TestRoot::new();
    root.open_log().push(draft("prod", &["base"])).unwrap();
    let client = StageSnooper::default();

    let mut u = Undeleter::builder(client.facts.clone(), TestAudit::default(), root.config())
        .with_client(Box::new(client.clone()))
        .build()
        .unwrap();
    u.restore_latest().unwrap();

    let seen = client.seen_at_put.lock().unwrap();
    assert_eq!(
        seen[0],
        vec![("restore.attempt".to_string(), "success".to_string())]
    );
}
