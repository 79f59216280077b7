use policy_undelete::api::errors::UndeleteError;
use policy_undelete::logging::JsonlSink;
use policy_undelete::types::Listing;
use policy_undelete::Undeleter;
use time::macros::datetime;

use crate::helpers::{body_for, draft, Harness, TestRoot};

#[test]
fn restore_latest_replays_the_deleted_policy_and_empties_the_log() {
    let root = TestRoot::new();
    root.open_log()
        .push_at(draft("prod", &["base"]), datetime!(2023-01-01 0:00 UTC))
        .unwrap();

    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    let report = u.restore_latest().unwrap();

    assert_eq!(report.record_id.to_string(), "2023-01-01T00:00:00Z");
    assert!(report.is_success());
    assert!(report.consumed);
    assert_eq!(report.policy_group.as_deref(), Some("prod"));
    assert_eq!(
        h.client.calls(),
        vec![("/policy_groups/prod/policies/base".to_string(), body_for("base"))]
    );
    assert!(u.undo_log().is_empty());
    assert!(root.open_log().is_empty());
    assert_eq!(u.list(), Listing::NothingToUndo);
    assert_eq!(
        h.audit.messages(),
        ["Restored policy 'base'", "Restored policy group 'prod'"]
    );
}

#[test]
fn restore_latest_takes_the_newest_record_only() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    log.push(draft("prod", &["old"])).unwrap();
    log.push(draft("qa", &["new-a", "new-b"])).unwrap();

    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    u.restore_latest().unwrap();
    assert_eq!(
        h.client.uris(),
        [
            "/policy_groups/qa/policies/new-a",
            "/policy_groups/qa/policies/new-b"
        ]
    );
    let left: Vec<_> = u.undo_log().iter().map(|(_, r)| r.description().to_string()).collect();
    assert_eq!(left, ["delete-policy-group prod"]);
}

#[test]
fn empty_log_reports_nothing_to_undo_without_contacting_the_server() {
    let root = TestRoot::new();
    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    let err = u.restore_latest().unwrap_err();
    assert!(matches!(err, UndeleteError::EmptyLog));
    assert_eq!(err.exit_code(), 10);
    assert!(h.client.calls().is_empty());
}

#[test]
fn restore_without_a_server_keeps_the_record() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["base"])).unwrap();
    let mut u = Undeleter::builder(JsonlSink, JsonlSink, root.config())
        .build()
        .unwrap();
    let err = u.run(None).unwrap_err();
    assert!(matches!(err, UndeleteError::Config(_)));
    assert!(root.open_log().has_id(&id));
}

#[test]
fn empty_log_without_a_server_is_nothing_to_undo() {
    let root = TestRoot::new();
    let mut u = Undeleter::builder(JsonlSink, JsonlSink, root.config())
        .build()
        .unwrap();
    let err = u.restore_latest().unwrap_err();
    assert!(matches!(err, UndeleteError::EmptyLog), "{err}");
    assert_eq!(err.exit_code(), 10);
}

#[test]
fn listing_is_newest_first() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    log.push_at(draft("prod", &["a"]), datetime!(2023-01-01 0:00 UTC))
        .unwrap();
    log.push_at(draft("qa", &["b"]), datetime!(2023-01-02 0:00 UTC))
        .unwrap();
    let h = Harness::default();
    let u = root.undeleter(&h, root.config());
    assert_eq!(
        u.list().lines(),
        [
            "2023-01-02T00:00:00Z: delete-policy-group qa",
            "2023-01-01T00:00:00Z: delete-policy-group prod"
        ]
    );
}
