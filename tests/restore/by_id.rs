use policy_undelete::api::errors::UndeleteError;
use policy_undelete::types::UndoId;

use crate::helpers::{draft, Harness, TestRoot};

#[test]
fn restore_by_id_removes_only_that_record() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    let a = log.push(draft("prod", &["a"])).unwrap();
    let b = log.push(draft("prod", &["b"])).unwrap();
    let c = log.push(draft("prod", &["c"])).unwrap();

    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    let report = u.restore_by_id(&b).unwrap();
    assert_eq!(report.record_id, b);
    assert_eq!(h.client.uris(), ["/policy_groups/prod/policies/b"]);

    let left: Vec<UndoId> = root.open_log().iter().map(|(id, _)| id).collect();
    assert_eq!(left, [a, c]);
}

#[test]
fn unknown_id_leaves_the_log_untouched() {
    let root = TestRoot::new();
    root.open_log().push(draft("prod", &["a"])).unwrap();
    let before = root.log_bytes();

    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    let ghost: UndoId = "1999-12-31T23:59:59Z".parse().unwrap();
    let err = u.restore_by_id(&ghost).unwrap_err();
    assert!(matches!(err, UndeleteError::UnknownId(ref s) if s == "1999-12-31T23:59:59Z"));
    assert_eq!(err.exit_code(), 20);
    assert!(h.client.calls().is_empty());
    assert_eq!(root.log_bytes(), before);
}

#[test]
fn restoring_the_same_id_twice_is_unknown_the_second_time() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["a"])).unwrap();
    let h = Harness::default();
    let mut u = root.undeleter(&h, root.config());
    u.run(Some(&id)).unwrap();
    let err = u.run(Some(&id)).unwrap_err();
    assert!(matches!(err, UndeleteError::UnknownId(_)));
    assert_eq!(h.client.calls().len(), 1);
}
