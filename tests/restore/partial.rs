use policy_undelete::api::errors::UndeleteError;
use policy_undelete::config::PartialFailurePolicy;

use crate::helpers::{draft, Harness, TestRoot};

#[test]
fn one_failed_unit_is_a_partial_failure_and_the_record_stays() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["base", "web"])).unwrap();
    let h = Harness::default();
    h.client.fail_policy("web");

    let mut u = root.undeleter(&h, root.config());
    let err = u.restore_latest().unwrap_err();
    assert_eq!(err.exit_code(), 40);
    assert_eq!(
        err.to_string(),
        "failed to restore 1 of 2 policy revisions: prod/web"
    );
    let report = err.partial_report().unwrap();
    assert_eq!(report.restored.len(), 1);
    assert_eq!(report.restored[0].policy_name, "base");
    assert!(report.failed[0].reason.contains("500"), "{}", report.failed[0].reason);
    assert!(!report.consumed);

    // The later unit was still attempted after the failed one.
    assert_eq!(h.client.calls().len(), 2);
    assert!(u.undo_log().has_id(&id));
    assert!(root.open_log().has_id(&id));
}

#[test]
fn a_retained_record_restores_fully_on_retry() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["base", "web"])).unwrap();
    let h = Harness::default();
    h.client.fail_policy("base");
    h.client.fail_policy("web");

    let mut u = root.undeleter(&h, root.config());
    let err = u.restore_latest().unwrap_err();
    assert!(matches!(err, UndeleteError::PartialFailure(_)));
    assert!(root.open_log().has_id(&id));

    h.client.heal();
    let report = u.restore_latest().unwrap();
    assert_eq!(report.record_id, id);
    assert_eq!(report.restored.len(), 2);
    // Both units were re-sent on the retry.
    assert_eq!(h.client.calls().len(), 4);
    assert!(root.open_log().is_empty());
}

#[test]
fn consume_policy_drops_the_record_but_still_reports_the_failure() {
    let root = TestRoot::new();
    let id = root.open_log().push(draft("prod", &["base", "web"])).unwrap();
    let h = Harness::default();
    h.client.fail_policy("web");

    let mut cfg = root.config();
    cfg.replay.partial_failure = PartialFailurePolicy::Consume;
    let mut u = root.undeleter(&h, cfg);
    let err = u.restore_by_id(&id).unwrap_err();
    let report = err.partial_report().unwrap();
    assert!(report.consumed);
    assert_eq!(report.failed_list(), "prod/web");
    assert!(!root.open_log().has_id(&id));
}
