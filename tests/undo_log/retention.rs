use crate::helpers::{draft, TestRoot};

#[test]
fn push_drops_the_oldest_records_beyond_the_cap() {
    let root = TestRoot::new();
    let mut log = root.open_log().with_max_records(Some(3));
    let mut ids = Vec::new();
    for name in ["a", "b", "c", "d", "e"] {
        ids.push(log.push(draft("prod", &[name])).unwrap());
    }
    let kept: Vec<_> = log.iter().map(|(id, _)| id).collect();
    assert_eq!(kept, ids[2..].to_vec());
    assert_eq!(root.open_log().len(), 3);
    assert_eq!(log.high_water(), ids.last().copied());
}

#[test]
fn default_cap_keeps_ten_records() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    for i in 0..12 {
        let name = format!("p{i}");
        log.push(draft("prod", &[name.as_str()])).unwrap();
    }
    assert_eq!(log.len(), 10);
    assert_eq!(
        log.iter().next().map(|(_, r)| r.policy_revisions()[0].policy_name.clone()).as_deref(),
        Some("p2")
    );
}

#[test]
fn zero_cap_still_keeps_the_newest_record_and_none_keeps_all() {
    let root = TestRoot::new();
    let mut log = root.open_log().with_max_records(Some(0));
    log.push(draft("prod", &["a"])).unwrap();
    let newest = log.push(draft("prod", &["b"])).unwrap();
    assert_eq!(log.len(), 1);
    assert!(log.has_id(&newest));

    let mut log = log.with_max_records(None);
    for name in ["c", "d", "e", "f", "g", "h", "i", "j", "k", "l", "m"] {
        log.push(draft("prod", &[name])).unwrap();
    }
    assert_eq!(log.len(), 12);
}
