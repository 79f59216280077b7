use policy_undelete::undo::document;
use policy_undelete::types::UndoRecordDraft;

use crate::helpers::{draft, TestRoot};

#[test]
fn records_survive_a_reopen_unchanged() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    log.push(draft("prod", &["base", "web"])).unwrap();
    // Policy bodies are stored byte for byte, including non-UTF-8 content.
    let raw = UndoRecordDraft::new("delete-policy blob")
        .with_policy_group("staging")
        .with_policy_revision("staging", "blob", vec![0xff, 0x00, b'{', 0x80]);
    log.push(raw).unwrap();

    let reopened = root.open_log();
    let a: Vec<_> = log.iter().map(|(_, r)| r.clone()).collect();
    let b: Vec<_> = reopened.iter().map(|(_, r)| r.clone()).collect();
    assert_eq!(a, b);
    assert_eq!(b[1].policy_revisions()[0].data, vec![0xff, 0x00, b'{', 0x80]);
    assert_eq!(reopened.high_water(), log.high_water());
}

#[test]
fn decoding_and_re_encoding_the_file_is_byte_identical() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    log.push(draft("prod", &["base"])).unwrap();
    log.push(draft("qa", &["api", "db"])).unwrap();

    let bytes = root.log_bytes();
    let state = document::decode(&bytes).unwrap();
    assert_eq!(document::encode(&state).unwrap(), bytes);
}

#[test]
fn missing_state_directory_is_created_on_first_push() {
    let root = TestRoot::new();
    let mut log = root.open_log();
    assert!(log.is_empty());
    assert!(!root.log_path().parent().unwrap().exists());
    log.push(draft("prod", &["base"])).unwrap();
    assert!(root.log_path().is_file());
    // No temp files are left next to the log.
    let leftovers: Vec<_> = std::fs::read_dir(root.log_path().parent().unwrap())
        .unwrap()
        .filter_map(Result::ok)
        .filter(|e| e.file_name().to_string_lossy().ends_with(".tmp"))
        .collect();
    assert!(leftovers.is_empty());
}

#[test]
fn symlinked_state_directory_supports_push_and_pop() {
    let root = TestRoot::new();
    let real = root.path().join("shared");
    std::fs::create_dir(&real).unwrap();
    std::os::unix::fs::symlink(&real, root.log_path().parent().unwrap()).unwrap();

    let mut log = root.open_log();
    let id = log.push(draft("prod", &["base"])).unwrap();
    assert!(real.join("undo_log.json").is_file());

    let popped = log.pop(|rec| Ok(rec.id())).unwrap();
    assert_eq!(popped, id);
    assert!(root.open_log().is_empty());
}
