//! Batch deletes

use crate::common::*;

#[test]
fn delete_with_wrong_version_is_invalid_batch() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let id = t.begin();
    t.stage_delete(id, "bar", Some("NoMatchVersion"), false);

    let outcome = t.commit(id);
    assert_invalid_on(&outcome, "bar");
    assert!(matches!(BatchStatus::from(outcome), BatchStatus::InvalidBatch(_)));
    assert_entry(t.get("bar"), "barvalue", "1234");
}

#[test]
fn delete_with_matching_version_removes_key() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let id = t.begin();
    t.stage_delete(id, "bar", Some("1234"), false);

    assert!(t.commit(id).is_committed());
    assert!(t.get("bar").is_none());
}

#[test]
fn forced_delete_ignores_version() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let id = t.begin();
    t.stage_delete(id, "bar", Some("NoMatchVersion"), true);

    assert!(t.commit(id).is_committed());
    assert!(t.get("bar").is_none());
}

#[test]
fn forced_delete_of_missing_key_commits() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_delete(id, "missing", None, true);

    assert!(t.commit(id).is_committed());
}

#[test]
fn versioned_delete_of_missing_key_is_invalid() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_delete(id, "missing", Some("1234"), false);

    assert_invalid_on(&t.commit(id), "missing");
}

#[test]
fn one_bad_delete_keeps_every_key() {
    let t = TestDrive::seeded(&[("a", "1", "1"), ("b", "2", "1"), ("c", "3", "1")]);
    let before = t.snapshot();

    let id = t.begin();
    t.stage_delete(id, "a", Some("1"), false);
    t.stage_delete(id, "b", Some("1"), false);
    t.stage_delete(id, "c", Some("2"), false);

    assert_invalid_on(&t.commit(id), "c");
    assert_eq!(t.snapshot(), before);
}
