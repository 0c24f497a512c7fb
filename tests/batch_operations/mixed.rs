//! Batches mixing puts and deletes

use crate::common::*;

#[test]
fn put_and_delete_commit_together() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1234", None, false);
    t.stage_delete(id, "bar", Some("1234"), false);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "foovalue", "1234");
    assert!(t.get("bar").is_none());
}

#[test]
fn failing_delete_discards_valid_put() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let before = t.snapshot();

    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1234", None, false);
    t.stage_delete(id, "bar", Some("NoMatchVersion"), false);

    let outcome = t.commit(id);
    assert_invalid_on(&outcome, "bar");
    assert!(t.get("foo").is_none());
    assert_eq!(t.snapshot(), before);
}

#[test]
fn put_then_delete_same_key_leaves_it_absent() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1", None, true);
    t.stage_delete(id, "foo", None, true);

    assert!(t.commit(id).is_committed());
    assert!(t.get("foo").is_none());
}

#[test]
fn delete_then_put_same_key_recreates_it() {
    let t = TestDrive::seeded(&[("foo", "old", "1")]);
    let id = t.begin();
    t.stage_delete(id, "foo", Some("1"), false);
    t.stage_put(id, "foo", "new", "2", None, true);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "new", "2");
}

#[test]
fn checks_use_pre_batch_versions() {
    // The delete expects the version the put writes; at commit start the
    // key still has version 1, so the batch is rejected.
    let t = TestDrive::seeded(&[("foo", "old", "1")]);
    let id = t.begin();
    t.stage_put(id, "foo", "new", "2", Some("1"), false);
    t.stage_delete(id, "foo", Some("2"), false);

    assert_invalid_on(&t.commit(id), "foo");
    assert_entry(t.get("foo"), "old", "1");
}

#[test]
fn empty_batch_commits() {
    let t = TestDrive::new();
    let id = t.begin();
    assert!(t.commit(id).is_committed());
    assert!(t.snapshot().is_empty());
}

#[test]
fn commit_twice_is_not_found() {
    let t = TestDrive::new();
    let id = t.begin();
    t.commit(id);

    let err = t.drive.commit_batch(t.conn, id).unwrap_err();
    assert!(err.is_not_found());
}
