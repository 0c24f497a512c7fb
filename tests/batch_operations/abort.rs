//! Aborting batches

use crate::common::*;

#[test]
fn abort_leaves_store_unchanged() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let before = t.snapshot();

    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1234", None, true);
    t.stage_delete(id, "bar", Some("1234"), false);

    let summary = t.drive.abort_batch(t.conn, id).unwrap();
    assert_eq!(summary.discarded.total(), 2);

    assert!(t.get("foo").is_none());
    assert_entry(t.get("bar"), "barvalue", "1234");
    assert_eq!(t.snapshot(), before);
}

#[test]
fn abort_empty_batch() {
    let t = TestDrive::new();
    let id = t.begin();
    assert!(t.drive.abort_batch(t.conn, id).unwrap().discarded.is_empty());
}

#[test]
fn staging_after_abort_is_not_found() {
    let t = TestDrive::new();
    let id = t.begin();
    t.drive.abort_batch(t.conn, id).unwrap();

    let err = t
        .drive
        .batch_put(t.conn, id, Entry::new("foo", "v"), None, true)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(t.drive.abort_batch(t.conn, id).unwrap_err().is_not_found());
}

#[test]
fn new_batch_after_abort() {
    let t = TestDrive::new();
    let first = t.begin();
    t.drive.abort_batch(t.conn, first).unwrap();

    let second = t.begin();
    assert_ne!(first, second);
    t.stage_put(second, "foo", "foovalue", "1", None, true);
    assert!(t.commit(second).is_committed());
}

#[test]
fn metrics_count_aborts() {
    let t = TestDrive::new();
    for _ in 0..3 {
        let id = t.begin();
        t.drive.abort_batch(t.conn, id).unwrap();
    }
    let m = t.drive.metrics();
    assert_eq!(m.begun, 3);
    assert_eq!(m.aborted, 3);
    assert_eq!(m.committed, 0);
}
