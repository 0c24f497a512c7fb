//! Visibility and exclusivity between connections

use std::sync::Arc;
use std::thread;
use std::time::Duration;

use crate::common::*;
use kvdrive::ConflictReason;

#[test]
fn other_connection_sees_pre_batch_state() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let reader = t.connect();

    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1", None, true);
    t.stage_delete(id, "bar", Some("1234"), false);

    assert!(t.drive.get(reader, &Key::from("foo")).unwrap().is_none());
    assert_entry(t.drive.get(reader, &Key::from("bar")).unwrap(), "barvalue", "1234");

    assert!(t.commit(id).is_committed());
    assert_entry(t.drive.get(reader, &Key::from("foo")).unwrap(), "foovalue", "1");
    assert!(t.drive.get(reader, &Key::from("bar")).unwrap().is_none());
}

#[test]
fn owner_reads_do_not_see_staged_writes() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1", None, true);

    assert!(t.get("foo").is_none());
    assert!(t.version("foo").is_none());
}

#[test]
fn second_begin_conflicts_until_commit() {
    let t = TestDrive::new();
    let other = t.connect();
    let id = t.begin();

    let err = t.drive.begin_batch(other).unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict(ConflictReason::BatchInProgress { owner }) if owner == t.conn
    ));
    assert!(err.is_retryable());

    t.commit(id);
    assert!(t.drive.begin_batch(other).is_ok());
}

#[test]
fn second_begin_conflicts_until_abort() {
    let t = TestDrive::new();
    let other = t.connect();
    let id = t.begin();

    assert!(t.drive.begin_batch(other).is_err());
    t.drive.abort_batch(t.conn, id).unwrap();
    assert!(t.drive.begin_batch(other).is_ok());
}

#[test]
fn owner_cannot_open_two_batches() {
    let t = TestDrive::new();
    t.begin();
    let err = t.drive.begin_batch(t.conn).unwrap_err();
    assert!(matches!(
        err,
        Error::Conflict(ConflictReason::ConnectionOwnsBatch { .. })
    ));
}

#[test]
fn foreign_connection_cannot_touch_batch() {
    let t = TestDrive::new();
    let other = t.connect();
    let id = t.begin();

    let err = t
        .drive
        .batch_put(other, id, Entry::new("foo", "v"), None, true)
        .unwrap_err();
    assert!(err.is_not_found());
    assert!(t.drive.commit_batch(other, id).unwrap_err().is_not_found());
    assert!(t.drive.abort_batch(other, id).unwrap_err().is_not_found());

    // Still open for its owner
    assert!(t.commit(id).is_committed());
}

#[test]
fn foreign_single_key_write_fails_fast_while_batch_open() {
    let t = TestDrive::new();
    let other = t.connect();
    let id = t.begin();

    let err = t
        .drive
        .put(other, Entry::versioned("foo", "v", "1"), None, true)
        .unwrap_err();
    assert!(err.is_conflict());

    // The owner may still write directly
    t.drive
        .put(t.conn, Entry::versioned("baz", "v", "1"), None, true)
        .unwrap();

    t.drive.abort_batch(t.conn, id).unwrap();
    t.drive
        .put(other, Entry::versioned("foo", "v", "1"), None, true)
        .unwrap();
}

#[test]
fn blocked_begin_proceeds_after_commit() {
    let t = TestDrive::blocking();
    let id = t.begin();
    let drive = Arc::clone(&t.drive);
    let other = t.connect();

    let waiter = thread::spawn(move || drive.begin_batch(other));

    thread::sleep(Duration::from_millis(50));
    assert_eq!(t.drive.active_batch().map(|b| b.id), Some(id));

    t.stage_put(id, "foo", "foovalue", "1", None, true);
    assert!(t.commit(id).is_committed());

    let next = waiter.join().unwrap().unwrap();
    assert_ne!(next, id);
    assert_eq!(t.drive.active_batch().map(|b| b.owner), Some(other));
}
