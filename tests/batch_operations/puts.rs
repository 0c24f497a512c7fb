//! Batch puts

use crate::common::*;

#[test]
fn forced_puts_on_empty_drive_commit() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1234", None, true);
    t.stage_put(id, "bar", "barvalue", "1234", None, true);

    let outcome = t.commit(id);
    assert_eq!(BatchStatus::from(outcome), BatchStatus::Committed);
    assert_entry(t.get("foo"), "foovalue", "1234");
    assert_entry(t.get("bar"), "barvalue", "1234");
}

#[test]
fn put_with_absent_expected_creates_key() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_put(id, "foo", "foovalue", "1234", None, false);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "foovalue", "1234");
}

#[test]
fn put_with_absent_expected_on_existing_key_is_invalid() {
    let t = TestDrive::seeded(&[("foo", "old", "1")]);
    let id = t.begin();
    t.stage_put(id, "foo", "new", "2", None, false);

    assert_invalid_on(&t.commit(id), "foo");
    assert_entry(t.get("foo"), "old", "1");
}

#[test]
fn put_with_matching_expected_replaces_entry() {
    let t = TestDrive::seeded(&[("foo", "old", "1234")]);
    let id = t.begin();
    t.stage_put(id, "foo", "new", "5678", Some("1234"), false);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "new", "5678");
}

#[test]
fn forced_put_ignores_wrong_version() {
    let t = TestDrive::seeded(&[("foo", "old", "1234")]);
    let id = t.begin();
    t.stage_put(id, "foo", "new", "5678", Some("NoMatchVersion"), true);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "new", "5678");
}

#[test]
fn later_put_on_same_key_wins() {
    let t = TestDrive::new();
    let id = t.begin();
    t.stage_put(id, "foo", "first", "1", None, true);
    t.stage_put(id, "foo", "second", "2", None, true);

    assert!(t.commit(id).is_committed());
    assert_entry(t.get("foo"), "second", "2");
}

#[test]
fn integrity_metadata_is_stored_opaquely() {
    let t = TestDrive::new();
    let id = t.begin();
    let entry = Entry::versioned("foo", "foovalue", "1234")
        .with_tag(b"crc".to_vec(), kvdrive::IntegrityAlgorithm::Crc32);
    t.drive.batch_put(t.conn, id, entry.clone(), None, true).unwrap();

    assert!(t.commit(id).is_committed());
    assert_eq!(t.get("foo"), Some(entry));
}
