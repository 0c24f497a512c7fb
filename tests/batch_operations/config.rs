//! Drives opened from a config directory

use tempfile::TempDir;

use crate::common::*;
use kvdrive::CONFIG_FILE_NAME;

#[test]
fn open_writes_default_config() {
    let dir = TempDir::new().unwrap();
    let drive = Drive::open(dir.path()).unwrap();
    assert!(dir.path().join(CONFIG_FILE_NAME).exists());

    let a = drive.connect();
    let b = drive.connect();
    drive.begin_batch(a).unwrap();
    assert!(drive.begin_batch(b).unwrap_err().is_conflict());
}

#[test]
fn operation_cap_from_file_applies_to_batches() {
    let dir = TempDir::new().unwrap();
    std::fs::write(
        dir.path().join(CONFIG_FILE_NAME),
        "max_operations_per_batch = 2\n",
    )
    .unwrap();

    let drive = Drive::open(dir.path()).unwrap();
    let conn = drive.connect();
    let id = drive.begin_batch(conn).unwrap();
    for key in ["a", "b"] {
        drive
            .batch_put(conn, id, Entry::versioned(key, "v", "1"), None, true)
            .unwrap();
    }
    let err = drive
        .batch_put(conn, id, Entry::versioned("c", "v", "1"), None, true)
        .unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));

    // The batch stays usable after the rejection
    assert!(drive.commit_batch(conn, id).unwrap().is_committed());
    assert_eq!(drive.store().len(), 2);
}

#[test]
fn invalid_config_file_fails_open() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join(CONFIG_FILE_NAME), "begin_policy = \"later\"\n").unwrap();

    assert!(matches!(Drive::open(dir.path()), Err(Error::Config(_))));
}
