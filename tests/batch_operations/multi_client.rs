//! Many connections competing for the batch slot

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::*;

const CLIENTS: u64 = 6;
const ROUNDS: usize = 40;
const KEYS: usize = 8;

/// Each client repeatedly tries to move every key to a new version in one
/// batch, expecting the versions it last observed. Whatever interleaving
/// happens, every key ends on the version of the last committed batch.
#[test]
fn concurrent_clients_leave_consistent_versions() {
    let t = TestDrive::new();
    let seed: Vec<(String, String, String)> = (0..KEYS)
        .map(|i| (format!("key{}", i), "init".to_string(), "v0".to_string()))
        .collect();
    for (k, v, ver) in &seed {
        t.drive
            .put(t.conn, Entry::versioned(k.as_str(), v.as_str(), ver.as_str()), None, true)
            .unwrap();
    }

    let committed = Arc::new(AtomicU64::new(0));
    let handles: Vec<_> = (0..CLIENTS)
        .map(|client| {
            let drive = Arc::clone(&t.drive);
            let committed = Arc::clone(&committed);
            thread::spawn(move || {
                let conn = drive.connect();
                let mut rng = StdRng::seed_from_u64(client);
                for round in 0..ROUNDS {
                    let observed: Vec<Option<VersionTag>> = (0..KEYS)
                        .map(|i| drive.get_version(conn, &Key::from(format!("key{}", i))).unwrap())
                        .collect();

                    let id = match drive.begin_batch(conn) {
                        Ok(id) => id,
                        Err(e) => {
                            assert!(e.is_retryable());
                            thread::yield_now();
                            continue;
                        }
                    };

                    let version = format!("c{}r{}", client, round);
                    for (i, expected) in observed.into_iter().enumerate() {
                        drive
                            .batch_put(
                                conn,
                                id,
                                Entry::versioned(format!("key{}", i), version.as_str(), version.as_str()),
                                expected,
                                false,
                            )
                            .unwrap();
                    }

                    if rng.gen_bool(0.2) {
                        drive.abort_batch(conn, id).unwrap();
                    } else if drive.commit_batch(conn, id).unwrap().is_committed() {
                        committed.fetch_add(1, Ordering::Relaxed);
                    }
                }
                drive.disconnect(conn);
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    // All keys carry one version, written by the same batch
    let first = t.version("key0").unwrap();
    for i in 1..KEYS {
        assert_eq!(t.version(&format!("key{}", i)).unwrap(), first);
    }
    if committed.load(Ordering::Relaxed) > 0 {
        assert_eq!(t.get("key0").unwrap().value, first.as_bytes());
    }

    let m = t.drive.metrics();
    assert_eq!(m.committed, committed.load(Ordering::Relaxed));
    assert_eq!(m.begun, m.resolved());
    assert!(t.drive.active_batch().is_none());
}

#[test]
fn disconnect_aborts_open_batch_and_frees_slot() {
    let t = TestDrive::seeded(&[("bar", "barvalue", "1234")]);
    let before = t.snapshot();
    let client = t.connect();

    let id = t.drive.begin_batch(client).unwrap();
    t.drive
        .batch_delete(client, id, Key::from("bar"), None, true)
        .unwrap();

    assert_eq!(t.drive.disconnect(client), Some(id));
    assert_eq!(t.snapshot(), before);
    assert!(t.drive.active_batch().is_none());
    assert_eq!(t.drive.metrics().aborted_on_disconnect, 1);

    // Slot is free for everyone else
    let next = t.begin();
    assert!(t.commit(next).is_committed());
}

#[test]
fn disconnected_connection_is_rejected() {
    let t = TestDrive::new();
    let client = t.connect();
    t.drive.disconnect(client);

    let err = t.drive.begin_batch(client).unwrap_err();
    assert!(matches!(err, Error::InvalidRequest(_)));
    assert!(t.drive.disconnect(client).is_none());
}
