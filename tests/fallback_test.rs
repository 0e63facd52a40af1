mod common;

use assert_cmd::prelude::*;
use common::demo_cmd;
use predicates::prelude::*;

#[cfg(not(feature = "storage-rocksdb"))]
#[test]
fn test_rocksdb_fallback_warning() {
    demo_cmd()
        .arg("--db-path")
        .arg("some_db")
        .arg("expire")
        .assert()
        .success()
        .stderr(predicate::str::contains(
            "Persistent storage requested via --db-path, but 'storage-rocksdb' feature is not enabled. Falling back to in-memory storage.",
        ));
}

#[cfg(feature = "storage-rocksdb")]
#[test]
fn test_rocksdb_no_fallback_warning() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("test_db");

    demo_cmd()
        .arg("--db-path")
        .arg(&db_path)
        .arg("expire")
        .assert()
        .success()
        .stderr(predicate::str::contains("Falling back").not());
}
