use stratum_core::{Error, LOCK_FILE_NAME, MigrationLock};

#[test]
fn acquire_creates_and_release_removes_the_lockfile() {
    let dir = tempfile::tempdir().expect("tempdir");
    let lock = MigrationLock::acquire(dir.path(), 0).expect("acquire");
    assert!(dir.path().join(LOCK_FILE_NAME).exists());

    lock.release().expect("release");
    assert!(!dir.path().join(LOCK_FILE_NAME).exists());
}

#[test]
fn second_acquire_fails_with_lock_held() {
    let dir = tempfile::tempdir().expect("tempdir");
    let _held = MigrationLock::acquire(dir.path(), 0).expect("first acquire");

    let error = MigrationLock::acquire(dir.path(), 0).expect_err("second acquire must fail");
    match error {
        Error::LockHeld { path } => {
            assert!(path.ends_with(LOCK_FILE_NAME));
        }
        other => panic!("expected LockHeld, got {other:?}"),
    }
}

#[test]
fn dropping_the_guard_releases_the_lock() {
    let dir = tempfile::tempdir().expect("tempdir");
    {
        let _lock = MigrationLock::acquire(dir.path(), 0).expect("acquire");
    }
    assert!(!dir.path().join(LOCK_FILE_NAME).exists());
    // And the workspace can be locked again.
    MigrationLock::acquire(dir.path(), 0).expect("reacquire");
}

#[test]
fn stale_lock_with_timeout_still_fails_after_polling() {
    let dir = tempfile::tempdir().expect("tempdir");
    std::fs::write(dir.path().join(LOCK_FILE_NAME), "12345").expect("plant stale lock");

    let started = std::time::Instant::now();
    let error = MigrationLock::acquire(dir.path(), 1).expect_err("must time out");
    assert!(matches!(error, Error::LockHeld { .. }));
    assert!(started.elapsed() >= std::time::Duration::from_millis(900));
}
