//! Backup manager driven against a real store file, including the
//! scenario where a restore clobbers data added after the snapshot.

use daylit::backup::BackupManager;
use daylit::models::{Task, TaskSchedule};
use daylit::recurrence::Recurrence;
use daylit::store::sqlite::SqliteStore;
use daylit::store::StorageProvider;

fn task(id: &str) -> Task {
    Task::new(
        id,
        id,
        TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        },
        30,
        Recurrence::Daily,
        1,
        true,
    )
    .unwrap()
}

#[test]
fn restore_drops_tasks_added_after_the_snapshot_and_clears_wal_sidecars() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("daylit.db");
    let store = SqliteStore::new(&db_path);
    store.init().unwrap();
    store.add_task(&task("x")).unwrap();

    let manager = BackupManager::new(&db_path);
    let f1 = manager.create().unwrap();

    store.add_task(&task("y")).unwrap();
    let _f2 = manager.create().unwrap();

    assert!(store.get_task_by_id("y").is_ok());

    manager.restore(&f1).unwrap();

    let restored = SqliteStore::new(&db_path);
    assert!(restored.get_task_by_id("x").is_ok());
    assert!(restored.get_task_by_id("y").is_err());

    assert!(!db_path.with_extension("db-wal").exists());
    assert!(!db_path.with_extension("db-shm").exists());

    // the restore itself took a pre-restore safety snapshot, so at
    // least 3 backups now exist: f1, f2, and the safety snapshot.
    assert!(manager.list().unwrap().len() >= 3);
}
