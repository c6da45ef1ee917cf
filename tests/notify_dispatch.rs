//! Notification dispatch paths the in-module unit tests don't cover:
//! `dry_run` mode, and a slot whose start and end boundaries both fire
//! in the same tick.

use std::cell::RefCell;

use chrono::{NaiveDate, Utc};

use daylit::error::AppResult;
use daylit::models::{DayPlan, Settings, Slot, SlotStatus};
use daylit::notify::tick;
use daylit::notify::tray_client::NotificationSender;
use daylit::store::sqlite::SqliteStore;
use daylit::store::StorageProvider;

struct RecordingSender {
    sent: RefCell<Vec<String>>,
}

impl RecordingSender {
    fn new() -> Self {
        RecordingSender {
            sent: RefCell::new(Vec::new()),
        }
    }
}

impl NotificationSender for RecordingSender {
    fn send(&self, message: &str) -> AppResult<()> {
        self.sent.borrow_mut().push(message.to_string());
        Ok(())
    }
}

fn store() -> (tempfile::TempDir, SqliteStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = SqliteStore::new(dir.path().join("daylit.db"));
    store.init().unwrap();
    (dir, store)
}

#[test]
fn dry_run_never_sends_or_persists_even_when_a_slot_is_due() {
    let (_dir, db) = store();
    let mut settings = Settings::default();
    settings.block_start_offset_min = 5;
    settings.notification_grace_period_min = 10;
    db.save_settings(&settings).unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let mut slot = Slot::new(600, 650, "task-1").unwrap();
    slot.status = SlotStatus::Accepted;
    let plan = DayPlan::new_proposal(today, vec![slot]);
    db.save_plan(&plan).unwrap();

    let sender = RecordingSender::new();
    tick(&db, &sender, today, 10 * 60 + 3, Utc::now(), true).unwrap();

    assert!(sender.sent.borrow().is_empty());
    let reloaded = db.get_latest_plan_revision(today).unwrap().unwrap();
    assert!(reloaded.slots[0].last_notified_start.is_none());
}

#[test]
fn both_boundaries_of_a_short_slot_fire_in_the_same_tick() {
    let (_dir, db) = store();
    let mut settings = Settings::default();
    settings.block_start_offset_min = 5;
    settings.block_end_offset_min = 5;
    settings.notification_grace_period_min = 10;
    db.save_settings(&settings).unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let mut slot = Slot::new(600, 605, "task-1").unwrap();
    slot.status = SlotStatus::Accepted;
    let plan = DayPlan::new_proposal(today, vec![slot]);
    db.save_plan(&plan).unwrap();

    let sender = RecordingSender::new();
    // trigger for start is 09:55, for end is 10:00; both within grace at 10:02.
    tick(&db, &sender, today, 10 * 60 + 2, Utc::now(), false).unwrap();

    assert_eq!(sender.sent.borrow().len(), 2);
    let reloaded = db.get_latest_plan_revision(today).unwrap().unwrap();
    assert!(reloaded.slots[0].last_notified_start.is_some());
    assert!(reloaded.slots[0].last_notified_end.is_some());
}

#[test]
fn disabled_notifications_short_circuit_before_touching_any_slot() {
    let (_dir, db) = store();
    let mut settings = Settings::default();
    settings.notifications_enabled = false;
    db.save_settings(&settings).unwrap();

    let today = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let mut slot = Slot::new(600, 650, "task-1").unwrap();
    slot.status = SlotStatus::Accepted;
    let plan = DayPlan::new_proposal(today, vec![slot]);
    db.save_plan(&plan).unwrap();

    let sender = RecordingSender::new();
    tick(&db, &sender, today, 10 * 60 + 3, Utc::now(), false).unwrap();
    assert!(sender.sent.borrow().is_empty());
}
