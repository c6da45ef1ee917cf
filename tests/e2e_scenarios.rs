//! The six end-to-end scenarios, each driven through the real
//! `SqliteStore` plus the scheduler/feedback/notify modules together,
//! rather than any single module in isolation.

use std::cell::RefCell;

use chrono::{NaiveDate, Utc};

use daylit::backup::BackupManager;
use daylit::error::AppResult;
use daylit::feedback::apply_feedback;
use daylit::models::{
    Alert, AlertSchedule, FeedbackRating, Settings, SlotStatus, Task, TaskSchedule,
};
use daylit::notify::tick;
use daylit::notify::tray_client::NotificationSender;
use daylit::recurrence::Recurrence;
use daylit::scheduler;
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

fn appointment(id: &str, start: i32, end: i32, priority: u8) -> Task {
    Task::new(
        id,
        id,
        TaskSchedule::Appointment {
            fixed_start: start,
            fixed_end: end,
        },
        (end - start) as u32,
        Recurrence::Daily,
        priority,
        true,
    )
    .unwrap()
}

fn flexible(id: &str, duration: u32, priority: u8, window: Option<(i32, i32)>) -> Task {
    let (earliest_start, latest_end) = window.map_or((None, None), |(s, e)| (Some(s), Some(e)));
    Task::new(
        id,
        id,
        TaskSchedule::Flexible {
            earliest_start,
            latest_end,
        },
        duration,
        Recurrence::Daily,
        priority,
        true,
    )
    .unwrap()
}

#[test]
fn scenario_s1_deterministic_placement_within_a_narrow_day_window() {
    let (_dir, db) = store();
    let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();

    for task in [
        appointment("standup", 540, 570, 1),
        flexible("deep-work", 45, 2, None),
        flexible("errand", 30, 1, Some((600, 660))),
        flexible("walk", 60, 3, None),
    ] {
        db.add_task(&task).unwrap();
    }

    let tasks = db.list_active_tasks().unwrap();
    let plan = scheduler::generate(date, &tasks, 480, 720);

    let order: Vec<&str> = plan.slots.iter().map(|s| s.task_id.as_str()).collect();
    assert_eq!(order, vec!["deep-work", "standup", "errand", "walk"]);
}

#[test]
fn scenario_s2_revision_allocation_and_immutability() {
    let (_dir, db) = store();
    let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

    let first = daylit::models::DayPlan::new_proposal(date, vec![]);
    let saved = db.save_plan(&first).unwrap();
    assert_eq!(saved.revision, 1);

    let mut accepted = saved.clone();
    accepted.accept(Utc::now()).unwrap();
    let accepted = db.save_plan(&accepted).unwrap();
    assert_eq!(accepted.revision, 1);
    assert!(accepted.is_accepted());

    let mut reattempt = accepted.clone();
    reattempt.accepted_at = None;
    assert!(db.save_plan(&reattempt).is_err());

    let next = daylit::models::DayPlan::new_proposal(date, vec![]);
    let saved_again = db.save_plan(&next).unwrap();
    assert_eq!(saved_again.revision, 2);
}

#[test]
fn scenario_s3_on_track_feedback_computes_the_spec_example_average() {
    let (_dir, db) = store();
    let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();

    let mut task = Task::new(
        "read",
        "Read",
        TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        },
        30,
        Recurrence::Daily,
        1,
        true,
    )
    .unwrap();
    task.stats.avg_actual_duration_min = 30.0;
    db.add_task(&task).unwrap();

    let slot = daylit::models::Slot::new(600, 650, "read").unwrap();
    let mut plan = daylit::models::DayPlan::new_proposal(date, vec![slot]);
    plan.accept(Utc::now()).unwrap();
    let mut saved = db.save_plan(&plan).unwrap();
    saved.slots[0].status = SlotStatus::Done;

    let mut task = db.get_task_by_id("read").unwrap();
    apply_feedback(&mut saved, &mut task, FeedbackRating::OnTrack, None, date, 700).unwrap();
    db.commit_feedback(&saved, &task).unwrap();

    let reloaded = db.get_task_by_id("read").unwrap();
    assert!((reloaded.stats.avg_actual_duration_min - 34.0).abs() < 1e-9);
}

#[test]
fn scenario_s4_notifier_grace_period_and_idempotence() {
    let (_dir, db) = store();
    let mut settings = Settings::default();
    settings.notify_block_start = true;
    settings.block_start_offset_min = 5;
    settings.notification_grace_period_min = 10;
    db.save_settings(&settings).unwrap();

    let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    let slot = daylit::models::Slot::new(600, 650, "focus").unwrap();
    db.add_task(&flexible("focus", 50, 1, None)).unwrap();
    let mut plan = daylit::models::DayPlan::new_proposal(date, vec![slot]);
    plan.accept(Utc::now()).unwrap();
    db.save_plan(&plan).unwrap();

    let sender = RecordingSender::new();
    tick(&db, &sender, date, 10 * 60 + 3, Utc::now(), false).unwrap();
    assert_eq!(sender.sent.borrow().len(), 1);

    tick(&db, &sender, date, 10 * 60 + 4, Utc::now(), false).unwrap();
    assert_eq!(sender.sent.borrow().len(), 1);
}

#[test]
fn scenario_s5_restore_rolls_back_to_the_first_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("daylit.db");
    let db = SqliteStore::new(&db_path);
    db.init().unwrap();
    db.add_task(&flexible("x", 30, 1, None)).unwrap();

    let manager = BackupManager::new(&db_path);
    let f1 = manager.create().unwrap();

    db.add_task(&flexible("y", 30, 1, None)).unwrap();
    manager.create().unwrap();

    manager.restore(&f1).unwrap();

    let restored = SqliteStore::new(&db_path);
    assert!(restored.get_task_by_id("x").is_ok());
    assert!(restored.get_task_by_id("y").is_err());
    assert!(!db_path.with_extension("db-wal").exists());
    assert!(!db_path.with_extension("db-shm").exists());
    assert!(manager.list().unwrap().len() >= 3);
}

#[test]
fn scenario_s6_weekly_alert_only_fires_on_its_scheduled_weekday() {
    let (_dir, db) = store();
    db.save_settings(&Settings::default()).unwrap();

    let alert = Alert::new(
        "meds",
        "Take your medication",
        9 * 60,
        AlertSchedule::Recurring {
            recurrence: Recurrence::Weekly {
                weekdays: vec![chrono::Weekday::Mon, chrono::Weekday::Fri],
            },
        },
        Utc::now(),
    )
    .unwrap();
    db.add_alert(&alert).unwrap();

    let sender = RecordingSender::new();
    let tuesday = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
    tick(&db, &sender, tuesday, 9 * 60 + 2, Utc::now(), false).unwrap();
    assert!(sender.sent.borrow().is_empty());

    let friday = NaiveDate::from_ymd_opt(2026, 1, 9).unwrap();
    tick(&db, &sender, friday, 9 * 60 + 2, Utc::now(), false).unwrap();
    assert_eq!(sender.sent.borrow().len(), 1);

    tick(&db, &sender, friday, 9 * 60 + 5, Utc::now(), false).unwrap();
    assert_eq!(sender.sent.borrow().len(), 1);
}
