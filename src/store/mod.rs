//! The storage provider interface and its two concrete backends. Every
//! operation is synchronous; there is no async runtime anywhere in
//! this crate, matching a single-threaded, one-invocation-per-command
//! concurrency model.

pub mod migrations;
pub mod postgres;
pub mod sqlite;

use chrono::{DateTime, NaiveDate, Utc};

use crate::error::AppResult;
use crate::models::{Alert, DayPlan, Habit, HabitEntry, OtEntry, Settings, Task};
use crate::time::MinuteOfDay;

/// Which boundary of a slot a notification timestamp write targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationBoundary {
    Start,
    End,
}

/// Backend-dependent capability. Habits and OT entries are only
/// meaningful on the embedded backend; callers should check
/// `supports` before calling the corresponding methods, or discriminate
/// on the `AppError::Unsupported` they get back otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Feature {
    Habits,
    OtEntries,
}

/// The full CRUD surface. Implemented by `sqlite::SqliteStore`
/// (embedded) and `postgres::PostgresStore` (remote).
pub trait StorageProvider {
    fn init(&self) -> AppResult<()>;
    fn load(&self) -> AppResult<()>;
    fn close(&self) -> AppResult<()>;

    fn supports(&self, feature: Feature) -> bool;
    fn get_config_path(&self) -> String;

    fn get_settings(&self) -> AppResult<Settings>;
    fn save_settings(&self, settings: &Settings) -> AppResult<()>;

    fn add_task(&self, task: &Task) -> AppResult<()>;
    fn update_task(&self, task: &Task) -> AppResult<()>;
    fn get_task_by_id(&self, id: &str) -> AppResult<Task>;
    fn list_active_tasks(&self) -> AppResult<Vec<Task>>;
    fn list_tasks_including_deleted(&self) -> AppResult<Vec<Task>>;
    fn soft_delete_task(&self, id: &str) -> AppResult<()>;
    fn restore_task(&self, id: &str) -> AppResult<()>;

    /// Assigns the next revision for `plan.date` when `plan.revision ==
    /// 0`; otherwise the write must target an existing `(date,
    /// revision)` whose `accepted_at` is still null. Returns the plan
    /// as stored, with its allocated revision.
    fn save_plan(&self, plan: &DayPlan) -> AppResult<DayPlan>;
    fn get_latest_plan_revision(&self, date: NaiveDate) -> AppResult<Option<DayPlan>>;
    fn get_plan_revision(&self, date: NaiveDate, revision: u32) -> AppResult<DayPlan>;
    fn soft_delete_plan(&self, date: NaiveDate) -> AppResult<()>;
    fn restore_plan(&self, date: NaiveDate) -> AppResult<()>;

    /// Persists a slot's feedback and the task's updated stats as one
    /// transaction. `plan.revision` must already be allocated (the plan
    /// came from a prior `save_plan`/`get_latest_plan_revision` call);
    /// this targets the existing row rather than allocating a new one.
    fn commit_feedback(&self, plan: &DayPlan, task: &Task) -> AppResult<()>;

    /// Targeted write that does not allocate a new revision — the sole
    /// sanctioned mutation of an accepted plan revision.
    #[allow(clippy::too_many_arguments)]
    fn update_notification_timestamp(
        &self,
        date: NaiveDate,
        revision: u32,
        slot_start: MinuteOfDay,
        task_id: &str,
        which: NotificationBoundary,
        ts: DateTime<Utc>,
    ) -> AppResult<()>;

    fn list_habits(&self) -> AppResult<Vec<Habit>>;
    fn add_habit(&self, habit: &Habit) -> AppResult<()>;
    fn archive_habit(&self, id: &str) -> AppResult<()>;
    fn soft_delete_habit(&self, id: &str) -> AppResult<()>;
    fn upsert_habit_entry(&self, entry: &HabitEntry) -> AppResult<()>;
    fn list_habit_entries(&self, habit_id: &str) -> AppResult<Vec<HabitEntry>>;

    fn get_ot_entry(&self, day: NaiveDate) -> AppResult<Option<OtEntry>>;
    fn upsert_ot_entry(&self, entry: &OtEntry) -> AppResult<()>;

    fn list_alerts(&self) -> AppResult<Vec<Alert>>;
    fn add_alert(&self, alert: &Alert) -> AppResult<()>;
    /// Preserves `id` and `created_at` on the stored row.
    fn update_alert(&self, alert: &Alert) -> AppResult<()>;
    fn delete_alert(&self, id: &str) -> AppResult<()>;
}
