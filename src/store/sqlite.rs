//! Embedded, single-file backend. No connection is held between
//! calls: each call opens a fresh `rusqlite::Connection`, configures
//! pragmas, and (idempotently) brings the schema up to date before
//! doing any work.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::{AppError, AppResult};
use crate::models::{Alert, DayPlan, Habit, HabitEntry, OtEntry, Settings, Slot, Task, TaskStats};
use crate::store::migrations::{self, SQLITE_MIGRATIONS};
use crate::store::{Feature, NotificationBoundary, StorageProvider};
use crate::time::{DayWindow, MinuteOfDay};

#[derive(Debug, Clone)]
pub struct SqliteStore {
    path: PathBuf,
}

impl SqliteStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        SqliteStore { path: path.into() }
    }

    fn get_connection(&self) -> AppResult<Connection> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent)?;
            }
        }
        let mut conn = Connection::open(&self.path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.pragma_update(None, "foreign_keys", 1)?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        migrations::apply(&mut conn, SQLITE_MIGRATIONS)?;
        Ok(conn)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn json_err(error: impl std::error::Error + Send + Sync + 'static) -> rusqlite::Error {
    rusqlite::Error::ToSqlConversionFailure(Box::new(error))
}

fn row_to_task(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    let schedule_json: String = row.get("schedule_json")?;
    let recurrence_json: String = row.get("recurrence_json")?;
    let last_done: Option<String> = row.get("last_done")?;

    Ok(Task {
        id: row.get("id")?,
        name: row.get("name")?,
        schedule: serde_json::from_str(&schedule_json).map_err(json_err)?,
        duration_min: row.get::<_, i64>("duration_min")? as u32,
        recurrence: serde_json::from_str(&recurrence_json).map_err(json_err)?,
        priority: row.get::<_, i64>("priority")? as u8,
        active: row.get::<_, i64>("active")? != 0,
        stats: TaskStats {
            success_streak: row.get::<_, i64>("success_streak")? as u32,
            avg_actual_duration_min: row.get("avg_actual_duration_min")?,
            last_done: last_done
                .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
                .transpose()
                .map_err(json_err)?,
        },
    })
}

fn row_to_plan(row: &rusqlite::Row<'_>) -> rusqlite::Result<DayPlan> {
    let date_str: String = row.get("date")?;
    let accepted_at_str: Option<String> = row.get("accepted_at")?;
    let slots_json: String = row.get("slots_json")?;

    Ok(DayPlan {
        date: NaiveDate::parse_from_str(&date_str, "%Y-%m-%d").map_err(json_err)?,
        revision: row.get::<_, i64>("revision")? as u32,
        accepted_at: accepted_at_str
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(json_err)?,
        slots: serde_json::from_str::<Vec<Slot>>(&slots_json).map_err(json_err)?,
    })
}

fn row_to_habit(row: &rusqlite::Row<'_>) -> rusqlite::Result<Habit> {
    let created_at_str: String = row.get("created_at")?;
    Ok(Habit {
        id: row.get("id")?,
        name: row.get("name")?,
        archived: row.get::<_, i64>("archived")? != 0,
        deleted: row.get::<_, i64>("deleted")? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(json_err)?
            .with_timezone(&Utc),
    })
}

fn row_to_alert(row: &rusqlite::Row<'_>) -> rusqlite::Result<Alert> {
    let schedule_json: String = row.get("schedule_json")?;
    let created_at_str: String = row.get("created_at")?;
    let last_sent_str: Option<String> = row.get("last_sent")?;

    Ok(Alert {
        id: row.get("id")?,
        message: row.get("message")?,
        time: row.get::<_, i64>("time")? as MinuteOfDay,
        schedule: serde_json::from_str(&schedule_json).map_err(json_err)?,
        active: row.get::<_, i64>("active")? != 0,
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(json_err)?
            .with_timezone(&Utc),
        last_sent: last_sent_str
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(json_err)?,
    })
}

impl StorageProvider for SqliteStore {
    fn init(&self) -> AppResult<()> {
        self.get_connection()?;
        Ok(())
    }

    fn load(&self) -> AppResult<()> {
        if !self.path.exists() {
            return Err(AppError::precondition(
                "store is not initialized; run `daylit init` first",
            ));
        }
        self.get_connection()?;
        Ok(())
    }

    fn close(&self) -> AppResult<()> {
        Ok(())
    }

    fn supports(&self, _feature: Feature) -> bool {
        true
    }

    fn get_config_path(&self) -> String {
        self.path.display().to_string()
    }

    fn get_settings(&self) -> AppResult<Settings> {
        let conn = self.get_connection()?;
        let row = conn
            .query_row(
                "SELECT day_start, day_end, default_block_min, timezone, notifications_enabled,
                        notify_block_start, notify_block_end, block_start_offset_min,
                        block_end_offset_min, notification_grace_period_min
                 FROM settings WHERE id = 1",
                [],
                |row| {
                    Ok(Settings {
                        day_window: DayWindow {
                            start: row.get::<_, i64>(0)? as MinuteOfDay,
                            end: row.get::<_, i64>(1)? as MinuteOfDay,
                        },
                        default_block_min: row.get::<_, i64>(2)? as u32,
                        timezone: row.get(3)?,
                        notifications_enabled: row.get::<_, i64>(4)? != 0,
                        notify_block_start: row.get::<_, i64>(5)? != 0,
                        notify_block_end: row.get::<_, i64>(6)? != 0,
                        block_start_offset_min: row.get::<_, i64>(7)? as u32,
                        block_end_offset_min: row.get::<_, i64>(8)? as u32,
                        notification_grace_period_min: row.get::<_, i64>(9)? as u32,
                    })
                },
            )
            .optional()?;

        Ok(row.unwrap_or_default())
    }

    fn save_settings(&self, settings: &Settings) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO settings (id, day_start, day_end, default_block_min, timezone,
                notifications_enabled, notify_block_start, notify_block_end,
                block_start_offset_min, block_end_offset_min, notification_grace_period_min)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(id) DO UPDATE SET
                day_start = excluded.day_start,
                day_end = excluded.day_end,
                default_block_min = excluded.default_block_min,
                timezone = excluded.timezone,
                notifications_enabled = excluded.notifications_enabled,
                notify_block_start = excluded.notify_block_start,
                notify_block_end = excluded.notify_block_end,
                block_start_offset_min = excluded.block_start_offset_min,
                block_end_offset_min = excluded.block_end_offset_min,
                notification_grace_period_min = excluded.notification_grace_period_min",
            params![
                settings.day_window.start,
                settings.day_window.end,
                settings.default_block_min,
                settings.timezone,
                settings.notifications_enabled as i64,
                settings.notify_block_start as i64,
                settings.notify_block_end as i64,
                settings.block_start_offset_min,
                settings.block_end_offset_min,
                settings.notification_grace_period_min,
            ],
        )?;
        Ok(())
    }

    fn add_task(&self, task: &Task) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO tasks (id, name, schedule_json, duration_min, recurrence_json, priority,
                active, success_streak, avg_actual_duration_min, last_done, deleted)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, 0)",
            params![
                task.id,
                task.name,
                serde_json::to_string(&task.schedule)?,
                task.duration_min,
                serde_json::to_string(&task.recurrence)?,
                task.priority,
                task.active as i64,
                task.stats.success_streak,
                task.stats.avg_actual_duration_min,
                task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "UPDATE tasks SET name = ?2, schedule_json = ?3, duration_min = ?4,
                recurrence_json = ?5, priority = ?6, active = ?7, success_streak = ?8,
                avg_actual_duration_min = ?9, last_done = ?10
             WHERE id = ?1",
            params![
                task.id,
                task.name,
                serde_json::to_string(&task.schedule)?,
                task.duration_min,
                serde_json::to_string(&task.recurrence)?,
                task.priority,
                task.active as i64,
                task.stats.success_streak,
                task.stats.avg_actual_duration_min,
                task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn get_task_by_id(&self, id: &str) -> AppResult<Task> {
        let conn = self.get_connection()?;
        let task = conn
            .query_row(
                "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                        success_streak, avg_actual_duration_min, last_done
                 FROM tasks WHERE id = ?1 AND deleted = 0",
                [id],
                row_to_task,
            )
            .optional()?;
        task.ok_or_else(AppError::not_found)
    }

    fn list_active_tasks(&self) -> AppResult<Vec<Task>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                    success_streak, avg_actual_duration_min, last_done
             FROM tasks WHERE deleted = 0 AND active = 1",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn list_tasks_including_deleted(&self) -> AppResult<Vec<Task>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                    success_streak, avg_actual_duration_min, last_done
             FROM tasks",
        )?;
        let tasks = stmt
            .query_map([], row_to_task)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    fn soft_delete_task(&self, id: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute("UPDATE tasks SET deleted = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn restore_task(&self, id: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute("UPDATE tasks SET deleted = 0 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn save_plan(&self, plan: &DayPlan) -> AppResult<DayPlan> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let date_str = plan.date.format("%Y-%m-%d").to_string();

        let revision: i64 = if plan.revision == 0 {
            let max: Option<i64> = tx.query_row(
                "SELECT MAX(revision) FROM plans WHERE date = ?1",
                [&date_str],
                |row| row.get(0),
            )?;
            max.unwrap_or(0) + 1
        } else {
            let accepted_at: Option<Option<String>> = tx
                .query_row(
                    "SELECT accepted_at FROM plans WHERE date = ?1 AND revision = ?2",
                    params![date_str, plan.revision as i64],
                    |row| row.get::<_, Option<String>>(0),
                )
                .optional()?;
            match accepted_at {
                None => return Err(AppError::precondition("plan revision does not exist")),
                Some(Some(_)) => {
                    return Err(AppError::precondition(
                        "plan revision is already accepted and immutable",
                    ))
                }
                Some(None) => {}
            }
            plan.revision as i64
        };

        let slots_json = serde_json::to_string(&plan.slots)?;
        let accepted_at_str = plan.accepted_at.map(|ts| ts.to_rfc3339());

        tx.execute(
            "INSERT INTO plans (date, revision, accepted_at, slots_json, deleted)
             VALUES (?1, ?2, ?3, ?4, 0)
             ON CONFLICT(date, revision) DO UPDATE SET
                accepted_at = excluded.accepted_at,
                slots_json = excluded.slots_json",
            params![date_str, revision, accepted_at_str, slots_json],
        )?;
        tx.commit()?;

        Ok(DayPlan {
            date: plan.date,
            revision: revision as u32,
            accepted_at: plan.accepted_at,
            slots: plan.slots.clone(),
        })
    }

    fn get_latest_plan_revision(&self, date: NaiveDate) -> AppResult<Option<DayPlan>> {
        let conn = self.get_connection()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let plan = conn
            .query_row(
                "SELECT date, revision, accepted_at, slots_json FROM plans
                 WHERE date = ?1 AND deleted = 0 ORDER BY revision DESC LIMIT 1",
                [&date_str],
                row_to_plan,
            )
            .optional()?;
        Ok(plan)
    }

    fn commit_feedback(&self, plan: &DayPlan, task: &Task) -> AppResult<()> {
        let mut conn = self.get_connection()?;
        let tx = conn.transaction()?;
        let date_str = plan.date.format("%Y-%m-%d").to_string();
        let slots_json = serde_json::to_string(&plan.slots)?;

        let changed = tx.execute(
            "UPDATE plans SET slots_json = ?3 WHERE date = ?1 AND revision = ?2",
            params![date_str, plan.revision as i64, slots_json],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }

        let changed = tx.execute(
            "UPDATE tasks SET name = ?2, schedule_json = ?3, duration_min = ?4,
                recurrence_json = ?5, priority = ?6, active = ?7, success_streak = ?8,
                avg_actual_duration_min = ?9, last_done = ?10
             WHERE id = ?1",
            params![
                task.id,
                task.name,
                serde_json::to_string(&task.schedule)?,
                task.duration_min,
                serde_json::to_string(&task.recurrence)?,
                task.priority,
                task.active as i64,
                task.stats.success_streak,
                task.stats.avg_actual_duration_min,
                task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }

        tx.commit()?;
        Ok(())
    }

    fn get_plan_revision(&self, date: NaiveDate, revision: u32) -> AppResult<DayPlan> {
        let conn = self.get_connection()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let plan = conn
            .query_row(
                "SELECT date, revision, accepted_at, slots_json FROM plans
                 WHERE date = ?1 AND revision = ?2",
                params![date_str, revision as i64],
                row_to_plan,
            )
            .optional()?;
        plan.ok_or_else(AppError::not_found)
    }

    fn soft_delete_plan(&self, date: NaiveDate) -> AppResult<()> {
        let conn = self.get_connection()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        conn.execute("UPDATE plans SET deleted = 1 WHERE date = ?1", [&date_str])?;
        Ok(())
    }

    fn restore_plan(&self, date: NaiveDate) -> AppResult<()> {
        let conn = self.get_connection()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        conn.execute("UPDATE plans SET deleted = 0 WHERE date = ?1", [&date_str])?;
        Ok(())
    }

    fn update_notification_timestamp(
        &self,
        date: NaiveDate,
        revision: u32,
        slot_start: MinuteOfDay,
        task_id: &str,
        which: NotificationBoundary,
        ts: DateTime<Utc>,
    ) -> AppResult<()> {
        let conn = self.get_connection()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let slots_json: String = conn.query_row(
            "SELECT slots_json FROM plans WHERE date = ?1 AND revision = ?2",
            params![date_str, revision as i64],
            |row| row.get(0),
        )?;

        let mut slots: Vec<Slot> = serde_json::from_str(&slots_json)?;
        let slot = slots
            .iter_mut()
            .find(|slot| slot.start == slot_start && slot.task_id == task_id)
            .ok_or_else(AppError::not_found)?;

        match which {
            NotificationBoundary::Start => slot.last_notified_start = Some(ts),
            NotificationBoundary::End => slot.last_notified_end = Some(ts),
        }

        let updated_json = serde_json::to_string(&slots)?;
        conn.execute(
            "UPDATE plans SET slots_json = ?3 WHERE date = ?1 AND revision = ?2",
            params![date_str, revision as i64, updated_json],
        )?;
        Ok(())
    }

    fn list_habits(&self) -> AppResult<Vec<Habit>> {
        let conn = self.get_connection()?;
        let mut stmt =
            conn.prepare("SELECT id, name, archived, deleted, created_at FROM habits")?;
        let habits = stmt
            .query_map([], row_to_habit)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(habits)
    }

    fn add_habit(&self, habit: &Habit) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO habits (id, name, archived, deleted, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                habit.id,
                habit.name,
                habit.archived as i64,
                habit.deleted as i64,
                habit.created_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn archive_habit(&self, id: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute("UPDATE habits SET archived = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn soft_delete_habit(&self, id: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute("UPDATE habits SET deleted = 1 WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn upsert_habit_entry(&self, entry: &HabitEntry) -> AppResult<()> {
        let conn = self.get_connection()?;
        let day_str = entry.day.format("%Y-%m-%d").to_string();
        conn.execute(
            "INSERT INTO habit_entries (id, habit_id, day, completed) VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(habit_id, day) DO UPDATE SET completed = excluded.completed",
            params![entry.id, entry.habit_id, day_str, entry.completed as i64],
        )?;
        Ok(())
    }

    fn list_habit_entries(&self, habit_id: &str) -> AppResult<Vec<HabitEntry>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, day, completed FROM habit_entries WHERE habit_id = ?1",
        )?;
        let entries = stmt
            .query_map([habit_id], |row| {
                let day_str: String = row.get("day")?;
                Ok(HabitEntry {
                    id: row.get("id")?,
                    habit_id: row.get("habit_id")?,
                    day: NaiveDate::parse_from_str(&day_str, "%Y-%m-%d").map_err(json_err)?,
                    completed: row.get::<_, i64>("completed")? != 0,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }

    fn get_ot_entry(&self, day: NaiveDate) -> AppResult<Option<OtEntry>> {
        let conn = self.get_connection()?;
        let day_str = day.format("%Y-%m-%d").to_string();
        let entry = conn
            .query_row("SELECT day, note FROM ot_entries WHERE day = ?1", [&day_str], |row| {
                let day_str: String = row.get(0)?;
                Ok(OtEntry {
                    day: NaiveDate::parse_from_str(&day_str, "%Y-%m-%d").map_err(json_err)?,
                    note: row.get(1)?,
                })
            })
            .optional()?;
        Ok(entry)
    }

    fn upsert_ot_entry(&self, entry: &OtEntry) -> AppResult<()> {
        let conn = self.get_connection()?;
        let day_str = entry.day.format("%Y-%m-%d").to_string();
        conn.execute(
            "INSERT INTO ot_entries (day, note) VALUES (?1, ?2)
             ON CONFLICT(day) DO UPDATE SET note = excluded.note",
            params![day_str, entry.note],
        )?;
        Ok(())
    }

    fn list_alerts(&self) -> AppResult<Vec<Alert>> {
        let conn = self.get_connection()?;
        let mut stmt = conn.prepare(
            "SELECT id, message, time, schedule_json, active, created_at, last_sent FROM alerts",
        )?;
        let alerts = stmt
            .query_map([], row_to_alert)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(alerts)
    }

    fn add_alert(&self, alert: &Alert) -> AppResult<()> {
        let conn = self.get_connection()?;
        conn.execute(
            "INSERT INTO alerts (id, message, time, schedule_json, active, created_at, last_sent)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                alert.id,
                alert.message,
                alert.time,
                serde_json::to_string(&alert.schedule)?,
                alert.active as i64,
                alert.created_at.to_rfc3339(),
                alert.last_sent.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn update_alert(&self, alert: &Alert) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute(
            "UPDATE alerts SET message = ?2, time = ?3, schedule_json = ?4, active = ?5,
                created_at = ?6, last_sent = ?7
             WHERE id = ?1",
            params![
                alert.id,
                alert.message,
                alert.time,
                serde_json::to_string(&alert.schedule)?,
                alert.active as i64,
                alert.created_at.to_rfc3339(),
                alert.last_sent.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn delete_alert(&self, id: &str) -> AppResult<()> {
        let conn = self.get_connection()?;
        let changed = conn.execute("DELETE FROM alerts WHERE id = ?1", [id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Recurrence;
    use crate::models::TaskSchedule;

    fn store() -> (tempfile::TempDir, SqliteStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteStore::new(dir.path().join("daylit.db"));
        store.init().unwrap();
        (dir, store)
    }

    #[test]
    fn settings_default_on_fresh_store() {
        let (_dir, store) = store();
        let settings = store.get_settings().unwrap();
        assert_eq!(settings.day_window.start, 420);
    }

    #[test]
    fn task_round_trips() {
        let (_dir, store) = store();
        let task = Task::new(
            "t1",
            "Read",
            TaskSchedule::Flexible {
                earliest_start: None,
                latest_end: None,
            },
            30,
            Recurrence::Daily,
            2,
            true,
        )
        .unwrap();
        store.add_task(&task).unwrap();
        let fetched = store.get_task_by_id("t1").unwrap();
        assert_eq!(fetched.name, "Read");
        assert_eq!(fetched.duration_min, 30);
    }

    #[test]
    fn plan_revision_allocation_and_immutability() {
        let (_dir, store) = store();
        let date = NaiveDate::from_ymd_opt(2026, 1, 6).unwrap();
        let plan = DayPlan::new_proposal(date, vec![]);

        let saved = store.save_plan(&plan).unwrap();
        assert_eq!(saved.revision, 1);

        let mut overwritten = saved.clone();
        overwritten.accepted_at = Some(Utc::now());
        let accepted = store.save_plan(&overwritten).unwrap();
        assert_eq!(accepted.revision, 1);

        let mut reattempt = accepted.clone();
        reattempt.accepted_at = None;
        assert!(store.save_plan(&reattempt).is_err());

        let next = DayPlan::new_proposal(date, vec![]);
        let saved_again = store.save_plan(&next).unwrap();
        assert_eq!(saved_again.revision, 2);
    }

    #[test]
    fn soft_delete_and_restore_task() {
        let (_dir, store) = store();
        let task = Task::new(
            "t2",
            "Walk",
            TaskSchedule::Flexible {
                earliest_start: None,
                latest_end: None,
            },
            15,
            Recurrence::Daily,
            3,
            true,
        )
        .unwrap();
        store.add_task(&task).unwrap();
        store.soft_delete_task("t2").unwrap();
        assert!(store.get_task_by_id("t2").is_err());
        store.restore_task("t2").unwrap();
        assert!(store.get_task_by_id("t2").is_ok());
    }
}
