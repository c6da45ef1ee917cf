//! Remote backend. Uses the synchronous `postgres` crate behind an
//! `r2d2` connection pool, keeping this crate single-threaded and
//! synchronous with no async runtime. Habits and OT entries are
//! embedded-only and return `AppError::Unsupported` here.

use chrono::{DateTime, NaiveDate, Utc};
use postgres::NoTls;
use r2d2::Pool;
use r2d2_postgres::PostgresConnectionManager;

use crate::error::{AppError, AppResult};
use crate::models::{Alert, DayPlan, Habit, HabitEntry, OtEntry, Settings, Slot, Task, TaskStats};
use crate::store::{Feature, NotificationBoundary, StorageProvider};
use crate::time::{DayWindow, MinuteOfDay};

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);

CREATE TABLE IF NOT EXISTS settings (
    id INTEGER PRIMARY KEY,
    day_start INTEGER NOT NULL,
    day_end INTEGER NOT NULL,
    default_block_min INTEGER NOT NULL,
    timezone TEXT NOT NULL,
    notifications_enabled BOOLEAN NOT NULL,
    notify_block_start BOOLEAN NOT NULL,
    notify_block_end BOOLEAN NOT NULL,
    block_start_offset_min INTEGER NOT NULL,
    block_end_offset_min INTEGER NOT NULL,
    notification_grace_period_min INTEGER NOT NULL
);

CREATE TABLE IF NOT EXISTS tasks (
    id TEXT PRIMARY KEY,
    name TEXT NOT NULL,
    schedule_json TEXT NOT NULL,
    duration_min INTEGER NOT NULL,
    recurrence_json TEXT NOT NULL,
    priority INTEGER NOT NULL,
    active BOOLEAN NOT NULL,
    success_streak INTEGER NOT NULL DEFAULT 0,
    avg_actual_duration_min DOUBLE PRECISION NOT NULL DEFAULT 0,
    last_done TEXT,
    deleted BOOLEAN NOT NULL DEFAULT FALSE
);

CREATE TABLE IF NOT EXISTS plans (
    date TEXT NOT NULL,
    revision INTEGER NOT NULL,
    accepted_at TEXT,
    slots_json TEXT NOT NULL,
    deleted BOOLEAN NOT NULL DEFAULT FALSE,
    PRIMARY KEY (date, revision)
);

CREATE TABLE IF NOT EXISTS alerts (
    id TEXT PRIMARY KEY,
    message TEXT NOT NULL,
    time INTEGER NOT NULL,
    schedule_json TEXT NOT NULL,
    active BOOLEAN NOT NULL,
    created_at TEXT NOT NULL,
    last_sent TEXT
);
"#;

pub struct PostgresStore {
    pool: Pool<PostgresConnectionManager<NoTls>>,
    connection_string: String,
}

impl PostgresStore {
    pub fn connect(connection_string: &str) -> AppResult<Self> {
        let config = connection_string
            .parse()
            .map_err(|_| AppError::validation("invalid postgres connection string"))?;
        let manager = PostgresConnectionManager::new(config, NoTls);
        let pool = Pool::new(manager)?;
        Ok(PostgresStore {
            pool,
            connection_string: connection_string.to_string(),
        })
    }

    fn ensure_schema(&self) -> AppResult<()> {
        let mut conn = self.pool.get()?;
        conn.batch_execute(SCHEMA_SQL)?;
        let current: i64 = conn
            .query_opt("SELECT version FROM schema_version LIMIT 1", &[])?
            .map(|row| row.get(0))
            .unwrap_or(0);
        if current == 0 {
            conn.execute("INSERT INTO schema_version (version) VALUES (1)", &[])?;
        }
        Ok(())
    }
}

fn row_to_task(row: &postgres::Row) -> AppResult<Task> {
    let schedule_json: String = row.get("schedule_json");
    let recurrence_json: String = row.get("recurrence_json");
    let last_done: Option<String> = row.get("last_done");

    Ok(Task {
        id: row.get("id"),
        name: row.get("name"),
        schedule: serde_json::from_str(&schedule_json)?,
        duration_min: row.get::<_, i32>("duration_min") as u32,
        recurrence: serde_json::from_str(&recurrence_json)?,
        priority: row.get::<_, i32>("priority") as u8,
        active: row.get("active"),
        stats: TaskStats {
            success_streak: row.get::<_, i32>("success_streak") as u32,
            avg_actual_duration_min: row.get("avg_actual_duration_min"),
            last_done: last_done
                .map(|s| NaiveDate::parse_from_str(&s, "%Y-%m-%d"))
                .transpose()
                .map_err(|e| AppError::corruption(e.to_string()))?,
        },
    })
}

fn row_to_alert(row: &postgres::Row) -> AppResult<Alert> {
    let schedule_json: String = row.get("schedule_json");
    let created_at_str: String = row.get("created_at");
    let last_sent_str: Option<String> = row.get("last_sent");

    Ok(Alert {
        id: row.get("id"),
        message: row.get("message"),
        time: row.get::<_, i32>("time") as MinuteOfDay,
        schedule: serde_json::from_str(&schedule_json)?,
        active: row.get("active"),
        created_at: DateTime::parse_from_rfc3339(&created_at_str)
            .map_err(|e| AppError::corruption(e.to_string()))?
            .with_timezone(&Utc),
        last_sent: last_sent_str
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| AppError::corruption(e.to_string()))?,
    })
}

impl StorageProvider for PostgresStore {
    fn init(&self) -> AppResult<()> {
        self.ensure_schema()
    }

    fn load(&self) -> AppResult<()> {
        self.ensure_schema()
    }

    fn close(&self) -> AppResult<()> {
        Ok(())
    }

    fn supports(&self, feature: Feature) -> bool {
        !matches!(feature, Feature::Habits | Feature::OtEntries)
    }

    fn get_config_path(&self) -> String {
        self.connection_string.clone()
    }

    fn get_settings(&self) -> AppResult<Settings> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let row = conn.query_opt(
            "SELECT day_start, day_end, default_block_min, timezone, notifications_enabled,
                    notify_block_start, notify_block_end, block_start_offset_min,
                    block_end_offset_min, notification_grace_period_min
             FROM settings WHERE id = 1",
            &[],
        )?;
        let settings = row
            .map(|row| Settings {
                day_window: DayWindow {
                    start: row.get::<_, i32>(0) as MinuteOfDay,
                    end: row.get::<_, i32>(1) as MinuteOfDay,
                },
                default_block_min: row.get::<_, i32>(2) as u32,
                timezone: row.get(3),
                notifications_enabled: row.get(4),
                notify_block_start: row.get(5),
                notify_block_end: row.get(6),
                block_start_offset_min: row.get::<_, i32>(7) as u32,
                block_end_offset_min: row.get::<_, i32>(8) as u32,
                notification_grace_period_min: row.get::<_, i32>(9) as u32,
            })
            .unwrap_or_default();
        Ok(settings)
    }

    fn save_settings(&self, settings: &Settings) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO settings (id, day_start, day_end, default_block_min, timezone,
                notifications_enabled, notify_block_start, notify_block_end,
                block_start_offset_min, block_end_offset_min, notification_grace_period_min)
             VALUES (1, $1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             ON CONFLICT (id) DO UPDATE SET
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
            &[
                &(settings.day_window.start),
                &(settings.day_window.end),
                &(settings.default_block_min as i32),
                &settings.timezone,
                &settings.notifications_enabled,
                &settings.notify_block_start,
                &settings.notify_block_end,
                &(settings.block_start_offset_min as i32),
                &(settings.block_end_offset_min as i32),
                &(settings.notification_grace_period_min as i32),
            ],
        )?;
        Ok(())
    }

    fn add_task(&self, task: &Task) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO tasks (id, name, schedule_json, duration_min, recurrence_json, priority,
                active, success_streak, avg_actual_duration_min, last_done, deleted)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, FALSE)",
            &[
                &task.id,
                &task.name,
                &serde_json::to_string(&task.schedule)?,
                &(task.duration_min as i32),
                &serde_json::to_string(&task.recurrence)?,
                &(task.priority as i32),
                &task.active,
                &(task.stats.success_streak as i32),
                &task.stats.avg_actual_duration_min,
                &task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        Ok(())
    }

    fn update_task(&self, task: &Task) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let changed = conn.execute(
            "UPDATE tasks SET name = $2, schedule_json = $3, duration_min = $4,
                recurrence_json = $5, priority = $6, active = $7, success_streak = $8,
                avg_actual_duration_min = $9, last_done = $10
             WHERE id = $1",
            &[
                &task.id,
                &task.name,
                &serde_json::to_string(&task.schedule)?,
                &(task.duration_min as i32),
                &serde_json::to_string(&task.recurrence)?,
                &(task.priority as i32),
                &task.active,
                &(task.stats.success_streak as i32),
                &task.stats.avg_actual_duration_min,
                &task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn get_task_by_id(&self, id: &str) -> AppResult<Task> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let row = conn.query_opt(
            "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                    success_streak, avg_actual_duration_min, last_done
             FROM tasks WHERE id = $1 AND deleted = FALSE",
            &[&id],
        )?;
        match row {
            Some(row) => row_to_task(&row),
            None => Err(AppError::not_found()),
        }
    }

    fn list_active_tasks(&self) -> AppResult<Vec<Task>> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let rows = conn.query(
            "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                    success_streak, avg_actual_duration_min, last_done
             FROM tasks WHERE deleted = FALSE AND active = TRUE",
            &[],
        )?;
        rows.iter().map(row_to_task).collect()
    }

    fn list_tasks_including_deleted(&self) -> AppResult<Vec<Task>> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let rows = conn.query(
            "SELECT id, name, schedule_json, duration_min, recurrence_json, priority, active,
                    success_streak, avg_actual_duration_min, last_done
             FROM tasks",
            &[],
        )?;
        rows.iter().map(row_to_task).collect()
    }

    fn soft_delete_task(&self, id: &str) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let changed = conn.execute("UPDATE tasks SET deleted = TRUE WHERE id = $1", &[&id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn restore_task(&self, id: &str) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let changed = conn.execute("UPDATE tasks SET deleted = FALSE WHERE id = $1", &[&id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn save_plan(&self, plan: &DayPlan) -> AppResult<DayPlan> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let mut tx = conn.transaction()?;
        let date_str = plan.date.format("%Y-%m-%d").to_string();

        let revision: i32 = if plan.revision == 0 {
            let max: Option<i32> = tx
                .query_opt("SELECT MAX(revision) FROM plans WHERE date = $1", &[&date_str])?
                .and_then(|row| row.get(0));
            max.unwrap_or(0) + 1
        } else {
            let row = tx.query_opt(
                "SELECT accepted_at FROM plans WHERE date = $1 AND revision = $2",
                &[&date_str, &(plan.revision as i32)],
            )?;
            match row {
                None => return Err(AppError::precondition("plan revision does not exist")),
                Some(row) => {
                    let accepted_at: Option<String> = row.get(0);
                    if accepted_at.is_some() {
                        return Err(AppError::precondition(
                            "plan revision is already accepted and immutable",
                        ));
                    }
                }
            }
            plan.revision as i32
        };

        let slots_json = serde_json::to_string(&plan.slots)?;
        let accepted_at_str = plan.accepted_at.map(|ts| ts.to_rfc3339());

        tx.execute(
            "INSERT INTO plans (date, revision, accepted_at, slots_json, deleted)
             VALUES ($1, $2, $3, $4, FALSE)
             ON CONFLICT (date, revision) DO UPDATE SET
                accepted_at = excluded.accepted_at,
                slots_json = excluded.slots_json",
            &[&date_str, &revision, &accepted_at_str, &slots_json],
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
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let row = conn.query_opt(
            "SELECT revision, accepted_at, slots_json FROM plans
             WHERE date = $1 AND deleted = FALSE ORDER BY revision DESC LIMIT 1",
            &[&date_str],
        )?;
        row.map(|row| plan_from_row(date, &row)).transpose()
    }

    fn commit_feedback(&self, plan: &DayPlan, task: &Task) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let mut tx = conn.transaction()?;
        let date_str = plan.date.format("%Y-%m-%d").to_string();
        let slots_json = serde_json::to_string(&plan.slots)?;

        let changed = tx.execute(
            "UPDATE plans SET slots_json = $3 WHERE date = $1 AND revision = $2",
            &[&date_str, &(plan.revision as i32), &slots_json],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }

        let changed = tx.execute(
            "UPDATE tasks SET name = $2, schedule_json = $3, duration_min = $4,
                recurrence_json = $5, priority = $6, active = $7, success_streak = $8,
                avg_actual_duration_min = $9, last_done = $10
             WHERE id = $1",
            &[
                &task.id,
                &task.name,
                &serde_json::to_string(&task.schedule)?,
                &(task.duration_min as i32),
                &serde_json::to_string(&task.recurrence)?,
                &(task.priority as i32),
                &task.active,
                &(task.stats.success_streak as i32),
                &task.stats.avg_actual_duration_min,
                &task.stats.last_done.map(|d| d.format("%Y-%m-%d").to_string()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }

        tx.commit()?;
        Ok(())
    }

    fn get_plan_revision(&self, date: NaiveDate, revision: u32) -> AppResult<DayPlan> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let row = conn.query_opt(
            "SELECT revision, accepted_at, slots_json FROM plans WHERE date = $1 AND revision = $2",
            &[&date_str, &(revision as i32)],
        )?;
        match row {
            Some(row) => plan_from_row(date, &row),
            None => Err(AppError::not_found()),
        }
    }

    fn soft_delete_plan(&self, date: NaiveDate) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        conn.execute("UPDATE plans SET deleted = TRUE WHERE date = $1", &[&date_str])?;
        Ok(())
    }

    fn restore_plan(&self, date: NaiveDate) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        conn.execute("UPDATE plans SET deleted = FALSE WHERE date = $1", &[&date_str])?;
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
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let date_str = date.format("%Y-%m-%d").to_string();
        let row = conn
            .query_opt(
                "SELECT slots_json FROM plans WHERE date = $1 AND revision = $2",
                &[&date_str, &(revision as i32)],
            )?
            .ok_or_else(AppError::not_found)?;
        let slots_json: String = row.get(0);
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
            "UPDATE plans SET slots_json = $3 WHERE date = $1 AND revision = $2",
            &[&date_str, &(revision as i32), &updated_json],
        )?;
        Ok(())
    }

    fn list_habits(&self) -> AppResult<Vec<Habit>> {
        Err(AppError::unsupported("habits"))
    }

    fn add_habit(&self, _habit: &Habit) -> AppResult<()> {
        Err(AppError::unsupported("habits"))
    }

    fn archive_habit(&self, _id: &str) -> AppResult<()> {
        Err(AppError::unsupported("habits"))
    }

    fn soft_delete_habit(&self, _id: &str) -> AppResult<()> {
        Err(AppError::unsupported("habits"))
    }

    fn upsert_habit_entry(&self, _entry: &HabitEntry) -> AppResult<()> {
        Err(AppError::unsupported("habit entries"))
    }

    fn list_habit_entries(&self, _habit_id: &str) -> AppResult<Vec<HabitEntry>> {
        Err(AppError::unsupported("habit entries"))
    }

    fn get_ot_entry(&self, _day: NaiveDate) -> AppResult<Option<OtEntry>> {
        Err(AppError::unsupported("once-today entries"))
    }

    fn upsert_ot_entry(&self, _entry: &OtEntry) -> AppResult<()> {
        Err(AppError::unsupported("once-today entries"))
    }

    fn list_alerts(&self) -> AppResult<Vec<Alert>> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let rows = conn.query(
            "SELECT id, message, time, schedule_json, active, created_at, last_sent FROM alerts",
            &[],
        )?;
        rows.iter().map(row_to_alert).collect()
    }

    fn add_alert(&self, alert: &Alert) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        conn.execute(
            "INSERT INTO alerts (id, message, time, schedule_json, active, created_at, last_sent)
             VALUES ($1, $2, $3, $4, $5, $6, $7)",
            &[
                &alert.id,
                &alert.message,
                &alert.time,
                &serde_json::to_string(&alert.schedule)?,
                &alert.active,
                &alert.created_at.to_rfc3339(),
                &alert.last_sent.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        Ok(())
    }

    fn update_alert(&self, alert: &Alert) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let changed = conn.execute(
            "UPDATE alerts SET message = $2, time = $3, schedule_json = $4, active = $5,
                created_at = $6, last_sent = $7
             WHERE id = $1",
            &[
                &alert.id,
                &alert.message,
                &alert.time,
                &serde_json::to_string(&alert.schedule)?,
                &alert.active,
                &alert.created_at.to_rfc3339(),
                &alert.last_sent.map(|ts| ts.to_rfc3339()),
            ],
        )?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }

    fn delete_alert(&self, id: &str) -> AppResult<()> {
        self.ensure_schema()?;
        let mut conn = self.pool.get()?;
        let changed = conn.execute("DELETE FROM alerts WHERE id = $1", &[&id])?;
        if changed == 0 {
            return Err(AppError::not_found());
        }
        Ok(())
    }
}

fn plan_from_row(date: NaiveDate, row: &postgres::Row) -> AppResult<DayPlan> {
    let accepted_at_str: Option<String> = row.get("accepted_at");
    let slots_json: String = row.get("slots_json");
    Ok(DayPlan {
        date,
        revision: row.get::<_, i32>("revision") as u32,
        accepted_at: accepted_at_str
            .map(|s| DateTime::parse_from_rfc3339(&s).map(|dt| dt.with_timezone(&Utc)))
            .transpose()
            .map_err(|e| AppError::corruption(e.to_string()))?,
        slots: serde_json::from_str(&slots_json)?,
    })
}
