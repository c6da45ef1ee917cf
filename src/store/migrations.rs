//! An ordered, idempotent schema upgrade path recorded in a
//! single-row `schema_version` table rather than a SQLite-specific
//! pragma, so the same logic can run unmodified against the Postgres
//! backend.

use rusqlite::Connection;
use tracing::info;

use crate::error::{AppError, AppResult};

pub type Migration = (i64, &'static str);

/// Embedded, ordered schema. Each entry runs once, inside its own
/// transaction, the first time a connection is opened against a
/// database below that version.
pub const SQLITE_MIGRATIONS: &[Migration] = &[
    (
        1,
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);

        CREATE TABLE IF NOT EXISTS settings (
            id INTEGER PRIMARY KEY CHECK (id = 1),
            day_start INTEGER NOT NULL,
            day_end INTEGER NOT NULL,
            default_block_min INTEGER NOT NULL,
            timezone TEXT NOT NULL,
            notifications_enabled INTEGER NOT NULL,
            notify_block_start INTEGER NOT NULL,
            notify_block_end INTEGER NOT NULL,
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
            active INTEGER NOT NULL,
            success_streak INTEGER NOT NULL DEFAULT 0,
            avg_actual_duration_min REAL NOT NULL DEFAULT 0,
            last_done TEXT,
            deleted INTEGER NOT NULL DEFAULT 0
        );
        CREATE INDEX IF NOT EXISTS idx_tasks_active ON tasks(active);

        CREATE TABLE IF NOT EXISTS plans (
            date TEXT NOT NULL,
            revision INTEGER NOT NULL,
            accepted_at TEXT,
            slots_json TEXT NOT NULL,
            deleted INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (date, revision)
        );
        CREATE INDEX IF NOT EXISTS idx_plans_date ON plans(date);

        CREATE TABLE IF NOT EXISTS alerts (
            id TEXT PRIMARY KEY,
            message TEXT NOT NULL,
            time INTEGER NOT NULL,
            schedule_json TEXT NOT NULL,
            active INTEGER NOT NULL,
            created_at TEXT NOT NULL,
            last_sent TEXT
        );

        CREATE TABLE IF NOT EXISTS habits (
            id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            archived INTEGER NOT NULL DEFAULT 0,
            deleted INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS habit_entries (
            id TEXT PRIMARY KEY,
            habit_id TEXT NOT NULL REFERENCES habits(id),
            day TEXT NOT NULL,
            completed INTEGER NOT NULL,
            UNIQUE (habit_id, day)
        );

        CREATE TABLE IF NOT EXISTS ot_entries (
            day TEXT PRIMARY KEY,
            note TEXT NOT NULL
        );
        "#,
    ),
];

/// Applies every migration with `version > current` in ascending
/// order, each inside its own transaction, updating `schema_version`
/// after each success. Returns the count applied.
pub fn apply(conn: &mut Connection, migrations: &[Migration]) -> AppResult<usize> {
    conn.execute_batch("CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL)")?;

    let current: i64 = conn
        .query_row("SELECT version FROM schema_version LIMIT 1", [], |row| row.get(0))
        .unwrap_or(0);

    let latest = migrations.iter().map(|(v, _)| *v).max().unwrap_or(0);
    if current > latest {
        return Err(AppError::corruption(format!(
            "database schema version {current} is newer than this binary supports ({latest})"
        )));
    }

    let mut applied = 0;
    let mut version = current;

    for (migration_version, script) in migrations.iter().filter(|(v, _)| *v > current) {
        info!(target: "daylit::store", version = migration_version, "running migration");
        let tx = conn.transaction()?;
        tx.execute_batch(script)?;
        tx.execute("DELETE FROM schema_version", [])?;
        tx.execute("INSERT INTO schema_version (version) VALUES (?1)", [migration_version])?;
        tx.commit()?;
        version = *migration_version;
        applied += 1;
    }

    let _ = version;
    Ok(applied)
}
