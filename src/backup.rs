//! Timestamped snapshots of the embedded database file, rotation, and
//! verified restore. Reuses the store's WAL/busy-timeout connection
//! configuration for the checkpoint fallback path.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::error::{AppError, AppResult};

const MAX_BACKUPS: usize = 14;
const MAX_COUNTER_ATTEMPTS: u32 = 100;

pub struct BackupManager {
    db_path: PathBuf,
}

impl BackupManager {
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        BackupManager {
            db_path: db_path.into(),
        }
    }

    fn backups_dir(&self) -> PathBuf {
        self.db_path
            .parent()
            .map(|parent| parent.join("backups"))
            .unwrap_or_else(|| PathBuf::from("backups"))
    }

    /// Public entry point: snapshot now, with rotation.
    pub fn create(&self) -> AppResult<PathBuf> {
        self.snapshot_at(Utc::now(), true)
    }

    pub fn list(&self) -> AppResult<Vec<PathBuf>> {
        let dir = self.backups_dir();
        if !dir.exists() {
            return Ok(Vec::new());
        }
        let mut entries: Vec<(NaiveDateTime, PathBuf)> = fs::read_dir(&dir)?
            .filter_map(|entry| entry.ok())
            .filter_map(|entry| {
                let path = entry.path();
                let name = path.file_name()?.to_str()?;
                parse_backup_timestamp(name).map(|ts| (ts, path))
            })
            .collect();
        entries.sort_by_key(|(ts, _)| *ts);
        Ok(entries.into_iter().map(|(_, path)| path).collect())
    }

    pub fn restore(&self, backup_file: &Path) -> AppResult<()> {
        verify_sqlite_file(backup_file)?;

        self.snapshot_at(Utc::now(), false)?;

        let tmp_path = self.db_path.with_extension("restore.tmp");
        fs::copy(backup_file, &tmp_path)?;

        for sidecar_ext in ["db-wal", "db-shm"] {
            let sidecar = self.db_path.with_extension(sidecar_ext);
            if sidecar.exists() {
                fs::remove_file(&sidecar)?;
            }
        }

        fs::rename(&tmp_path, &self.db_path)?;
        info!(target: "daylit::backup", backup = %backup_file.display(), "restore complete");
        Ok(())
    }

    fn snapshot_at(&self, now: DateTime<Utc>, run_rotation: bool) -> AppResult<PathBuf> {
        if !self.db_path.exists() {
            return Err(AppError::precondition("database file does not exist"));
        }

        let dir = self.backups_dir();
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }

        let target = self.next_available_name(&dir, now)?;

        if let Err(err) = vacuum_into(&self.db_path, &target) {
            warn!(target: "daylit::backup", error = %err, "VACUUM INTO failed, falling back to checkpoint + copy");
            checkpoint_and_copy(&self.db_path, &target)?;
        }

        if run_rotation {
            self.rotate()?;
        }

        Ok(target)
    }

    fn next_available_name(&self, dir: &Path, now: DateTime<Utc>) -> AppResult<PathBuf> {
        let minute_name = format!("daylit-{}.db", now.format("%Y%m%d-%H%M"));
        let minute_path = dir.join(&minute_name);
        if !minute_path.exists() {
            return Ok(minute_path);
        }

        let second_name = format!("daylit-{}.db", now.format("%Y%m%d-%H%M%S"));
        let second_path = dir.join(&second_name);
        if !second_path.exists() {
            return Ok(second_path);
        }

        for counter in 1..=MAX_COUNTER_ATTEMPTS {
            let name = format!("daylit-{}-{}.db", now.format("%Y%m%d-%H%M%S"), counter);
            let path = dir.join(&name);
            if !path.exists() {
                return Ok(path);
            }
        }

        let nanos = now.timestamp_subsec_nanos();
        let name = format!("daylit-{}-{}.db", now.format("%Y%m%d-%H%M%S"), nanos);
        Ok(dir.join(name))
    }

    fn rotate(&self) -> AppResult<()> {
        let backups = self.list()?;
        if backups.len() <= MAX_BACKUPS {
            return Ok(());
        }
        let to_remove = backups.len() - MAX_BACKUPS;
        for path in backups.into_iter().take(to_remove) {
            fs::remove_file(&path)?;
            info!(target: "daylit::backup", removed = %path.display(), "rotated old backup");
        }
        Ok(())
    }
}

fn vacuum_into(source: &Path, target: &Path) -> AppResult<()> {
    let conn = Connection::open_with_flags(source, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let target_str = target
        .to_str()
        .ok_or_else(|| AppError::other("backup target path is not valid UTF-8"))?;
    conn.execute(&format!("VACUUM INTO '{target_str}'"), [])?;
    Ok(())
}

fn checkpoint_and_copy(source: &Path, target: &Path) -> AppResult<()> {
    let conn = Connection::open(source)?;
    conn.query_row("PRAGMA wal_checkpoint(TRUNCATE)", [], |_| Ok(()))?;
    drop(conn);
    fs::copy(source, target)?;
    Ok(())
}

fn verify_sqlite_file(path: &Path) -> AppResult<()> {
    if !path.exists() {
        return Err(AppError::precondition(format!(
            "backup file '{}' does not exist",
            path.display()
        )));
    }
    let conn = Connection::open_with_flags(path, rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|_| AppError::precondition("backup file is not a valid database"))?;
    conn.query_row("SELECT count(*) FROM sqlite_master", [], |row| row.get::<_, i64>(0))
        .map_err(|_| AppError::precondition("backup file is corrupted or not a database"))?;
    Ok(())
}

fn parse_backup_timestamp(name: &str) -> Option<NaiveDateTime> {
    let stem = name.strip_prefix("daylit-")?.strip_suffix(".db")?;
    let parts: Vec<&str> = stem.split('-').collect();
    if parts.len() < 2 || parts.len() > 3 {
        return None;
    }

    let date_part = parts[0];
    let time_part = parts[1];
    if date_part.len() != 8 {
        return None;
    }

    let date = NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()?;
    let time = match time_part.len() {
        4 => NaiveTime::parse_from_str(time_part, "%H%M").ok()?,
        6 => NaiveTime::parse_from_str(time_part, "%H%M%S").ok()?,
        _ => return None,
    };

    Some(NaiveDateTime::new(date, time))
}
