//! `init`/`migrate`/`doctor`/`tui`/`debug`/`validate`/`backup`/
//! `restore`/`keyring`/`settings`/`notify` — the administrative verb
//! group. These touch the store's lifecycle and ambient surfaces
//! rather than the scheduling domain itself.

use chrono::Utc;

use crate::cli::{BackupCommand, DebugCommand, KeyringCommand, RestoreCommand};
use crate::commands::plans::parse_date_arg;
use crate::commands::{log_ok, AppContext};
use crate::error::{AppError, AppResult};
use crate::keyring_store;
use crate::time::{parse_hhmm, DayWindow};
use crate::validator;

pub fn init(ctx: &AppContext, force: bool, source: Option<String>) -> AppResult<()> {
    let path = std::path::PathBuf::from(ctx.store.get_config_path());
    if path.exists() && !force {
        return Err(AppError::precondition(format!(
            "'{}' already exists; pass --force to reinitialize",
            path.display()
        )));
    }

    ctx.store.init()?;
    println!("initialized store at {}", ctx.store.get_config_path());

    if let Some(source) = source {
        let backup = ctx
            .backup
            .as_ref()
            .ok_or_else(|| AppError::unsupported("restoring from a backup file"))?;
        backup.restore(std::path::Path::new(&source))?;
        println!("restored initial data from {source}");
    }

    log_ok("init");
    Ok(())
}

pub fn migrate(ctx: &AppContext) -> AppResult<()> {
    ctx.store.init()?;
    println!("schema is up to date");
    log_ok("migrate");
    Ok(())
}

pub fn doctor(ctx: &AppContext) -> AppResult<()> {
    ctx.store.load()?;
    println!("store is reachable at {}", ctx.store.get_config_path());

    let settings = ctx.store.get_settings()?;
    let tasks = ctx.store.list_active_tasks()?;

    let today = Utc::now().date_naive();
    let horizon: Vec<_> = (0..14).map(|offset| today + chrono::Duration::days(offset)).collect();
    let task_report = validator::validate_tasks(&tasks, &horizon);
    if task_report.is_clean() {
        println!("tasks: no conflicts found");
    } else {
        for conflict in &task_report.conflicts {
            println!("tasks: {}", conflict.description);
        }
    }

    if let Some(plan) = ctx.store.get_latest_plan_revision(today)? {
        let known_ids: Vec<String> = tasks.iter().map(|task| task.id.clone()).collect();
        let plan_report = validator::validate_plan(&plan, settings.day_window, &known_ids);
        if plan_report.is_clean() {
            println!("today's plan: no conflicts found");
        } else {
            for conflict in &plan_report.conflicts {
                println!("today's plan: {}", conflict.description);
            }
        }
    }

    if ctx.store.supports(crate::store::Feature::Habits) {
        for habit in ctx.store.list_habits()? {
            let entries = ctx.store.list_habit_entries(&habit.id)?;
            if habit.deleted && !entries.is_empty() {
                println!(
                    "habits: '{}' is deleted but still has {} entries",
                    habit.name,
                    entries.len()
                );
            }
        }
    }

    log_ok("doctor");
    Ok(())
}

pub fn tui() -> AppResult<()> {
    println!("the interactive terminal UI ships as a separate `daylit-tui` binary");
    log_ok("tui");
    Ok(())
}

pub fn debug(ctx: &AppContext, command: DebugCommand) -> AppResult<()> {
    match command {
        DebugCommand::Config => {
            println!("config path: {}", ctx.store.get_config_path());
            println!(
                "supports habits: {}",
                ctx.store.supports(crate::store::Feature::Habits)
            );
            println!(
                "supports once-today entries: {}",
                ctx.store.supports(crate::store::Feature::OtEntries)
            );
        }
        DebugCommand::SchemaVersion => {
            ctx.store.init()?;
            println!("schema is initialized and current for this binary");
        }
    }
    log_ok("debug");
    Ok(())
}

pub fn validate(ctx: &AppContext) -> AppResult<()> {
    let tasks = ctx.store.list_active_tasks()?;
    let today = Utc::now().date_naive();
    let horizon: Vec<_> = (0..28).map(|offset| today + chrono::Duration::days(offset)).collect();
    let report = validator::validate_tasks(&tasks, &horizon);
    if report.is_clean() {
        println!("no conflicts found across the next {} days", horizon.len());
    } else {
        for conflict in &report.conflicts {
            println!("{}", conflict.description);
        }
    }
    log_ok("validate");
    Ok(())
}

pub fn backup(ctx: &AppContext, command: BackupCommand) -> AppResult<()> {
    let manager = ctx
        .backup
        .as_ref()
        .ok_or_else(|| AppError::unsupported("backups on the remote storage backend"))?;

    match command {
        BackupCommand::Create => {
            let path = manager.create()?;
            println!("created backup {}", path.display());
        }
        BackupCommand::List => {
            for path in manager.list()? {
                println!("{}", path.display());
            }
        }
        BackupCommand::Restore { file } => {
            manager.restore(std::path::Path::new(&file))?;
            println!("restored from {file}");
        }
    }
    log_ok("backup");
    Ok(())
}

pub fn restore(ctx: &AppContext, command: RestoreCommand) -> AppResult<()> {
    match command {
        RestoreCommand::Task { id } => {
            ctx.store.restore_task(&id)?;
            println!("restored task {id}");
        }
        RestoreCommand::Plan { date } => {
            let date = parse_date_arg(&date)?;
            ctx.store.restore_plan(date)?;
            println!("restored plan for {date}");
        }
    }
    log_ok("restore");
    Ok(())
}

pub fn keyring(command: KeyringCommand) -> AppResult<()> {
    match command {
        KeyringCommand::Set { connection_string } => {
            keyring_store::set(&connection_string)?;
            println!("stored connection string in the OS keyring");
        }
        KeyringCommand::Get => match keyring_store::get()? {
            Some(value) => println!("{value}"),
            None => println!("no connection string is stored"),
        },
        KeyringCommand::Delete => {
            keyring_store::delete()?;
            println!("removed the stored connection string");
        }
        KeyringCommand::Status => {
            println!("stored: {}", keyring_store::status()?);
        }
    }
    Ok(())
}

/// Optional settings overrides from the `settings` verb; `None` fields
/// leave the current value in place.
pub struct SettingsEdits {
    pub day_start: Option<String>,
    pub day_end: Option<String>,
    pub default_block_min: Option<u32>,
    pub timezone: Option<String>,
    pub notifications_enabled: Option<bool>,
    pub notify_block_start: Option<bool>,
    pub notify_block_end: Option<bool>,
    pub block_start_offset_min: Option<u32>,
    pub block_end_offset_min: Option<u32>,
    pub notification_grace_period_min: Option<u32>,
}

pub fn settings(ctx: &AppContext, list: bool, edits: SettingsEdits) -> AppResult<()> {
    let mut current = ctx.store.get_settings()?;

    if list {
        print_settings(&current);
        return Ok(());
    }

    let start = match &edits.day_start {
        Some(value) => parse_hhmm(value)?,
        None => current.day_window.start,
    };
    let end = match &edits.day_end {
        Some(value) => parse_hhmm(value)?,
        None => current.day_window.end,
    };
    current.day_window = DayWindow::new(start, end)?;

    if let Some(value) = edits.default_block_min {
        current.default_block_min = value;
    }
    if let Some(value) = edits.timezone {
        current.timezone = value;
    }
    if let Some(value) = edits.notifications_enabled {
        current.notifications_enabled = value;
    }
    if let Some(value) = edits.notify_block_start {
        current.notify_block_start = value;
    }
    if let Some(value) = edits.notify_block_end {
        current.notify_block_end = value;
    }
    if let Some(value) = edits.block_start_offset_min {
        current.block_start_offset_min = value;
    }
    if let Some(value) = edits.block_end_offset_min {
        current.block_end_offset_min = value;
    }
    if let Some(value) = edits.notification_grace_period_min {
        current.notification_grace_period_min = value;
    }

    ctx.store.save_settings(&current)?;
    print_settings(&current);
    log_ok("settings");
    Ok(())
}

fn print_settings(settings: &crate::models::Settings) {
    println!(
        "day_window: {}-{}",
        crate::time::format_hhmm(settings.day_window.start),
        crate::time::format_hhmm(settings.day_window.end)
    );
    println!("default_block_min: {}", settings.default_block_min);
    println!("timezone: {}", settings.timezone);
    println!("notifications_enabled: {}", settings.notifications_enabled);
    println!("notify_block_start: {}", settings.notify_block_start);
    println!("notify_block_end: {}", settings.notify_block_end);
    println!("block_start_offset_min: {}", settings.block_start_offset_min);
    println!("block_end_offset_min: {}", settings.block_end_offset_min);
    println!(
        "notification_grace_period_min: {}",
        settings.notification_grace_period_min
    );
}

pub fn notify(ctx: &AppContext, dry_run: bool) -> AppResult<()> {
    let today = Utc::now().date_naive();
    let now = Utc::now();
    let local = chrono::Local::now().time();
    let current_minute =
        local.format("%H").to_string().parse::<i32>().unwrap_or(0) * 60
            + local.format("%M").to_string().parse::<i32>().unwrap_or(0);

    crate::notify::tick(
        ctx.store.as_ref(),
        ctx.tray.as_ref(),
        today,
        current_minute,
        now,
        dry_run,
    )?;
    log_ok("notify");
    Ok(())
}
