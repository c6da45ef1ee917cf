//! `plan`/`now`/`day`/`plans` verb group. There is no separate
//! "accept" verb, so `plan` generates a candidate, prints any validator
//! conflicts as warnings, accepts it immediately, and persists (see
//! DESIGN.md's Open Question resolution).

use chrono::{NaiveDate, Utc};
use tracing::warn;

use crate::cli::PlansCommand;
use crate::commands::{log_ok, AppContext};
use crate::error::{AppError, AppResult};
use crate::scheduler;
use crate::time::{format_hhmm, MinuteOfDay};
use crate::validator;

pub fn parse_date_arg(raw: &str) -> AppResult<NaiveDate> {
    if raw.eq_ignore_ascii_case("today") {
        return Ok(Utc::now().date_naive());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .map_err(|_| AppError::validation(format!("invalid date '{raw}', expected YYYY-MM-DD")))
}

pub fn plan(ctx: &AppContext, date_arg: &str, new_revision: bool) -> AppResult<()> {
    let date = parse_date_arg(date_arg)?;
    let settings = ctx.store.get_settings()?;
    let tasks = ctx.store.list_active_tasks()?;

    let mut generated = scheduler::generate(date, &tasks, settings.day_window.start, settings.day_window.end);

    let conflicts = validator::validate_plan(
        &generated,
        settings.day_window,
        &tasks.iter().map(|t| t.id.clone()).collect::<Vec<_>>(),
    );
    for conflict in &conflicts.conflicts {
        warn!(target: "daylit::cli", conflict = %conflict.description, "plan conflict");
        println!("warning: {}", conflict.description);
    }

    if !new_revision {
        if let Some(existing) = ctx.store.get_latest_plan_revision(date)? {
            if !existing.is_accepted() {
                generated.revision = existing.revision;
            }
        }
    }

    generated.accept(Utc::now())?;
    let saved = ctx.store.save_plan(&generated)?;

    println!("plan for {date} (revision {}):", saved.revision);
    print_slots(&tasks_by_id(&tasks), &saved.slots);
    log_ok("plan");
    Ok(())
}

pub fn day(ctx: &AppContext, date_arg: &str) -> AppResult<()> {
    let date = parse_date_arg(date_arg)?;
    match ctx.store.get_latest_plan_revision(date)? {
        Some(plan) => {
            let tasks = ctx.store.list_active_tasks()?;
            println!("plan for {date} (revision {}):", plan.revision);
            print_slots(&tasks_by_id(&tasks), &plan.slots);
        }
        None => println!("no plan exists for {date}"),
    }
    log_ok("day");
    Ok(())
}

pub fn now(ctx: &AppContext) -> AppResult<()> {
    let today = Utc::now().date_naive();
    let current_minute: MinuteOfDay = {
        let now = chrono::Local::now().time();
        now.format("%H").to_string().parse::<i32>().unwrap_or(0) * 60
            + now.format("%M").to_string().parse::<i32>().unwrap_or(0)
    };

    match ctx.store.get_latest_plan_revision(today)? {
        Some(plan) => {
            let current = plan
                .slots
                .iter()
                .find(|slot| slot.start <= current_minute && current_minute < slot.end);
            match current {
                Some(slot) => println!(
                    "now: {} ({}–{})",
                    slot.task_id,
                    format_hhmm(slot.start),
                    format_hhmm(slot.end)
                ),
                None => println!("no scheduled slot covers {}", format_hhmm(current_minute)),
            }
        }
        None => println!("no plan exists for today"),
    }
    log_ok("now");
    Ok(())
}

pub fn plans(ctx: &AppContext, command: PlansCommand) -> AppResult<()> {
    match command {
        PlansCommand::Delete { date } => {
            let date = parse_date_arg(&date)?;
            ctx.store.soft_delete_plan(date)?;
            println!("deleted plan for {date}");
            log_ok("plans.delete");
            Ok(())
        }
    }
}

fn tasks_by_id(tasks: &[crate::models::Task]) -> std::collections::HashMap<&str, &crate::models::Task> {
    tasks.iter().map(|task| (task.id.as_str(), task)).collect()
}

fn print_slots(tasks: &std::collections::HashMap<&str, &crate::models::Task>, slots: &[crate::models::Slot]) {
    for slot in slots {
        let name = tasks
            .get(slot.task_id.as_str())
            .map(|task| task.name.as_str())
            .unwrap_or(&slot.task_id);
        println!(
            "  {}–{}  {}  [{:?}]",
            format_hhmm(slot.start),
            format_hhmm(slot.end),
            name,
            slot.status
        );
    }
}
