//! `task` verb group: add/edit/delete/list over the task catalog.
//! CLI-only recurrence string parsing lives here rather than in
//! `recurrence` — it's input-format glue, not part of the tested
//! recurrence kernel.

use chrono::Weekday;
use uuid::Uuid;

use crate::cli::TaskCommand;
use crate::commands::{log_ok, AppContext};
use crate::error::{AppError, AppResult};
use crate::models::{Task, TaskSchedule};
use crate::recurrence::Recurrence;
use crate::time::parse_hhmm;

pub fn task(ctx: &AppContext, command: TaskCommand) -> AppResult<()> {
    match command {
        TaskCommand::Add {
            name,
            appointment,
            fixed_start,
            fixed_end,
            earliest_start,
            latest_end,
            duration_min,
            recurrence,
            priority,
        } => add(
            ctx,
            name,
            appointment,
            fixed_start,
            fixed_end,
            earliest_start,
            latest_end,
            duration_min,
            &recurrence,
            priority,
        ),
        TaskCommand::Edit {
            id,
            name,
            duration_min,
            priority,
            active,
        } => edit(ctx, &id, name, duration_min, priority, active),
        TaskCommand::Delete { id } => {
            ctx.store.soft_delete_task(&id)?;
            println!("deleted task {id}");
            log_ok("task.delete");
            Ok(())
        }
        TaskCommand::List { include_deleted } => list(ctx, include_deleted),
    }
}

#[allow(clippy::too_many_arguments)]
fn add(
    ctx: &AppContext,
    name: String,
    appointment: bool,
    fixed_start: Option<String>,
    fixed_end: Option<String>,
    earliest_start: Option<String>,
    latest_end: Option<String>,
    duration_min: u32,
    recurrence: &str,
    priority: u8,
) -> AppResult<()> {
    let schedule = if appointment {
        let start = fixed_start
            .as_deref()
            .ok_or_else(|| AppError::validation("--fixed-start is required for appointments"))?;
        let end = fixed_end
            .as_deref()
            .ok_or_else(|| AppError::validation("--fixed-end is required for appointments"))?;
        TaskSchedule::Appointment {
            fixed_start: parse_hhmm(start)?,
            fixed_end: parse_hhmm(end)?,
        }
    } else {
        TaskSchedule::Flexible {
            earliest_start: earliest_start.as_deref().map(parse_hhmm).transpose()?,
            latest_end: latest_end.as_deref().map(parse_hhmm).transpose()?,
        }
    };

    let task = Task::new(
        Uuid::new_v4().to_string(),
        name,
        schedule,
        duration_min,
        parse_recurrence(recurrence)?,
        priority,
        true,
    )?;
    ctx.store.add_task(&task)?;
    println!("added task {} ({})", task.id, task.name);
    log_ok("task.add");
    Ok(())
}

fn edit(
    ctx: &AppContext,
    id: &str,
    name: Option<String>,
    duration_min: Option<u32>,
    priority: Option<u8>,
    active: Option<bool>,
) -> AppResult<()> {
    let mut task = ctx.store.get_task_by_id(id)?;
    if let Some(name) = name {
        task.name = name;
    }
    if let Some(duration_min) = duration_min {
        task.duration_min = duration_min;
    }
    if let Some(priority) = priority {
        task.priority = priority;
    }
    if let Some(active) = active {
        task.active = active;
    }
    task.validate()?;
    ctx.store.update_task(&task)?;
    println!("updated task {id}");
    log_ok("task.edit");
    Ok(())
}

fn list(ctx: &AppContext, include_deleted: bool) -> AppResult<()> {
    let tasks = if include_deleted {
        ctx.store.list_tasks_including_deleted()?
    } else {
        ctx.store.list_active_tasks()?
    };
    for task in &tasks {
        println!(
            "{}\t{}\tpriority={}\tduration={}m\tactive={}",
            task.id, task.name, task.priority, task.duration_min, task.active
        );
    }
    log_ok("task.list");
    Ok(())
}

/// Parses the small set of recurrence shorthand forms the CLI accepts:
/// `daily`, `weekdays`, `ad_hoc`, `weekly:MO,WE,FR`, `n_days:<n>`,
/// `monthly_date:<day>`, `monthly_day:<ordinal>:<code>`,
/// `yearly:<month>-<day>`.
pub fn parse_recurrence(raw: &str) -> AppResult<Recurrence> {
    let invalid = || AppError::validation(format!("unrecognized recurrence '{raw}'"));

    if raw.eq_ignore_ascii_case("daily") {
        return Ok(Recurrence::Daily);
    }
    if raw.eq_ignore_ascii_case("weekdays") {
        return Ok(Recurrence::Weekdays);
    }
    if raw.eq_ignore_ascii_case("ad_hoc") {
        return Ok(Recurrence::AdHoc);
    }

    let (tag, rest) = raw.split_once(':').ok_or_else(invalid)?;
    match tag {
        "weekly" => {
            let weekdays: Vec<Weekday> = rest
                .split(',')
                .map(parse_weekday_code)
                .collect::<AppResult<_>>()?;
            Ok(Recurrence::Weekly { weekdays })
        }
        "n_days" => {
            let interval_days: u32 = rest.parse().map_err(|_| invalid())?;
            Ok(Recurrence::NDays {
                interval_days,
                anchor: chrono::Utc::now().date_naive(),
            })
        }
        "monthly_date" => {
            let day: u8 = rest.parse().map_err(|_| invalid())?;
            Ok(Recurrence::MonthlyDate { day })
        }
        "monthly_day" => {
            let (ordinal_str, code) = rest.split_once(':').ok_or_else(invalid)?;
            let ordinal: i8 = ordinal_str.parse().map_err(|_| invalid())?;
            Ok(Recurrence::MonthlyDay {
                ordinal,
                weekday: parse_weekday_code(code)?,
            })
        }
        "yearly" => {
            let (month_str, day_str) = rest.split_once('-').ok_or_else(invalid)?;
            Ok(Recurrence::Yearly {
                month: month_str.parse().map_err(|_| invalid())?,
                day: day_str.parse().map_err(|_| invalid())?,
            })
        }
        _ => Err(invalid()),
    }
}

fn parse_weekday_code(code: &str) -> AppResult<Weekday> {
    match code.trim().to_ascii_uppercase().as_str() {
        "MO" => Ok(Weekday::Mon),
        "TU" => Ok(Weekday::Tue),
        "WE" => Ok(Weekday::Wed),
        "TH" => Ok(Weekday::Thu),
        "FR" => Ok(Weekday::Fri),
        "SA" => Ok(Weekday::Sat),
        "SU" => Ok(Weekday::Sun),
        other => Err(AppError::validation(format!(
            "unrecognized weekday code '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_simple_recurrences() {
        assert_eq!(parse_recurrence("daily").unwrap(), Recurrence::Daily);
        assert_eq!(parse_recurrence("weekdays").unwrap(), Recurrence::Weekdays);
        assert_eq!(parse_recurrence("ad_hoc").unwrap(), Recurrence::AdHoc);
    }

    #[test]
    fn parses_weekly_set() {
        let r = parse_recurrence("weekly:MO,FR").unwrap();
        assert_eq!(
            r,
            Recurrence::Weekly {
                weekdays: vec![Weekday::Mon, Weekday::Fri]
            }
        );
    }

    #[test]
    fn parses_monthly_day() {
        let r = parse_recurrence("monthly_day:-1:FR").unwrap();
        assert_eq!(
            r,
            Recurrence::MonthlyDay {
                ordinal: -1,
                weekday: Weekday::Fri
            }
        );
    }

    #[test]
    fn rejects_unknown_recurrence() {
        assert!(parse_recurrence("whenever").is_err());
    }
}
