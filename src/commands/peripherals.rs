//! `habit`/`ot`/`alert` verb groups: simple CRUD surfaces with no
//! scheduler interaction.

use chrono::Utc;
use uuid::Uuid;

use crate::cli::{AlertCommand, HabitCommand, OtCommand};
use crate::commands::plans::parse_date_arg;
use crate::commands::tasks::parse_recurrence;
use crate::commands::{log_ok, AppContext};
use crate::error::AppResult;
use crate::models::{Alert, AlertSchedule, Habit, HabitEntry, OtEntry};
use crate::time::parse_hhmm;

pub fn habit(ctx: &AppContext, command: HabitCommand) -> AppResult<()> {
    match command {
        HabitCommand::Add { name } => {
            let habit = Habit::new(Uuid::new_v4().to_string(), name, Utc::now());
            ctx.store.add_habit(&habit)?;
            println!("added habit {} ({})", habit.id, habit.name);
        }
        HabitCommand::Archive { id } => {
            ctx.store.archive_habit(&id)?;
            println!("archived habit {id}");
        }
        HabitCommand::Delete { id } => {
            ctx.store.soft_delete_habit(&id)?;
            println!("deleted habit {id}");
        }
        HabitCommand::List => {
            for habit in ctx.store.list_habits()? {
                println!(
                    "{}\t{}\tarchived={}\tdeleted={}",
                    habit.id, habit.name, habit.archived, habit.deleted
                );
            }
        }
        HabitCommand::Check { id, day } => {
            let day = parse_date_arg(&day)?;
            let entry = HabitEntry {
                id: Uuid::new_v4().to_string(),
                habit_id: id,
                day,
                completed: true,
            };
            ctx.store.upsert_habit_entry(&entry)?;
            println!("checked off habit {} for {day}", entry.habit_id);
        }
    }
    log_ok("habit");
    Ok(())
}

pub fn ot(ctx: &AppContext, command: OtCommand) -> AppResult<()> {
    match command {
        OtCommand::Set { day, note } => {
            let day = parse_date_arg(&day)?;
            ctx.store.upsert_ot_entry(&OtEntry { day, note })?;
            println!("set once-today note for {day}");
        }
        OtCommand::Get { day } => {
            let day = parse_date_arg(&day)?;
            match ctx.store.get_ot_entry(day)? {
                Some(entry) => println!("{}: {}", entry.day, entry.note),
                None => println!("no once-today note for {day}"),
            }
        }
    }
    log_ok("ot");
    Ok(())
}

pub fn alert(ctx: &AppContext, command: AlertCommand) -> AppResult<()> {
    match command {
        AlertCommand::Add {
            message,
            time,
            date,
            recurrence,
        } => {
            let schedule = match (date, recurrence) {
                (Some(date), None) => AlertSchedule::OneShot {
                    date: parse_date_arg(&date)?,
                },
                (None, Some(recurrence)) => AlertSchedule::Recurring {
                    recurrence: parse_recurrence(&recurrence)?,
                },
                _ => {
                    return Err(crate::error::AppError::validation(
                        "exactly one of --date or --recurrence must be given",
                    ))
                }
            };
            let alert = Alert::new(
                Uuid::new_v4().to_string(),
                message,
                parse_hhmm(&time)?,
                schedule,
                Utc::now(),
            )?;
            ctx.store.add_alert(&alert)?;
            println!("added alert {}", alert.id);
        }
        AlertCommand::List => {
            for alert in ctx.store.list_alerts()? {
                println!(
                    "{}\t{}\tactive={}\tlast_sent={:?}",
                    alert.id, alert.message, alert.active, alert.last_sent
                );
            }
        }
        AlertCommand::Delete { id } => {
            ctx.store.delete_alert(&id)?;
            println!("deleted alert {id}");
        }
    }
    log_ok("alert");
    Ok(())
}
