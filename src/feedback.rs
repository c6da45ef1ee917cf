//! Updates a task's rolling stats from a rating on the most recently
//! eligible completed slot. Single apply-and-persist entry point, with
//! the EMA/penalty constants hoisted to the top of the module.

use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::models::{DayPlan, FeedbackRating, Slot, SlotStatus, Task};
use crate::recurrence::Recurrence;
use crate::time::MinuteOfDay;

/// Weight given to the task's existing average when a slot is marked
/// on-track. Must sum to 1.0 with `FEEDBACK_NEW_WEIGHT`.
pub const FEEDBACK_EXISTING_WEIGHT: f64 = 0.8;
pub const FEEDBACK_NEW_WEIGHT: f64 = 0.2;

pub const TOO_MUCH_REDUCTION_FACTOR: f64 = 0.9;
pub const TOO_MUCH_DURATION_FLOOR_MIN: u32 = 10;

/// Validated at startup.
pub fn assert_weights_are_sane() -> AppResult<()> {
    if (FEEDBACK_EXISTING_WEIGHT + FEEDBACK_NEW_WEIGHT - 1.0).abs() > f64::EPSILON {
        return Err(AppError::corruption(
            "feedback EMA weights do not sum to 1.0",
        ));
    }
    Ok(())
}

/// Finds the latest slot on today's plan eligible for feedback: status
/// in `{accepted, done}`, no feedback yet, and already ended by
/// `current_minute`.
fn find_eligible_slot(plan: &DayPlan, current_minute: MinuteOfDay) -> AppResult<usize> {
    plan.slots
        .iter()
        .enumerate()
        .filter(|(_, slot)| {
            matches!(slot.status, SlotStatus::Accepted | SlotStatus::Done)
                && slot.feedback.is_none()
                && slot.end <= current_minute
        })
        .max_by_key(|(_, slot)| slot.end)
        .map(|(index, _)| index)
        .ok_or_else(|| AppError::precondition("no eligible slot to attach feedback to"))
}

/// Applies `rating` to the latest eligible slot in `plan` for `task`,
/// mutating both in place. Caller is responsible for persisting both
/// as a single store transaction.
pub fn apply_feedback(
    plan: &mut DayPlan,
    task: &mut Task,
    rating: FeedbackRating,
    note: Option<String>,
    today: NaiveDate,
    current_minute: MinuteOfDay,
) -> AppResult<()> {
    let index = find_eligible_slot(plan, current_minute)?;
    let slot: &mut Slot = &mut plan.slots[index];
    if slot.task_id != task.id {
        return Err(AppError::precondition(
            "eligible slot does not belong to the given task",
        ));
    }

    let actual_duration = slot.duration_min();

    match rating {
        FeedbackRating::OnTrack => {
            let existing = task.stats.avg_actual_duration_min;
            task.stats.avg_actual_duration_min = if existing <= 0.0 {
                actual_duration as f64
            } else {
                existing * FEEDBACK_EXISTING_WEIGHT + actual_duration as f64 * FEEDBACK_NEW_WEIGHT
            };
            task.stats.last_done = Some(today);
        }
        FeedbackRating::TooMuch => {
            let reduced = (task.duration_min as f64 * TOO_MUCH_REDUCTION_FACTOR).floor() as u32;
            task.duration_min = reduced.max(TOO_MUCH_DURATION_FLOOR_MIN);
            task.stats.last_done = Some(today);
        }
        FeedbackRating::Unnecessary => {
            if let Recurrence::NDays { interval_days, anchor } = task.recurrence {
                task.recurrence = Recurrence::NDays {
                    interval_days: interval_days + 1,
                    anchor,
                };
            }
        }
    }

    slot.status = SlotStatus::Done;
    slot.feedback = Some(crate::models::Feedback { rating, note });

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskSchedule;

    fn sample_plan(slot: Slot) -> DayPlan {
        DayPlan {
            date: NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            revision: 1,
            accepted_at: None,
            slots: vec![slot],
        }
    }

    fn sample_task(avg: f64) -> Task {
        let mut task = Task::new(
            "t1",
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
        task.stats.avg_actual_duration_min = avg;
        task
    }

    #[test]
    fn scenario_s3_ema_update() {
        let mut slot = Slot::new(600, 650, "t1").unwrap();
        slot.status = SlotStatus::Accepted;
        let mut plan = sample_plan(slot);
        let mut task = sample_task(30.0);

        apply_feedback(
            &mut plan,
            &mut task,
            FeedbackRating::OnTrack,
            None,
            NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            700,
        )
        .unwrap();

        assert!((task.stats.avg_actual_duration_min - 34.0).abs() < 1e-9);
        assert_eq!(plan.slots[0].status, SlotStatus::Done);
    }

    #[test]
    fn too_much_never_drops_below_floor() {
        let mut slot = Slot::new(600, 615, "t1").unwrap();
        slot.status = SlotStatus::Accepted;
        let mut plan = sample_plan(slot);
        let mut task = sample_task(0.0);
        task.duration_min = 11;

        apply_feedback(
            &mut plan,
            &mut task,
            FeedbackRating::TooMuch,
            None,
            NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            700,
        )
        .unwrap();

        assert_eq!(task.duration_min, 10);
    }

    #[test]
    fn no_eligible_slot_is_an_error() {
        let mut slot = Slot::new(600, 650, "t1").unwrap();
        slot.status = SlotStatus::Planned;
        let mut plan = sample_plan(slot);
        let mut task = sample_task(0.0);

        let result = apply_feedback(
            &mut plan,
            &mut task,
            FeedbackRating::OnTrack,
            None,
            NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            700,
        );
        assert!(result.is_err());
    }

    #[test]
    fn unnecessary_increments_n_days_interval() {
        let mut slot = Slot::new(600, 650, "t1").unwrap();
        slot.status = SlotStatus::Accepted;
        let mut plan = sample_plan(slot);
        let mut task = sample_task(0.0);
        task.recurrence = Recurrence::NDays {
            interval_days: 3,
            anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        };

        apply_feedback(
            &mut plan,
            &mut task,
            FeedbackRating::Unnecessary,
            None,
            NaiveDate::from_ymd_opt(2026, 1, 6).unwrap(),
            700,
        )
        .unwrap();

        match task.recurrence {
            Recurrence::NDays { interval_days, .. } => assert_eq!(interval_days, 4),
            _ => panic!("expected n_days recurrence"),
        }
    }
}
