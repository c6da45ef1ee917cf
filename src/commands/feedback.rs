//! `feedback` verb: attaches a rating to the latest eligible completed
//! slot on today's plan and persists both the plan and task update in
//! one pass.

use chrono::Utc;

use crate::commands::{log_ok, AppContext};
use crate::error::AppResult;
use crate::feedback::apply_feedback;
use crate::models::FeedbackRating;

pub fn feedback(ctx: &AppContext, rating: FeedbackRating, note: Option<String>) -> AppResult<()> {
    let today = Utc::now().date_naive();
    let now = chrono::Local::now().time();
    let current_minute = now.format("%H").to_string().parse::<i32>().unwrap_or(0) * 60
        + now.format("%M").to_string().parse::<i32>().unwrap_or(0);

    let mut plan = ctx
        .store
        .get_latest_plan_revision(today)?
        .ok_or_else(|| crate::error::AppError::precondition("no plan exists for today"))?;
    let slot_task_id = plan
        .slots
        .iter()
        .filter(|slot| {
            matches!(slot.status, crate::models::SlotStatus::Accepted | crate::models::SlotStatus::Done)
                && slot.feedback.is_none()
                && slot.end <= current_minute
        })
        .max_by_key(|slot| slot.end)
        .map(|slot| slot.task_id.clone());

    let task_id = slot_task_id.ok_or_else(|| {
        crate::error::AppError::precondition("no eligible slot to attach feedback to")
    })?;
    let mut task = ctx.store.get_task_by_id(&task_id)?;

    apply_feedback(&mut plan, &mut task, rating, note, today, current_minute)?;

    ctx.store.commit_feedback(&plan, &task)?;

    println!("feedback recorded for {task_id}");
    log_ok("feedback");
    Ok(())
}
