use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::time::MinuteOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotStatus {
    Planned,
    Accepted,
    Done,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackRating {
    OnTrack,
    TooMuch,
    Unnecessary,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Feedback {
    pub rating: FeedbackRating,
    #[serde(default)]
    pub note: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
    pub task_id: String,
    pub status: SlotStatus,
    #[serde(default)]
    pub feedback: Option<Feedback>,
    #[serde(default)]
    pub last_notified_start: Option<DateTime<Utc>>,
    #[serde(default)]
    pub last_notified_end: Option<DateTime<Utc>>,
}

impl Slot {
    pub fn new(start: MinuteOfDay, end: MinuteOfDay, task_id: impl Into<String>) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::validation("slot start must be before slot end"));
        }
        Ok(Slot {
            start,
            end,
            task_id: task_id.into(),
            status: SlotStatus::Planned,
            feedback: None,
            last_notified_start: None,
            last_notified_end: None,
        })
    }

    pub fn duration_min(&self) -> i32 {
        self.end - self.start
    }
}

/// A plan revision. `revision == 0` is a placeholder for "not yet
/// allocated"; the store replaces it on save.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPlan {
    pub date: NaiveDate,
    pub revision: u32,
    #[serde(default)]
    pub accepted_at: Option<DateTime<Utc>>,
    pub slots: Vec<Slot>,
}

impl DayPlan {
    pub fn new_proposal(date: NaiveDate, mut slots: Vec<Slot>) -> Self {
        slots.sort_by_key(|slot| slot.start);
        DayPlan {
            date,
            revision: 0,
            accepted_at: None,
            slots,
        }
    }

    pub fn is_accepted(&self) -> bool {
        self.accepted_at.is_some()
    }

    pub fn accept(&mut self, at: DateTime<Utc>) -> AppResult<()> {
        if self.is_accepted() {
            return Err(AppError::precondition("plan revision is already accepted"));
        }
        self.accepted_at = Some(at);
        for slot in &mut self.slots {
            if slot.status == SlotStatus::Planned {
                slot.status = SlotStatus::Accepted;
            }
        }
        Ok(())
    }
}
