use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::recurrence::Recurrence;
use crate::time::MinuteOfDay;

/// Exactly one of a fixed date (one-shot) or a recurrence rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "schedule_kind", rename_all = "snake_case")]
pub enum AlertSchedule {
    OneShot { date: NaiveDate },
    Recurring { recurrence: Recurrence },
}

impl AlertSchedule {
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self {
            AlertSchedule::OneShot { date: due } => *due == date,
            AlertSchedule::Recurring { recurrence } => recurrence.is_due_on(date),
        }
    }

    pub fn is_one_shot(&self) -> bool {
        matches!(self, AlertSchedule::OneShot { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
    pub id: String,
    pub message: String,
    pub time: MinuteOfDay,
    pub schedule: AlertSchedule,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub last_sent: Option<DateTime<Utc>>,
}

impl Alert {
    pub fn new(
        id: impl Into<String>,
        message: impl Into<String>,
        time: MinuteOfDay,
        schedule: AlertSchedule,
        created_at: DateTime<Utc>,
    ) -> AppResult<Self> {
        if !(0..1440).contains(&time) {
            return Err(AppError::validation("alert time must be within a day"));
        }
        Ok(Alert {
            id: id.into(),
            message: message.into(),
            time,
            schedule,
            active: true,
            created_at,
            last_sent: None,
        })
    }

    pub fn last_sent_on(&self, date: NaiveDate) -> bool {
        self.last_sent
            .map(|sent| sent.date_naive() == date)
            .unwrap_or(false)
    }
}
