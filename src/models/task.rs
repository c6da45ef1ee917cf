use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::recurrence::Recurrence;
use crate::time::MinuteOfDay;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskKind {
    Appointment,
    Flexible,
}

/// The two time-constraint shapes a task can carry. Folding `kind` into
/// this enum makes "exactly one of the two shapes populated" a
/// structural guarantee rather than a field combination to re-check
/// everywhere the struct is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TaskSchedule {
    Appointment {
        fixed_start: MinuteOfDay,
        fixed_end: MinuteOfDay,
    },
    Flexible {
        #[serde(default)]
        earliest_start: Option<MinuteOfDay>,
        #[serde(default)]
        latest_end: Option<MinuteOfDay>,
    },
}

impl TaskSchedule {
    pub fn kind(&self) -> TaskKind {
        match self {
            TaskSchedule::Appointment { .. } => TaskKind::Appointment,
            TaskSchedule::Flexible { .. } => TaskKind::Flexible,
        }
    }

    pub fn validate(&self, duration_min: u32) -> AppResult<()> {
        match *self {
            TaskSchedule::Appointment {
                fixed_start,
                fixed_end,
            } => {
                if fixed_start >= fixed_end {
                    return Err(AppError::validation(
                        "appointment fixed_start must be before fixed_end",
                    ));
                }
            }
            TaskSchedule::Flexible {
                earliest_start,
                latest_end,
            } => {
                if let (Some(earliest), Some(latest)) = (earliest_start, latest_end) {
                    if latest < earliest {
                        return Err(AppError::validation(
                            "flexible latest_end must not be before earliest_start",
                        ));
                    }
                    if (latest - earliest) < duration_min as i32 {
                        return Err(AppError::validation(
                            "flexible window is narrower than the task's duration",
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct TaskStats {
    pub success_streak: u32,
    pub avg_actual_duration_min: f64,
    pub last_done: Option<NaiveDate>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: String,
    pub name: String,
    pub schedule: TaskSchedule,
    pub duration_min: u32,
    pub recurrence: Recurrence,
    pub priority: u8,
    pub active: bool,
    #[serde(default)]
    pub stats: TaskStats,
}

impl Task {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        schedule: TaskSchedule,
        duration_min: u32,
        recurrence: Recurrence,
        priority: u8,
        active: bool,
    ) -> AppResult<Self> {
        let task = Task {
            id: id.into(),
            name: name.into(),
            schedule,
            duration_min,
            recurrence,
            priority,
            active,
            stats: TaskStats::default(),
        };
        task.validate()?;
        Ok(task)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.duration_min == 0 {
            return Err(AppError::validation("task duration must be greater than zero"));
        }
        if !(1..=5).contains(&self.priority) {
            return Err(AppError::validation("task priority must be between 1 and 5"));
        }
        self.schedule.validate(self.duration_min)?;
        self.recurrence.validate()?;
        Ok(())
    }

    pub fn kind(&self) -> TaskKind {
        self.schedule.kind()
    }

    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        self.active && self.recurrence.is_due_on(date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Recurrence;

    #[test]
    fn appointment_requires_ordered_bounds() {
        let schedule = TaskSchedule::Appointment {
            fixed_start: 600,
            fixed_end: 600,
        };
        assert!(Task::new("t1", "Standup", schedule, 30, Recurrence::Daily, 1, true).is_err());
    }

    #[test]
    fn flexible_window_must_fit_duration() {
        let schedule = TaskSchedule::Flexible {
            earliest_start: Some(600),
            latest_end: Some(620),
        };
        assert!(Task::new("t2", "Read", schedule, 30, Recurrence::Daily, 2, true).is_err());
    }

    #[test]
    fn flexible_without_window_is_valid() {
        let schedule = TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        };
        assert!(Task::new("t3", "Walk", schedule, 30, Recurrence::Daily, 2, true).is_ok());
    }

    #[test]
    fn rejects_out_of_range_priority() {
        let schedule = TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        };
        assert!(Task::new("t4", "Walk", schedule, 30, Recurrence::Daily, 6, true).is_err());
    }
}
