//! Produces a non-fatal `ConflictReport` over tasks and plans. Never
//! blocks persistence — callers surface the report as a warning rather
//! than failing the save.

use chrono::NaiveDate;

use crate::models::{DayPlan, Task, TaskSchedule};
use crate::time::DayWindow;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConflictReport {
    pub conflicts: Vec<Conflict>,
}

impl ConflictReport {
    pub fn is_clean(&self) -> bool {
        self.conflicts.is_empty()
    }

    fn push(&mut self, description: impl Into<String>) {
        self.conflicts.push(Conflict {
            description: description.into(),
        });
    }
}

/// Checks a task catalog for appointment overlaps (on dates both tasks
/// are due) and flexible windows tighter than their own duration.
pub fn validate_tasks(tasks: &[Task], horizon: &[NaiveDate]) -> ConflictReport {
    let mut report = ConflictReport::default();

    for task in tasks {
        if task.duration_min == 0 {
            report.push(format!("task '{}' has a non-positive duration", task.name));
        }
        if let TaskSchedule::Flexible {
            earliest_start: Some(earliest),
            latest_end: Some(latest),
        } = task.schedule
        {
            if latest - earliest < task.duration_min as i32 {
                report.push(format!(
                    "task '{}' has a window narrower than its duration",
                    task.name
                ));
            }
        }
    }

    for &date in horizon {
        let appointments: Vec<&Task> = tasks
            .iter()
            .filter(|task| task.is_due_on(date) && matches!(task.schedule, TaskSchedule::Appointment { .. }))
            .collect();

        for i in 0..appointments.len() {
            for j in (i + 1)..appointments.len() {
                if let (
                    TaskSchedule::Appointment {
                        fixed_start: a_start,
                        fixed_end: a_end,
                    },
                    TaskSchedule::Appointment {
                        fixed_start: b_start,
                        fixed_end: b_end,
                    },
                ) = (appointments[i].schedule, appointments[j].schedule)
                {
                    if a_start < b_end && b_start < a_end {
                        report.push(format!(
                            "appointments '{}' and '{}' overlap on {date}",
                            appointments[i].name, appointments[j].name
                        ));
                    }
                }
            }
        }
    }

    report
}

/// Checks a single plan for slot overlaps, out-of-window slots, and
/// slots referencing a task id absent from `known_task_ids`.
pub fn validate_plan(plan: &DayPlan, day_window: DayWindow, known_task_ids: &[String]) -> ConflictReport {
    let mut report = ConflictReport::default();

    for slot in &plan.slots {
        if !day_window.contains_range(slot.start, slot.end) {
            report.push(format!(
                "slot for task '{}' falls outside the day window",
                slot.task_id
            ));
        }
        if !known_task_ids.iter().any(|id| id == &slot.task_id) {
            report.push(format!(
                "slot references unknown task '{}'",
                slot.task_id
            ));
        }
    }

    for i in 0..plan.slots.len() {
        for j in (i + 1)..plan.slots.len() {
            let a = &plan.slots[i];
            let b = &plan.slots[j];
            if a.start < b.end && b.start < a.end {
                report.push(format!(
                    "slots for tasks '{}' and '{}' overlap",
                    a.task_id, b.task_id
                ));
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Recurrence;

    #[test]
    fn flags_overlapping_appointments() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let a = Task::new(
            "a",
            "A",
            TaskSchedule::Appointment {
                fixed_start: 540,
                fixed_end: 600,
            },
            60,
            Recurrence::Daily,
            1,
            true,
        )
        .unwrap();
        let b = Task::new(
            "b",
            "B",
            TaskSchedule::Appointment {
                fixed_start: 570,
                fixed_end: 630,
            },
            60,
            Recurrence::Daily,
            1,
            true,
        )
        .unwrap();

        let report = validate_tasks(&[a, b], &[date]);
        assert!(!report.is_clean());
    }

    #[test]
    fn clean_report_for_non_overlapping_tasks() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let a = Task::new(
            "a",
            "A",
            TaskSchedule::Appointment {
                fixed_start: 540,
                fixed_end: 600,
            },
            60,
            Recurrence::Daily,
            1,
            true,
        )
        .unwrap();

        let report = validate_tasks(&[a], &[date]);
        assert!(report.is_clean());
    }

    #[test]
    fn flags_slot_outside_day_window() {
        use crate::models::{Slot, SlotStatus};
        let plan = DayPlan {
            date: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            revision: 0,
            accepted_at: None,
            slots: vec![Slot {
                start: 0,
                end: 30,
                task_id: "a".to_string(),
                status: SlotStatus::Planned,
                feedback: None,
                last_notified_start: None,
                last_notified_end: None,
            }],
        };
        let window = DayWindow::new(420, 1320).unwrap();
        let report = validate_plan(&plan, window, &["a".to_string()]);
        assert!(!report.is_clean());
    }
}
