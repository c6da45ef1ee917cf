//! A pure, deterministic placement engine: free-interval bookkeeping
//! and sorted candidate placement, with a fixed priority/duration/name
//! ordering and no ranking model involved.

use chrono::NaiveDate;

use crate::models::{DayPlan, Slot, Task, TaskKind, TaskSchedule};
use crate::time::MinuteOfDay;

/// `generate` never touches storage and never reads the wall clock;
/// identical inputs produce byte-identical output.
pub fn generate(
    date: NaiveDate,
    tasks: &[Task],
    day_start: MinuteOfDay,
    day_end: MinuteOfDay,
) -> DayPlan {
    let due: Vec<&Task> = tasks.iter().filter(|task| task.is_due_on(date)).collect();

    let (appointments, mut flexibles): (Vec<&Task>, Vec<&Task>) =
        due.into_iter().partition(|task| task.kind() == TaskKind::Appointment);

    let mut slots = Vec::new();
    let mut free = vec![(day_start, day_end)];

    for task in &appointments {
        if let TaskSchedule::Appointment { fixed_start, fixed_end } = task.schedule {
            if let Ok(slot) = Slot::new(fixed_start, fixed_end, task.id.clone()) {
                slots.push(slot);
                free = subtract_interval(&free, fixed_start, fixed_end);
            }
        }
    }

    flexibles.sort_by(|a, b| {
        a.priority
            .cmp(&b.priority)
            .then(b.duration_min.cmp(&a.duration_min))
            .then(a.name.cmp(&b.name))
    });

    for task in flexibles {
        let (earliest, latest) = match task.schedule {
            TaskSchedule::Flexible {
                earliest_start,
                latest_end,
            } => (
                earliest_start.unwrap_or(day_start),
                latest_end.unwrap_or(day_end),
            ),
            TaskSchedule::Appointment { .. } => continue,
        };

        if let Some((index, start)) = find_placement(&free, earliest, latest, task.duration_min as i32) {
            let end = start + task.duration_min as i32;
            if let Ok(slot) = Slot::new(start, end, task.id.clone()) {
                slots.push(slot);
                free = split_interval_at(&free, index, start, end);
            }
        }
    }

    slots.sort_by_key(|slot| slot.start);
    DayPlan::new_proposal(date, slots)
}

/// Finds the earliest free interval whose intersection with
/// `[earliest, latest]` fits `duration`, returning the interval's
/// index in `free` and the placement start.
fn find_placement(
    free: &[(MinuteOfDay, MinuteOfDay)],
    earliest: MinuteOfDay,
    latest: MinuteOfDay,
    duration: i32,
) -> Option<(usize, MinuteOfDay)> {
    for (index, &(start, end)) in free.iter().enumerate() {
        let window_start = start.max(earliest);
        let window_end = end.min(latest);
        if window_end - window_start >= duration {
            return Some((index, window_start));
        }
    }
    None
}

fn split_interval_at(
    free: &[(MinuteOfDay, MinuteOfDay)],
    index: usize,
    placed_start: MinuteOfDay,
    placed_end: MinuteOfDay,
) -> Vec<(MinuteOfDay, MinuteOfDay)> {
    let mut result = Vec::with_capacity(free.len() + 1);
    for (i, &(start, end)) in free.iter().enumerate() {
        if i != index {
            result.push((start, end));
            continue;
        }
        if start < placed_start {
            result.push((start, placed_start));
        }
        if placed_end < end {
            result.push((placed_end, end));
        }
    }
    result.sort();
    result
}

fn subtract_interval(
    free: &[(MinuteOfDay, MinuteOfDay)],
    busy_start: MinuteOfDay,
    busy_end: MinuteOfDay,
) -> Vec<(MinuteOfDay, MinuteOfDay)> {
    let mut result = Vec::with_capacity(free.len() + 1);
    for &(start, end) in free {
        if busy_end <= start || busy_start >= end {
            result.push((start, end));
            continue;
        }
        if start < busy_start {
            result.push((start, busy_start));
        }
        if busy_end < end {
            result.push((busy_end, end));
        }
    }
    result.sort();
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recurrence::Recurrence;

    fn appointment(id: &str, start: i32, end: i32, priority: u8) -> Task {
        Task::new(
            id,
            id,
            TaskSchedule::Appointment {
                fixed_start: start,
                fixed_end: end,
            },
            (end - start) as u32,
            Recurrence::Daily,
            priority,
            true,
        )
        .unwrap()
    }

    fn flexible(id: &str, duration: u32, priority: u8, window: Option<(i32, i32)>) -> Task {
        let (earliest_start, latest_end) = match window {
            Some((s, e)) => (Some(s), Some(e)),
            None => (None, None),
        };
        Task::new(
            id,
            id,
            TaskSchedule::Flexible {
                earliest_start,
                latest_end,
            },
            duration,
            Recurrence::Daily,
            priority,
            true,
        )
        .unwrap()
    }

    #[test]
    fn scenario_s1_deterministic_placement() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let a = appointment("A", 540, 570, 1);
        let b = flexible("B", 45, 2, None);
        let c = flexible("C", 30, 1, Some((600, 660)));
        let d = flexible("D", 60, 3, None);

        let plan = generate(date, &[a, b, c, d], 480, 720);

        let starts: Vec<(String, i32, i32)> = plan
            .slots
            .iter()
            .map(|slot| (slot.task_id.clone(), slot.start, slot.end))
            .collect();

        assert_eq!(
            starts,
            vec![
                ("B".to_string(), 480, 525),
                ("A".to_string(), 540, 570),
                ("C".to_string(), 600, 630),
                ("D".to_string(), 630, 690),
            ]
        );
    }

    #[test]
    fn tight_window_is_skipped() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let task = flexible("tight", 30, 1, Some((600, 629)));
        let plan = generate(date, &[task], 480, 720);
        assert!(plan.slots.is_empty());
    }

    #[test]
    fn exact_fit_window_succeeds() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let task = flexible("exact", 30, 1, Some((600, 630)));
        let plan = generate(date, &[task], 480, 720);
        assert_eq!(plan.slots.len(), 1);
    }

    #[test]
    fn empty_task_list_yields_empty_plan() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let plan = generate(date, &[], 480, 1320);
        assert!(plan.slots.is_empty());
    }

    #[test]
    fn is_deterministic_across_runs() {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap();
        let tasks = vec![
            appointment("A", 540, 570, 1),
            flexible("B", 45, 2, None),
            flexible("C", 30, 1, Some((600, 660))),
        ];
        let first = generate(date, &tasks, 480, 720);
        let second = generate(date, &tasks, 480, 720);
        assert_eq!(first, second);
    }
}
