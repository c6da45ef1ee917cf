//! End-to-end placement: generate a plan for a mixed appointment/
//! flexible catalog across several days, then run it through the
//! validator the way the `plan` command does.

use chrono::NaiveDate;

use daylit::models::{Task, TaskSchedule};
use daylit::recurrence::Recurrence;
use daylit::scheduler;
use daylit::time::DayWindow;
use daylit::validator;

fn appointment(id: &str, start: i32, end: i32, recurrence: Recurrence) -> Task {
    Task::new(
        id,
        id,
        TaskSchedule::Appointment {
            fixed_start: start,
            fixed_end: end,
        },
        (end - start) as u32,
        recurrence,
        1,
        true,
    )
    .unwrap()
}

fn flexible(id: &str, duration: u32, priority: u8) -> Task {
    Task::new(
        id,
        id,
        TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        },
        duration,
        Recurrence::Daily,
        priority,
        true,
    )
    .unwrap()
}

#[test]
fn generated_plan_for_a_mixed_catalog_passes_validation_on_every_due_weekday() {
    let window = DayWindow::new(480, 1080).unwrap(); // 08:00-18:00
    let tasks = vec![
        appointment("standup", 540, 570, Recurrence::Weekdays),
        flexible("deep-work", 120, 1),
        flexible("email", 30, 3),
        flexible("exercise", 45, 2),
    ];
    let known_ids: Vec<String> = tasks.iter().map(|t| t.id.clone()).collect();

    for offset in 0..14 {
        let date = NaiveDate::from_ymd_opt(2026, 1, 5).unwrap() + chrono::Duration::days(offset);
        let plan = scheduler::generate(date, &tasks, window.start, window.end);
        let report = validator::validate_plan(&plan, window, &known_ids);
        assert!(report.is_clean(), "conflicts on {date}: {:?}", report.conflicts);
    }
}

#[test]
fn a_weekend_day_skips_the_weekday_only_appointment_but_still_places_flexibles() {
    let window = DayWindow::new(480, 1080).unwrap();
    let tasks = vec![
        appointment("standup", 540, 570, Recurrence::Weekdays),
        flexible("deep-work", 120, 1),
    ];

    let saturday = NaiveDate::from_ymd_opt(2026, 1, 10).unwrap();
    let plan = scheduler::generate(saturday, &tasks, window.start, window.end);

    assert!(plan.slots.iter().all(|slot| slot.task_id != "standup"));
    assert!(plan.slots.iter().any(|slot| slot.task_id == "deep-work"));
}

#[test]
fn overbooked_day_leaves_lower_priority_flexibles_unplaced_without_erroring() {
    let window = DayWindow::new(540, 600).unwrap(); // one hour window
    let tasks = vec![
        flexible("a", 45, 1),
        flexible("b", 45, 2),
    ];
    let plan = scheduler::generate(NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(), &tasks, window.start, window.end);
    assert_eq!(plan.slots.len(), 1);
    assert_eq!(plan.slots[0].task_id, "a");
}
