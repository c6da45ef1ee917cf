//! Broader recurrence-kernel coverage than the in-module unit tests:
//! walks whole calendars rather than single dates, and checks the
//! serde round trip through a real `Task`.

use chrono::NaiveDate;

use daylit::models::{Task, TaskSchedule};
use daylit::recurrence::Recurrence;

fn due_dates(recurrence: &Recurrence, year: i32) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
    let mut dates = Vec::new();
    let mut current = start;
    while current <= end {
        if recurrence.is_due_on(current) {
            dates.push(current);
        }
        current = current.succ_opt().unwrap();
    }
    dates
}

#[test]
fn weekdays_recurrence_never_lands_on_a_weekend_across_a_full_year() {
    use chrono::{Datelike, Weekday};
    let dates = due_dates(&Recurrence::Weekdays, 2026);
    assert!(dates.iter().all(|d| !matches!(d.weekday(), Weekday::Sat | Weekday::Sun)));
    // 2026 has 260 weekdays.
    assert_eq!(dates.len(), 260);
}

#[test]
fn monthly_date_31_only_fires_in_months_with_a_31st() {
    let dates = due_dates(&Recurrence::MonthlyDate { day: 31 }, 2026);
    assert_eq!(dates.len(), 7); // Jan, Mar, May, Jul, Aug, Oct, Dec
}

#[test]
fn n_days_recurrence_is_attached_to_a_task_and_survives_a_serde_round_trip() {
    let task = Task::new(
        "t1",
        "Water plants",
        TaskSchedule::Flexible {
            earliest_start: None,
            latest_end: None,
        },
        10,
        Recurrence::NDays {
            interval_days: 3,
            anchor: NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
        },
        2,
        true,
    )
    .unwrap();

    let json = serde_json::to_string(&task).unwrap();
    let restored: Task = serde_json::from_str(&json).unwrap();
    assert_eq!(restored.recurrence, task.recurrence);

    let due = due_dates(&restored.recurrence, 2026);
    assert!(due.contains(&NaiveDate::from_ymd_opt(2026, 1, 1).unwrap()));
    assert!(due.contains(&NaiveDate::from_ymd_opt(2026, 1, 4).unwrap()));
    assert!(!due.contains(&NaiveDate::from_ymd_opt(2026, 1, 2).unwrap()));
}

#[test]
fn yearly_recurrence_on_leap_day_only_fires_on_leap_years() {
    let recurrence = Recurrence::Yearly { month: 2, day: 29 };
    assert!(due_dates(&recurrence, 2024).len() == 1);
    assert!(due_dates(&recurrence, 2025).is_empty());
}
