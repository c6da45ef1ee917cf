use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

/// Minutes since midnight, `0..=1439`. The scheduler and notifier only
/// ever operate at minute resolution (spec non-goal: no sub-minute
/// resolution).
pub type MinuteOfDay = i32;

/// Parse an `HH:MM` string into minutes since midnight.
pub fn parse_hhmm(value: &str) -> AppResult<MinuteOfDay> {
    let (hour_str, minute_str) = value.split_once(':').ok_or_else(|| {
        AppError::validation(format!("invalid time '{value}', expected HH:MM"))
    })?;

    let hour: i32 = hour_str
        .parse()
        .map_err(|_| AppError::validation(format!("invalid hour in '{value}'")))?;
    let minute: i32 = minute_str
        .parse()
        .map_err(|_| AppError::validation(format!("invalid minute in '{value}'")))?;

    if !(0..24).contains(&hour) || !(0..60).contains(&minute) {
        return Err(AppError::validation(format!(
            "time '{value}' out of range, expected 00:00-23:59"
        )));
    }

    Ok(hour * 60 + minute)
}

/// Format minutes since midnight as `HH:MM`.
pub fn format_hhmm(minutes: MinuteOfDay) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// A day's scheduling bounds, `[start, end)` in minutes since midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayWindow {
    pub start: MinuteOfDay,
    pub end: MinuteOfDay,
}

impl DayWindow {
    pub fn new(start: MinuteOfDay, end: MinuteOfDay) -> AppResult<Self> {
        if start >= end {
            return Err(AppError::validation(
                "day window end must be after day window start",
            ));
        }
        Ok(Self { start, end })
    }

    pub fn contains_range(&self, start: MinuteOfDay, end: MinuteOfDay) -> bool {
        start >= self.start && end <= self.end && start < end
    }
}

/// ISO weekday ordinal, Monday = 0 .. Sunday = 6, matching
/// `chrono::Weekday::num_days_from_monday`.
pub fn weekday_index(date: NaiveDate) -> u8 {
    use chrono::Datelike;
    date.weekday().num_days_from_monday() as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_valid_time() {
        assert_eq!(parse_hhmm("07:00").unwrap(), 420);
        assert_eq!(parse_hhmm("23:59").unwrap(), 1439);
        assert_eq!(parse_hhmm("00:00").unwrap(), 0);
    }

    #[test]
    fn rejects_out_of_range_time() {
        assert!(parse_hhmm("24:00").is_err());
        assert!(parse_hhmm("10:60").is_err());
        assert!(parse_hhmm("not-a-time").is_err());
    }

    #[test]
    fn formats_round_trip() {
        assert_eq!(format_hhmm(parse_hhmm("08:05").unwrap()), "08:05");
    }

    #[test]
    fn day_window_rejects_inverted_bounds() {
        assert!(DayWindow::new(600, 600).is_err());
        assert!(DayWindow::new(700, 600).is_err());
    }

    #[test]
    fn day_window_contains_range() {
        let window = DayWindow::new(420, 1320).unwrap();
        assert!(window.contains_range(420, 1320));
        assert!(!window.contains_range(400, 500));
        assert!(!window.contains_range(1300, 1321));
    }
}
