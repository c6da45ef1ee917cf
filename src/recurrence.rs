//! A tagged record over the eight recurrence kinds, and the pure,
//! deterministic "is this task due on date D" predicate dispatched on
//! the tag. Custom weekday string (de)serialization and validated
//! constructors, without pulling in full RFC 5545 machinery — this is
//! a fixed eight-case union, not an open-ended grammar.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::error::{AppError, AppResult};

/// Valid ordinals for `MonthlyDay`: the first through fifth occurrence
/// of a weekday in a month, or `-1` for the last occurrence.
pub const MONTHLY_DAY_ORDINALS: [i8; 6] = [1, 2, 3, 4, 5, -1];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Recurrence {
    Daily,
    Weekly {
        #[serde(with = "weekday_set")]
        weekdays: Vec<Weekday>,
    },
    NDays {
        interval_days: u32,
        /// Reference date the interval is measured from, required for
        /// the "due-on-date" predicate to be a pure, deterministic
        /// function — see DESIGN.md's Open Question resolution.
        anchor: NaiveDate,
    },
    MonthlyDate {
        day: u8,
    },
    MonthlyDay {
        ordinal: i8,
        #[serde(with = "weekday_single")]
        weekday: Weekday,
    },
    Yearly {
        month: u8,
        day: u8,
    },
    Weekdays,
    AdHoc,
}

impl Recurrence {
    pub fn validate(&self) -> AppResult<()> {
        match self {
            Recurrence::Weekly { weekdays } => {
                if weekdays.is_empty() {
                    return Err(AppError::validation(
                        "weekly recurrence must include at least one weekday",
                    ));
                }
            }
            Recurrence::NDays { interval_days, .. } => {
                if *interval_days == 0 {
                    return Err(AppError::validation(
                        "n_days recurrence interval must be at least 1",
                    ));
                }
            }
            Recurrence::MonthlyDate { day } => {
                if !(1..=31).contains(day) {
                    return Err(AppError::validation(
                        "monthly_date day must be between 1 and 31",
                    ));
                }
            }
            Recurrence::MonthlyDay { ordinal, .. } => {
                if !MONTHLY_DAY_ORDINALS.contains(ordinal) {
                    return Err(AppError::validation(
                        "monthly_day ordinal must be 1, 2, 3, 4, 5, or -1",
                    ));
                }
            }
            Recurrence::Yearly { month, day } => {
                if !(1..=12).contains(month) {
                    return Err(AppError::validation("yearly month must be between 1 and 12"));
                }
                if !(1..=31).contains(day) {
                    return Err(AppError::validation("yearly day must be between 1 and 31"));
                }
            }
            Recurrence::Daily | Recurrence::Weekdays | Recurrence::AdHoc => {}
        }
        Ok(())
    }

    /// Total, deterministic "is this task due on date D" predicate.
    pub fn is_due_on(&self, date: NaiveDate) -> bool {
        match self {
            Recurrence::Daily => true,
            Recurrence::Weekdays => !matches!(date.weekday(), Weekday::Sat | Weekday::Sun),
            Recurrence::AdHoc => false,
            Recurrence::Weekly { weekdays } => weekdays.contains(&date.weekday()),
            Recurrence::NDays {
                interval_days,
                anchor,
            } => {
                let delta = (date - *anchor).num_days();
                let interval = *interval_days as i64;
                delta >= 0 && delta % interval == 0
            }
            Recurrence::MonthlyDate { day } => {
                date.day() == *day as u32 && days_in_month(date.year(), date.month()) >= *day as u32
            }
            Recurrence::MonthlyDay { ordinal, weekday } => {
                if date.weekday() != *weekday {
                    return false;
                }
                if *ordinal == -1 {
                    date.day() + 7 > days_in_month(date.year(), date.month())
                } else {
                    let occurrence = (date.day() - 1) / 7 + 1;
                    occurrence == *ordinal as u32
                }
            }
            Recurrence::Yearly { month, day } => {
                date.month() == *month as u32 && date.day() == *day as u32
            }
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
        .day()
}

fn weekday_to_code(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Mon => "MO",
        Weekday::Tue => "TU",
        Weekday::Wed => "WE",
        Weekday::Thu => "TH",
        Weekday::Fri => "FR",
        Weekday::Sat => "SA",
        Weekday::Sun => "SU",
    }
}

fn code_to_weekday(code: &str) -> Option<Weekday> {
    match code {
        "MO" => Some(Weekday::Mon),
        "TU" => Some(Weekday::Tue),
        "WE" => Some(Weekday::Wed),
        "TH" => Some(Weekday::Thu),
        "FR" => Some(Weekday::Fri),
        "SA" => Some(Weekday::Sat),
        "SU" => Some(Weekday::Sun),
        _ => None,
    }
}

mod weekday_single {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Weekday, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(weekday_to_code(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Weekday, D::Error> {
        let code = String::deserialize(deserializer)?;
        code_to_weekday(&code).ok_or_else(|| de::Error::custom(format!("invalid weekday code: {code}")))
    }
}

mod weekday_set {
    use super::*;

    pub fn serialize<S: Serializer>(value: &[Weekday], serializer: S) -> Result<S::Ok, S::Error> {
        let codes: Vec<&str> = value.iter().copied().map(weekday_to_code).collect();
        codes.serialize(serializer)
    }

    struct WeekdaySetVisitor;

    impl<'de> Visitor<'de> for WeekdaySetVisitor {
        type Value = Vec<Weekday>;

        fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
            formatter.write_str("a list of two-letter weekday codes")
        }

        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: de::SeqAccess<'de>,
        {
            let mut out = Vec::new();
            while let Some(code) = seq.next_element::<String>()? {
                let weekday = code_to_weekday(&code)
                    .ok_or_else(|| de::Error::custom(format!("invalid weekday code: {code}")))?;
                out.push(weekday);
            }
            Ok(out)
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Weekday>, D::Error> {
        deserializer.deserialize_seq(WeekdaySetVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekdays_due_only_on_business_days() {
        let r = Recurrence::Weekdays;
        assert!(r.is_due_on(date(2026, 1, 5))); // Monday
        assert!(!r.is_due_on(date(2026, 1, 3))); // Saturday
        assert!(!r.is_due_on(date(2026, 1, 4))); // Sunday
    }

    #[test]
    fn monthly_date_skips_months_without_the_day() {
        let r = Recurrence::MonthlyDate { day: 31 };
        assert!(r.is_due_on(date(2026, 1, 31)));
        assert!(!r.is_due_on(date(2026, 2, 28)));
        assert!(!r.is_due_on(date(2026, 4, 30)));
    }

    #[test]
    fn monthly_day_last_weekday() {
        // Last Friday of January 2026 is the 30th.
        let r = Recurrence::MonthlyDay {
            ordinal: -1,
            weekday: Weekday::Fri,
        };
        assert!(r.is_due_on(date(2026, 1, 30)));
        assert!(!r.is_due_on(date(2026, 1, 23)));
    }

    #[test]
    fn monthly_day_nth_weekday() {
        // Second Tuesday of January 2026 is the 13th.
        let r = Recurrence::MonthlyDay {
            ordinal: 2,
            weekday: Weekday::Tue,
        };
        assert!(r.is_due_on(date(2026, 1, 13)));
        assert!(!r.is_due_on(date(2026, 1, 6)));
    }

    #[test]
    fn yearly_requires_exact_date_and_skips_nonexistent() {
        let r = Recurrence::Yearly { month: 2, day: 29 };
        assert!(r.is_due_on(date(2024, 2, 29)));
        assert!(!r.is_due_on(date(2025, 2, 28)));
        assert!(!r.is_due_on(date(2025, 3, 1)));
    }

    #[test]
    fn n_days_is_modular_on_anchor() {
        let r = Recurrence::NDays {
            interval_days: 3,
            anchor: date(2026, 1, 1),
        };
        assert!(r.is_due_on(date(2026, 1, 1)));
        assert!(!r.is_due_on(date(2026, 1, 2)));
        assert!(r.is_due_on(date(2026, 1, 4)));
        assert!(!r.is_due_on(date(2025, 12, 31)));
    }

    #[test]
    fn ad_hoc_never_due() {
        let r = Recurrence::AdHoc;
        assert!(!r.is_due_on(date(2026, 1, 1)));
        assert!(!r.is_due_on(date(2030, 6, 15)));
    }

    #[test]
    fn is_deterministic() {
        let r = Recurrence::Weekly {
            weekdays: vec![Weekday::Mon, Weekday::Wed],
        };
        let d = date(2026, 1, 5);
        assert_eq!(r.is_due_on(d), r.is_due_on(d));
    }

    #[test]
    fn validate_rejects_empty_weekly_set() {
        let r = Recurrence::Weekly { weekdays: vec![] };
        assert!(r.validate().is_err());
    }

    #[test]
    fn validate_rejects_bad_ordinal() {
        let r = Recurrence::MonthlyDay {
            ordinal: 6,
            weekday: Weekday::Mon,
        };
        assert!(r.validate().is_err());
    }

    #[test]
    fn serde_round_trip() {
        let r = Recurrence::MonthlyDay {
            ordinal: -1,
            weekday: Weekday::Fri,
        };
        let json = serde_json::to_string(&r).unwrap();
        let back: Recurrence = serde_json::from_str(&json).unwrap();
        assert_eq!(r, back);
    }
}
