use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Habit {
    pub id: String,
    pub name: String,
    pub archived: bool,
    pub deleted: bool,
    pub created_at: DateTime<Utc>,
}

impl Habit {
    pub fn new(id: impl Into<String>, name: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Habit {
            id: id.into(),
            name: name.into(),
            archived: false,
            deleted: false,
            created_at,
        }
    }
}

/// Unique per `(habit_id, day)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HabitEntry {
    pub id: String,
    pub habit_id: String,
    pub day: NaiveDate,
    pub completed: bool,
}
