use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// "Once-Today" intention: one free-text note per calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OtEntry {
    pub day: NaiveDate,
    pub note: String,
}
