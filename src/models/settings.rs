use serde::{Deserialize, Serialize};

use crate::time::DayWindow;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub day_window: DayWindow,
    pub default_block_min: u32,
    pub timezone: String,
    pub notifications_enabled: bool,
    pub notify_block_start: bool,
    pub notify_block_end: bool,
    pub block_start_offset_min: u32,
    pub block_end_offset_min: u32,
    pub notification_grace_period_min: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            day_window: DayWindow {
                start: 7 * 60,
                end: 22 * 60,
            },
            default_block_min: 30,
            timezone: "UTC".to_string(),
            notifications_enabled: true,
            notify_block_start: true,
            notify_block_end: true,
            block_start_offset_min: 5,
            block_end_offset_min: 5,
            notification_grace_period_min: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_spec() {
        let settings = Settings::default();
        assert_eq!(settings.day_window.start, 420);
        assert_eq!(settings.day_window.end, 1320);
        assert_eq!(settings.block_start_offset_min, 5);
        assert_eq!(settings.block_end_offset_min, 5);
        assert_eq!(settings.notification_grace_period_min, 10);
    }
}
