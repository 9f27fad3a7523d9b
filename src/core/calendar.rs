//! Time-of-day periods for greetings and day-marker defaults

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use crate::core::types::Timestamp;

/// Time of day periods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TimePeriod {
    Morning,    // 05:00-12:00
    Afternoon,  // 12:00-17:00
    Evening,    // 17:00-22:00
    Night,      // 22:00-05:00
}

impl TimePeriod {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimePeriod::Morning,
            12..=16 => TimePeriod::Afternoon,
            17..=21 => TimePeriod::Evening,
            _ => TimePeriod::Night, // 22-23, 0-4
        }
    }

    pub fn of(instant: &Timestamp) -> Self {
        Self::from_hour(instant.hour())
    }

    /// Opening phrase used when greeting the user
    pub fn salutation(&self) -> &'static str {
        match self {
            TimePeriod::Morning => "Good morning.",
            TimePeriod::Afternoon => "Good afternoon.",
            TimePeriod::Evening => "Good evening.",
            TimePeriod::Night => "Working late, I see.",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Local, TimeZone};

    #[test]
    fn test_time_period_from_hour() {
        assert_eq!(TimePeriod::from_hour(5), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(11), TimePeriod::Morning);
        assert_eq!(TimePeriod::from_hour(12), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(16), TimePeriod::Afternoon);
        assert_eq!(TimePeriod::from_hour(17), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(21), TimePeriod::Evening);
        assert_eq!(TimePeriod::from_hour(22), TimePeriod::Night);
        assert_eq!(TimePeriod::from_hour(3), TimePeriod::Night);
    }

    #[test]
    fn test_time_period_of_timestamp() {
        let morning = Local.with_ymd_and_hms(2026, 3, 10, 8, 30, 0).unwrap();
        assert_eq!(TimePeriod::of(&morning), TimePeriod::Morning);
        assert_eq!(TimePeriod::of(&morning).salutation(), "Good morning.");
    }
}
