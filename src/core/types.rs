//! Core type definitions used throughout the codebase

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Wall-clock instant in the user's local time zone
pub type Timestamp = DateTime<Local>;

/// Unique identifier for timers
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerId(pub Uuid);

impl TimerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TimerId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for reminders
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReminderId(pub Uuid);

impl ReminderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ReminderId {
    fn default() -> Self {
        Self::new()
    }
}

/// Render a span of seconds as "1 hour 5 minutes", omitting zero units
pub fn format_duration(total_secs: u64) -> String {
    let hours = total_secs / 3600;
    let minutes = (total_secs % 3600) / 60;
    let seconds = total_secs % 60;

    let mut parts = Vec::new();
    for (amount, unit) in [(hours, "hour"), (minutes, "minute"), (seconds, "second")] {
        if amount > 0 {
            let plural = if amount == 1 { "" } else { "s" };
            parts.push(format!("{} {}{}", amount, unit, plural));
        }
    }

    if parts.is_empty() {
        "0 seconds".to_string()
    } else {
        parts.join(" ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_duration_omits_zero_units() {
        assert_eq!(format_duration(10), "10 seconds");
        assert_eq!(format_duration(60), "1 minute");
        assert_eq!(format_duration(3660), "1 hour 1 minute");
        assert_eq!(format_duration(7322), "2 hours 2 minutes 2 seconds");
        assert_eq!(format_duration(0), "0 seconds");
    }

    #[test]
    fn test_ids_are_unique() {
        assert_ne!(TimerId::new(), TimerId::new());
        assert_ne!(ReminderId::new(), ReminderId::new());
    }
}
