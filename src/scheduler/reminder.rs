//! One-shot reminders

use serde::{Deserialize, Serialize};

use crate::core::error::{HeraldError, Result};
use crate::core::types::{ReminderId, Timestamp};

/// Lifecycle of a reminder: `Scheduled -> Fired | Cancelled`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReminderStatus {
    Scheduled,
    Fired,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: ReminderId,
    pub message: String,
    pub target: Timestamp,
    pub created_at: Timestamp,
    pub status: ReminderStatus,
}

impl Reminder {
    /// Schedule a reminder; the target must be strictly after `now`
    pub fn schedule(message: &str, target: Timestamp, now: Timestamp) -> Result<Self> {
        let message = message.trim();
        if message.is_empty() {
            return Err(HeraldError::Scheduling(
                "What should I remind you about? Try: 'remind me to [task] in [time]'".into(),
            ));
        }
        if target <= now {
            return Err(HeraldError::Scheduling(format!(
                "{} has already passed. Reminders need a time in the future.",
                target.format("%B %d at %I:%M %p")
            )));
        }

        Ok(Self {
            id: ReminderId::new(),
            message: message.to_string(),
            target,
            created_at: now,
            status: ReminderStatus::Scheduled,
        })
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == ReminderStatus::Scheduled
    }

    /// "March 10 at 03:30 PM" style rendering of the target
    pub fn when(&self) -> String {
        self.target.format("%B %d at %I:%M %p").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Local, TimeZone};

    #[test]
    fn test_target_must_be_in_future() {
        let now = Local.with_ymd_and_hms(2026, 3, 10, 14, 0, 0).unwrap();
        assert!(Reminder::schedule("stand up", now, now).is_err());
        assert!(Reminder::schedule("stand up", now - Duration::seconds(1), now).is_err());

        let ok = Reminder::schedule("  stand up ", now + Duration::seconds(1), now).unwrap();
        assert_eq!(ok.message, "stand up");
        assert!(ok.is_scheduled());
    }

    #[test]
    fn test_empty_message_rejected() {
        let now = Local::now();
        assert!(Reminder::schedule("   ", now + Duration::minutes(5), now).is_err());
    }
}
