//! Countdown timers

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::core::error::{HeraldError, Result};
use crate::core::types::{format_duration, TimerId, Timestamp};

/// Lifecycle of a timer
///
/// `Running -> Expired` happens on the clock; `Running -> Cancelled` on user
/// request. Both end states are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerStatus {
    Running,
    Expired,
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Timer {
    pub id: TimerId,
    pub label: String,
    pub duration_secs: u64,
    pub started_at: Timestamp,
    pub ends_at: Timestamp,
    pub status: TimerStatus,
}

impl Timer {
    /// Start a countdown at `now`
    pub fn start(label: String, duration_secs: u64, now: Timestamp) -> Result<Self> {
        if duration_secs == 0 {
            return Err(HeraldError::Scheduling(
                "Timer duration must be at least one second.".into(),
            ));
        }
        let ends_at = i64::try_from(duration_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .and_then(|delta| now.checked_add_signed(delta))
            .ok_or_else(|| HeraldError::Scheduling("That timer is too long.".into()))?;

        Ok(Self {
            id: TimerId::new(),
            label,
            duration_secs,
            started_at: now,
            ends_at,
            status: TimerStatus::Running,
        })
    }

    /// max(0, duration - elapsed), in whole seconds
    pub fn remaining_secs(&self, now: Timestamp) -> u64 {
        let elapsed = (now - self.started_at).num_seconds().max(0) as u64;
        self.duration_secs.saturating_sub(elapsed)
    }

    pub fn is_running(&self) -> bool {
        self.status == TimerStatus::Running
    }
}

/// A running timer as shown to the user
#[derive(Debug, Clone, PartialEq)]
pub struct TimerView {
    /// 1-based position in the listing, used by "cancel timer <n>"
    pub position: usize,
    pub timer: Timer,
    pub remaining_secs: u64,
    pub remaining_formatted: String,
}

impl TimerView {
    pub fn new(position: usize, timer: Timer, now: Timestamp) -> Self {
        let remaining_secs = timer.remaining_secs(now);
        Self {
            position,
            timer,
            remaining_secs,
            remaining_formatted: format_duration(remaining_secs),
        }
    }
}
