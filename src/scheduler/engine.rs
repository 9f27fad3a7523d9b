//! Timer and reminder registries plus the due-entry queue
//!
//! Every entry carries its own fire time in a min-heap. The notifier task
//! drains due entries and turns them into `SchedulerEvent`s; cancelled
//! entries are left in the heap and skipped when popped.
//!
//! All mutations go through one mutex so a listing never observes an entry
//! mid-transition. The lock is never held across an await.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use chrono::Local;
use tokio::sync::Notify;
use tracing::{info, warn};

use crate::core::error::{HeraldError, Result};
use crate::core::types::{format_duration, ReminderId, TimerId, Timestamp};
use crate::scheduler::reminder::{Reminder, ReminderStatus};
use crate::scheduler::timer::{Timer, TimerStatus, TimerView};

/// Something the notifier surfaced without being asked
#[derive(Debug, Clone, PartialEq)]
pub enum SchedulerEvent {
    TimerExpired(Timer),
    ReminderFired(Reminder),
}

impl SchedulerEvent {
    /// Notification text for the output channel
    pub fn message(&self) -> String {
        match self {
            SchedulerEvent::TimerExpired(timer) => format!(
                "Timer complete: {} ({}) is up!",
                timer.label,
                format_duration(timer.duration_secs)
            ),
            SchedulerEvent::ReminderFired(reminder) => {
                format!("Reminder: {}", reminder.message)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum EntryKey {
    Timer(TimerId),
    Reminder(ReminderId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
struct QueueEntry {
    fire_at: Timestamp,
    key: EntryKey,
}

#[derive(Debug, Default)]
struct Registries {
    timers: Vec<Timer>,
    reminders: Vec<Reminder>,
    queue: BinaryHeap<Reverse<QueueEntry>>,
    timers_started: u32,
}

impl Registries {
    fn is_live(&self, key: &EntryKey) -> bool {
        match key {
            EntryKey::Timer(id) => self.timers.iter().any(|t| t.id == *id && t.is_running()),
            EntryKey::Reminder(id) => self
                .reminders
                .iter()
                .any(|r| r.id == *id && r.is_scheduled()),
        }
    }

    fn scheduled_reminders(&self) -> Vec<Reminder> {
        self.reminders
            .iter()
            .filter(|r| r.is_scheduled())
            .cloned()
            .collect()
    }
}

/// Shared handle to the timer and reminder registries
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    state: Arc<Mutex<Registries>>,
    wake: Arc<Notify>,
    store_path: Option<PathBuf>,
}

impl Scheduler {
    /// In-memory scheduler; reminders are not persisted
    pub fn new() -> Self {
        Self::default()
    }

    /// Scheduler whose reminders are persisted at `store_path`
    ///
    /// Reminders still scheduled in the file are re-queued. Ones whose target
    /// passed while the process was down fire on the first notifier pass.
    pub fn with_store(store_path: PathBuf) -> Result<Self> {
        let mut registries = Registries::default();

        if store_path.exists() {
            let content = std::fs::read_to_string(&store_path)?;
            let saved: Vec<Reminder> = serde_json::from_str(&content)?;
            for reminder in saved.into_iter().filter(Reminder::is_scheduled) {
                registries.queue.push(Reverse(QueueEntry {
                    fire_at: reminder.target,
                    key: EntryKey::Reminder(reminder.id),
                }));
                registries.reminders.push(reminder);
            }
            info!(
                "Scheduler: restored {} reminder(s) from {}",
                registries.reminders.len(),
                store_path.display()
            );
        }

        Ok(Self {
            state: Arc::new(Mutex::new(registries)),
            wake: Arc::new(Notify::new()),
            store_path: Some(store_path),
        })
    }

    fn registries(&self) -> MutexGuard<'_, Registries> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn wake_handle(&self) -> Arc<Notify> {
        Arc::clone(&self.wake)
    }

    // === TIMERS ===

    /// Start a countdown now
    pub fn add_timer(&self, duration_secs: u64) -> Result<Timer> {
        self.add_timer_at(None, duration_secs, Local::now())
    }

    /// Start a countdown with a caller-chosen label
    pub fn add_labeled_timer(&self, label: &str, duration_secs: u64) -> Result<Timer> {
        self.add_timer_at(Some(label), duration_secs, Local::now())
    }

    pub fn add_timer_at(
        &self,
        label: Option<&str>,
        duration_secs: u64,
        now: Timestamp,
    ) -> Result<Timer> {
        let timer = {
            let mut reg = self.registries();
            let label = match label {
                Some(label) => label.to_string(),
                None => format!("Timer {}", reg.timers_started + 1),
            };
            let timer = Timer::start(label, duration_secs, now)?;
            reg.timers_started += 1;
            reg.queue.push(Reverse(QueueEntry {
                fire_at: timer.ends_at,
                key: EntryKey::Timer(timer.id),
            }));
            reg.timers.push(timer.clone());
            timer
        };

        self.wake.notify_one();
        info!(
            "Scheduler: started '{}' for {}",
            timer.label,
            format_duration(duration_secs)
        );
        Ok(timer)
    }

    /// Running timers with their remaining time
    ///
    /// Expired and cancelled timers are swept out of the registry here.
    pub fn list_active(&self) -> Vec<TimerView> {
        self.list_active_at(Local::now())
    }

    pub fn list_active_at(&self, now: Timestamp) -> Vec<TimerView> {
        let mut reg = self.registries();
        reg.timers.retain(Timer::is_running);
        reg.timers
            .iter()
            .filter(|t| t.remaining_secs(now) > 0)
            .enumerate()
            .map(|(i, t)| TimerView::new(i + 1, t.clone(), now))
            .collect()
    }

    pub fn timer(&self, id: TimerId) -> Option<Timer> {
        self.registries().timers.iter().find(|t| t.id == id).cloned()
    }

    /// Cancel a running timer before it expires
    pub fn cancel_timer(&self, id: TimerId) -> Result<Timer> {
        let cancelled = {
            let mut reg = self.registries();
            let idx = reg
                .timers
                .iter()
                .position(|t| t.id == id && t.is_running())
                .ok_or_else(|| HeraldError::Scheduling("That timer is no longer running.".into()))?;
            let mut timer = reg.timers.remove(idx);
            timer.status = TimerStatus::Cancelled;
            timer
        };

        self.wake.notify_one();
        info!("Scheduler: cancelled '{}'", cancelled.label);
        Ok(cancelled)
    }

    // === REMINDERS ===

    /// Schedule a reminder; `target` must be after the current time
    pub fn add_reminder(&self, message: &str, target: Timestamp) -> Result<Reminder> {
        self.add_reminder_at(message, target, Local::now())
    }

    pub fn add_reminder_at(
        &self,
        message: &str,
        target: Timestamp,
        now: Timestamp,
    ) -> Result<Reminder> {
        let reminder = Reminder::schedule(message, target, now)?;
        {
            let mut reg = self.registries();
            reg.queue.push(Reverse(QueueEntry {
                fire_at: reminder.target,
                key: EntryKey::Reminder(reminder.id),
            }));
            reg.reminders.push(reminder.clone());
            self.persist(&reg);
        }

        self.wake.notify_one();
        info!("Scheduler: reminder '{}' set for {}", reminder.message, reminder.when());
        Ok(reminder)
    }

    /// Scheduled reminders ordered by target time, earliest first
    pub fn list_upcoming(&self) -> Vec<Reminder> {
        let mut upcoming = self.registries().scheduled_reminders();
        upcoming.sort_by_key(|r| r.target);
        upcoming
    }

    /// Cancel a scheduled reminder before it fires
    pub fn cancel_reminder(&self, id: ReminderId) -> Result<Reminder> {
        let cancelled = {
            let mut reg = self.registries();
            let idx = reg
                .reminders
                .iter()
                .position(|r| r.id == id && r.is_scheduled())
                .ok_or_else(|| {
                    HeraldError::Scheduling("That reminder is no longer scheduled.".into())
                })?;
            let mut reminder = reg.reminders.remove(idx);
            reminder.status = ReminderStatus::Cancelled;
            self.persist(&reg);
            reminder
        };

        self.wake.notify_one();
        info!("Scheduler: cancelled reminder '{}'", cancelled.message);
        Ok(cancelled)
    }

    // === FIRING ===

    /// Transition every entry due at `now` and return the resulting events
    ///
    /// Each entry is popped once, so an entry fires at most once.
    pub fn fire_due(&self, now: Timestamp) -> Vec<SchedulerEvent> {
        let mut reg = self.registries();
        let mut events = Vec::new();
        let mut reminders_changed = false;

        while reg
            .queue
            .peek()
            .is_some_and(|Reverse(entry)| entry.fire_at <= now)
        {
            let Some(Reverse(entry)) = reg.queue.pop() else {
                break;
            };
            match entry.key {
                EntryKey::Timer(id) => {
                    if let Some(timer) = reg.timers.iter_mut().find(|t| t.id == id && t.is_running()) {
                        timer.status = TimerStatus::Expired;
                        events.push(SchedulerEvent::TimerExpired(timer.clone()));
                    }
                }
                EntryKey::Reminder(id) => {
                    if let Some(idx) = reg
                        .reminders
                        .iter()
                        .position(|r| r.id == id && r.is_scheduled())
                    {
                        let mut reminder = reg.reminders.remove(idx);
                        reminder.status = ReminderStatus::Fired;
                        events.push(SchedulerEvent::ReminderFired(reminder));
                        reminders_changed = true;
                    }
                }
            }
        }

        if reminders_changed {
            self.persist(&reg);
        }
        events
    }

    /// Fire time of the earliest live entry, discarding stale heap entries
    pub fn next_due(&self) -> Option<Timestamp> {
        let mut reg = self.registries();
        loop {
            let entry = reg.queue.peek().map(|Reverse(entry)| *entry)?;
            if reg.is_live(&entry.key) {
                return Some(entry.fire_at);
            }
            reg.queue.pop();
        }
    }

    /// (running timers, scheduled reminders)
    pub fn counts(&self) -> (usize, usize) {
        let reg = self.registries();
        (
            reg.timers.iter().filter(|t| t.is_running()).count(),
            reg.reminders.iter().filter(|r| r.is_scheduled()).count(),
        )
    }

    fn persist(&self, reg: &Registries) {
        let Some(path) = &self.store_path else {
            return;
        };
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).ok();
        }
        match serde_json::to_string_pretty(&reg.scheduled_reminders()) {
            Ok(json) => {
                if let Err(e) = std::fs::write(path, json) {
                    warn!("Failed to persist reminders: {}", e);
                }
            }
            Err(e) => warn!("Failed to serialize reminders: {}", e),
        }
    }
}
