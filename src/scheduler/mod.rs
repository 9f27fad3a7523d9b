//! Scheduling engine
//!
//! Time phrase parsing, timer/reminder registries, and the notifier task
//! that fires them on the wall clock independently of the command loop.

pub mod engine;
pub mod notifier;
pub mod reminder;
pub mod time_expr;
pub mod timer;

pub use engine::{Scheduler, SchedulerEvent};
pub use notifier::spawn_notifier;
pub use reminder::{Reminder, ReminderStatus};
pub use time_expr::{parse_duration, parse_time_expression, split_time_phrase};
pub use timer::{Timer, TimerStatus, TimerView};
