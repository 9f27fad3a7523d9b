//! Background task that fires due timers and reminders
//!
//! The notifier sleeps until the earliest fire time, or until the scheduler
//! wakes it because an entry was added or cancelled. Events go out over an
//! unbounded channel so the command loop can print them while it waits for
//! input.

use chrono::Local;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::scheduler::engine::{Scheduler, SchedulerEvent};

/// Spawn the notifier on the current tokio runtime
///
/// The task ends once the receiving side of `events` is dropped.
pub fn spawn_notifier(
    scheduler: Scheduler,
    events: UnboundedSender<SchedulerEvent>,
) -> JoinHandle<()> {
    tokio::spawn(run_notifier(scheduler, events))
}

async fn run_notifier(scheduler: Scheduler, events: UnboundedSender<SchedulerEvent>) {
    let wake = scheduler.wake_handle();

    loop {
        for event in scheduler.fire_due(Local::now()) {
            info!("Notifier: {}", event.message());
            if events.send(event).is_err() {
                return;
            }
        }

        match scheduler.next_due() {
            Some(at) => {
                let wait = (at - Local::now()).to_std().unwrap_or_default();
                debug!("Notifier: next entry due in {:?}", wait);
                tokio::select! {
                    _ = tokio::time::sleep(wait) => {}
                    _ = wake.notified() => {}
                    _ = events.closed() => return,
                }
            }
            None => {
                tokio::select! {
                    _ = wake.notified() => {}
                    _ = events.closed() => return,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::sync::mpsc;

    #[tokio::test]
    async fn test_timer_expiry_is_pushed_without_polling() {
        let scheduler = Scheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let handle = spawn_notifier(scheduler.clone(), tx);

        let timer = scheduler.add_timer(1).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("notifier did not fire in time")
            .expect("channel closed");
        assert!(matches!(event, SchedulerEvent::TimerExpired(t) if t.id == timer.id));

        drop(rx);
        tokio::time::timeout(Duration::from_secs(5), handle)
            .await
            .expect("notifier did not stop")
            .unwrap();
    }

    #[tokio::test]
    async fn test_cancelled_timer_is_not_announced() {
        let scheduler = Scheduler::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        spawn_notifier(scheduler.clone(), tx);

        let doomed = scheduler.add_timer(1).unwrap();
        scheduler.cancel_timer(doomed.id).unwrap();
        let kept = scheduler.add_timer(2).unwrap();

        let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert!(matches!(event, SchedulerEvent::TimerExpired(t) if t.id == kept.id));
    }
}
