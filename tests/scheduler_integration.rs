//! Scheduler integration tests
//!
//! Timers and reminders set through the command path, fired by the
//! background notifier, and restored from disk by a new session.

use std::time::Duration;

use chrono::{Local, TimeZone};
use proptest::prelude::*;
use tokio::sync::mpsc;

use herald::command::Router;
use herald::core::config::AssistantConfig;
use herald::scheduler::{parse_duration, parse_time_expression, spawn_notifier, SchedulerEvent};
use herald::session::{SessionContext, Storage};

fn offline_router() -> Router {
    Router::standard(None, Duration::from_secs(1))
}

#[tokio::test]
async fn test_timer_fires_through_notifier() {
    let router = offline_router();
    let mut ctx = SessionContext::in_memory(AssistantConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = spawn_notifier(ctx.scheduler.clone(), tx);

    let reply = router.dispatch(&mut ctx, "set a timer for 1 second called Kettle").await;
    assert_eq!(
        reply.lines,
        vec!["Kettle set for 1 second. I'll let you know when it's up.".to_string()]
    );

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timer did not fire")
        .expect("notifier stopped");
    assert!(matches!(&event, SchedulerEvent::TimerExpired(t) if t.label == "Kettle"));
    assert_eq!(event.message(), "Timer complete: Kettle (1 second) is up!");

    let before = ctx.memory.interaction_count;
    ctx.record_event(&event);
    let last = ctx.memory.records().last().unwrap();
    assert_eq!(last.intent, "timer_expired");
    assert_eq!(ctx.memory.interaction_count, before);

    let reply = router.dispatch(&mut ctx, "list timers").await;
    assert_eq!(reply.lines, vec!["No active timers.".to_string()]);

    notifier.abort();
}

#[tokio::test]
async fn test_reminder_fires_once() {
    let ctx = SessionContext::in_memory(AssistantConfig::default());
    let (tx, mut rx) = mpsc::unbounded_channel();
    let notifier = spawn_notifier(ctx.scheduler.clone(), tx);

    let target = Local::now() + chrono::Duration::milliseconds(300);
    ctx.scheduler.add_reminder("stand up", target).unwrap();

    let event = tokio::time::timeout(Duration::from_secs(5), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(event.message(), "Reminder: stand up");

    let again = tokio::time::timeout(Duration::from_millis(500), rx.recv()).await;
    assert!(again.is_err(), "reminder fired twice");
    assert_eq!(ctx.scheduler.counts(), (0, 0));

    notifier.abort();
}

#[tokio::test]
async fn test_reminders_survive_a_new_session() {
    let dir = tempfile::tempdir().unwrap();
    let router = offline_router();

    {
        let mut ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
        let reply = router
            .dispatch(&mut ctx, "remind me to water the ferns in 2 hours")
            .await;
        assert!(reply.lines[0].starts_with("Reminder set: water the ferns on"));
        ctx.flush().unwrap();
    }

    let mut ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
    let reply = router.dispatch(&mut ctx, "list reminders").await;
    assert_eq!(reply.lines[0], "You have 1 upcoming reminder:");
    assert!(reply.lines[1].starts_with("- 1. water the ferns at"));

    let reply = router.dispatch(&mut ctx, "cancel reminder 1").await;
    assert_eq!(
        reply.lines,
        vec!["Cancelled the reminder to water the ferns.".to_string()]
    );

    let ctx = SessionContext::open(Storage::new(dir.path())).unwrap();
    assert_eq!(ctx.scheduler.counts(), (0, 0));
}

#[tokio::test]
async fn test_past_reminder_is_rejected() {
    let router = offline_router();
    let mut ctx = SessionContext::in_memory(AssistantConfig::default());
    let reply = router
        .dispatch(&mut ctx, "remind me to leave in 0 minutes")
        .await;
    assert!(!reply.lines[0].starts_with("Reminder set"));
    assert!(ctx.scheduler.list_upcoming().is_empty());
}

proptest! {
    #[test]
    fn relative_phrases_add_exact_offsets(n in 1u64..10_000, unit in 0usize..3) {
        let (word, secs) = [("seconds", 1u64), ("minutes", 60), ("hours", 3600)][unit];
        let base = Local.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let target = parse_time_expression(&format!("in {} {}", n, word), base).unwrap();
        prop_assert_eq!((target - base).num_seconds() as u64, n * secs);
    }

    #[test]
    fn clock_times_are_always_in_the_future(hour in 0u32..24, minute in 0u32..60) {
        let base = Local.with_ymd_and_hms(2026, 6, 1, 12, 30, 0).unwrap();
        let target = parse_time_expression(&format!("at {:02}:{:02}", hour, minute), base).unwrap();
        prop_assert!(target > base);
        prop_assert!(target - base <= chrono::Duration::hours(24));
    }

    #[test]
    fn duration_found_inside_commands(n in 1u64..1_000) {
        prop_assert_eq!(parse_duration(&format!("set a timer for {} minutes please", n)), Some(n * 60));
    }

    #[test]
    fn arbitrary_text_never_panics(text in "\\PC{0,40}") {
        let base = Local.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap();
        let _ = parse_time_expression(&text, base);
        let _ = parse_duration(&text);
    }
}
