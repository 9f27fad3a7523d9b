//! Timers and reminders

use chrono::Local;

use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::core::types::format_duration;
use crate::scheduler::{parse_duration, parse_time_expression, split_time_phrase, Reminder, TimerView};
use crate::session::SessionContext;

const REMINDER_PREFIXES: [&str; 7] = [
    "set a reminder to",
    "set reminder to",
    "remind me to",
    "set a reminder",
    "set reminder",
    "remind me",
    "reminder to",
];

const LABEL_MARKERS: [&str; 4] = [" called ", " named ", " labeled ", " labelled "];

/// How many reminders a listing shows
const REMINDER_LISTING_LIMIT: usize = 5;

fn counted(n: usize, noun: &str) -> String {
    if n == 1 {
        format!("1 {}", noun)
    } else {
        format!("{} {}s", n, noun)
    }
}

/// Text after the first of `markers` found, compared case-insensitively
fn after_marker<'a>(text: &'a str, markers: &[&str]) -> Option<&'a str> {
    let lower = text.to_ascii_lowercase();
    markers.iter().find_map(|marker| {
        lower
            .find(marker)
            .map(|at| text[at + marker.len()..].trim())
            .filter(|rest| !rest.is_empty())
    })
}

fn timer_line(view: &TimerView) -> String {
    format!(
        "- {}. {}: {} remaining",
        view.position, view.timer.label, view.remaining_formatted
    )
}

fn reminder_line(position: usize, reminder: &Reminder) -> String {
    format!("- {}. {} at {}", position, reminder.message, reminder.when())
}

pub fn set_timer(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let Some(secs) = parse_duration(&cmd.raw) else {
        return Reply::line("Please specify a duration. Example: 'set timer for 5 minutes'");
    };

    let result = match after_marker(&cmd.raw, &LABEL_MARKERS) {
        Some(label) => ctx.scheduler.add_labeled_timer(label, secs),
        None => ctx.scheduler.add_timer(secs),
    };
    match result {
        Ok(timer) => Reply::line(format!(
            "{} set for {}. I'll let you know when it's up.",
            timer.label,
            format_duration(timer.duration_secs)
        )),
        Err(e) => Reply::line(format!("Failed to set timer: {}", e.user_message())),
    }
}

pub fn set_reminder(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let lower = cmd.raw.to_ascii_lowercase();
    let body = REMINDER_PREFIXES
        .iter()
        .find_map(|prefix| lower.find(prefix).map(|at| (at, prefix.len())))
        .map(|(at, len)| format!("{} {}", &cmd.raw[..at], &cmd.raw[at + len..]))
        .unwrap_or_else(|| cmd.raw.clone());

    let Some((message, expression)) = split_time_phrase(body.trim()) else {
        return Reply::line("When should I remind you? Try: 'remind me to [task] in [time]'");
    };

    let now = Local::now();
    let target = match parse_time_expression(&expression, now) {
        Ok(target) => target,
        Err(e) => return Reply::line(e.user_message()),
    };

    match ctx.scheduler.add_reminder_at(&message, target, now) {
        Ok(reminder) => Reply::line(format!(
            "Reminder set: {} on {}.",
            reminder.message,
            reminder.when()
        )),
        Err(e) => Reply::line(format!("Failed to set reminder: {}", e.user_message())),
    }
}

pub fn list_timers(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let views = ctx.scheduler.list_active();
    if views.is_empty() {
        return Reply::line("No active timers.");
    }
    let mut reply = Reply::line(format!("You have {}:", counted(views.len(), "active timer")));
    for view in &views {
        reply.push(timer_line(view));
    }
    reply
}

pub fn list_reminders(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let upcoming = ctx.scheduler.list_upcoming();
    if upcoming.is_empty() {
        return Reply::line("You don't have any active reminders.");
    }
    let mut reply = Reply::line(format!(
        "You have {}:",
        counted(upcoming.len(), "upcoming reminder")
    ));
    for (i, reminder) in upcoming.iter().take(REMINDER_LISTING_LIMIT).enumerate() {
        reply.push(reminder_line(i + 1, reminder));
    }
    reply
}

pub fn cancel_timer(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let views = ctx.scheduler.list_active();
    if views.is_empty() {
        return Reply::line("No active timers to cancel.");
    }

    let target = cmd.entity("target");
    let chosen = match target.map(str::parse::<usize>) {
        Some(Ok(n)) => match views.iter().find(|v| v.position == n) {
            Some(view) => view,
            None => return Reply::line(format!("There is no timer {}.", n)),
        },
        Some(Err(_)) => {
            let wanted = target.unwrap_or_default().to_lowercase();
            match views.iter().find(|v| v.timer.label.to_lowercase().contains(&wanted)) {
                Some(view) => view,
                None => return Reply::line(format!("I couldn't find a timer matching '{}'.", wanted)),
            }
        }
        None if views.len() == 1 => &views[0],
        None => {
            let mut reply = Reply::line("Which timer? Say 'cancel timer <number>'.");
            for view in &views {
                reply.push(timer_line(view));
            }
            return reply;
        }
    };

    match ctx.scheduler.cancel_timer(chosen.timer.id) {
        Ok(timer) => Reply::line(format!("Cancelled {}.", timer.label)),
        Err(e) => Reply::line(e.user_message()),
    }
}

pub fn cancel_reminder(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let upcoming = ctx.scheduler.list_upcoming();
    if upcoming.is_empty() {
        return Reply::line("You don't have any reminders to cancel.");
    }

    let target = cmd.entity("target");
    let chosen = match target.map(str::parse::<usize>) {
        Some(Ok(n)) => match n.checked_sub(1).and_then(|i| upcoming.get(i)) {
            Some(reminder) => reminder,
            None => return Reply::line(format!("There is no reminder {}.", n)),
        },
        Some(Err(_)) => {
            let wanted = target
                .unwrap_or_default()
                .trim_start_matches("to ")
                .trim_start_matches("about ")
                .to_lowercase();
            match upcoming.iter().find(|r| r.message.to_lowercase().contains(&wanted)) {
                Some(reminder) => reminder,
                None => {
                    return Reply::line(format!("I couldn't find a reminder matching '{}'.", wanted))
                }
            }
        }
        None if upcoming.len() == 1 => &upcoming[0],
        None => {
            let mut reply = Reply::line("Which reminder? Say 'cancel reminder <number>'.");
            for (i, reminder) in upcoming.iter().take(REMINDER_LISTING_LIMIT).enumerate() {
                reply.push(reminder_line(i + 1, reminder));
            }
            return reply;
        }
    };

    match ctx.scheduler.cancel_reminder(chosen.id) {
        Ok(reminder) => Reply::line(format!("Cancelled the reminder to {}.", reminder.message)),
        Err(e) => Reply::line(e.user_message()),
    }
}
