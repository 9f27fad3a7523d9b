//! Conversation basics: greetings, help, status, clock

use chrono::Local;
use rand::seq::SliceRandom;

use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::core::calendar::TimePeriod;
use crate::session::SessionContext;

const THANKS_POOL: [&str; 4] = [
    "You're welcome.",
    "My pleasure.",
    "Happy to help.",
    "Anytime. Let me know if you need anything else.",
];

const HELP_TEXT: &str = "\
Available Commands:

Basic Interaction:
  - hello, hi - Greet the assistant
  - goodbye, exit - Save and quit
  - help - Show this message
  - my name is [name] - Tell me your name
  - who am i - Ask what I call you

Information:
  - what time is it / what date is it
  - status, report - Session status
  - weather [in location] - Current weather
  - search for [query] - Web search
  - who/what/where... [question] - Ask a question
  - what is 12 times 4 - Arithmetic
  - where am i, what timezone, system info
  - news, tech news, news about [topic]
  - bitcoin price, convert [amount] [from] to [to]
  - github user [name], shorten [url], check website [site]

Scheduling & Reminders:
  - set timer for [duration] - Start a countdown
  - remind me to [task] in/at/tomorrow [time] - Set a reminder
  - list timers / list reminders
  - cancel timer [n] / cancel reminder [n or words]

Custom Commands:
  - when I say [trigger], run [command] - Run a shell command
  - when I say [trigger], say [text] - Reply with text
  - list commands - Show custom commands
  - remove command [trigger] - Delete a command

Plugins:
  - list plugins / load plugin [name]
  - plugin [name] [command] [args]

Continuation:
  - tell me more - Continue a long answer

Extended Features:
  - volume up/down/[0-100], play [song] on youtube/spotify, pause music
  - organize downloads, take screenshot
  - translate [text] to [language], send notification [message]
  - start focus mode for [N] minutes, track habit [name], habit stats
  - git status, docker ps
  - turn on/off lights, roku play/pause/home
  - log water [amount]ml, log exercise [activity] [minutes], health summary
  - add expense [amount] for [category], budget status, stock price [symbol]";

pub fn greeting(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let salutation = TimePeriod::of(&Local::now()).salutation();
    let name = &ctx.config.assistant_name;
    let pool = [
        format!("{} {} online and ready to assist.", salutation, name),
        format!("{} All systems operational. How may I be of service?", salutation),
        format!("{} {} active. Awaiting your command.", salutation, name),
    ];
    let line = pool
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| salutation.to_string());
    Reply::line(line)
}

pub fn farewell(_ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::farewell("Powering down. Until next time.")
}

pub fn thank_you(_ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let line = THANKS_POOL
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or("You're welcome.");
    Reply::line(line)
}

pub fn help(_ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::line(HELP_TEXT)
}

pub fn status(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let now = Local::now();
    let (timers, reminders) = ctx.scheduler.counts();
    Reply::new(vec![
        "System Status Report:".into(),
        format!("Date: {}", now.format("%B %d, %Y")),
        format!("Time: {}", now.format("%I:%M %p")),
        format!("Operating System: {}", ctx.services.system.os_name()),
        format!("Active timers: {}", timers),
        format!("Upcoming reminders: {}", reminders),
        format!("Custom commands: {}", ctx.custom_commands.list().len()),
        format!("Interactions so far: {}", ctx.memory.interaction_count),
        "All systems nominal.".into(),
    ])
}

pub fn time(_ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::line(format!("The current time is {}", Local::now().format("%I:%M %p")))
}

pub fn date(_ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::line(format!("Today is {}", Local::now().format("%B %d, %Y")))
}

pub fn identity(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::line(format!(
        "I am {}, your text-command assistant. I keep your timers and reminders, \
         answer questions, and run the shortcuts you teach me.",
        ctx.config.assistant_name
    ))
}

pub fn capabilities(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::new(vec![
        format!("I am {}, a text-command assistant.", ctx.config.assistant_name),
        "I can set timers and reminders, answer questions, do arithmetic, and run custom commands.".into(),
        "Extended features cover media, automation, translation, productivity, developer tools, home devices, health, and finance.".into(),
        "Say 'help' for a list of specific commands.".into(),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parsed::Intent;
    use crate::core::config::AssistantConfig;

    fn ctx() -> SessionContext {
        SessionContext::in_memory(AssistantConfig::default())
    }

    fn cmd(text: &str) -> ParsedCommand {
        ParsedCommand::new(text, Intent::Unknown, 0.9)
    }

    #[test]
    fn test_farewell_ends_session() {
        let reply = farewell(&mut ctx(), &cmd("bye"));
        assert!(reply.end_session);
        assert!(!greeting(&mut ctx(), &cmd("hi")).end_session);
    }

    #[test]
    fn test_greeting_uses_period_salutation() {
        let reply = greeting(&mut ctx(), &cmd("hello"));
        let salutation = TimePeriod::of(&Local::now()).salutation();
        assert!(reply.lines[0].starts_with(salutation));
    }

    #[test]
    fn test_status_counts_scheduler_entries() {
        let mut session = ctx();
        session.scheduler.add_timer(300).unwrap();
        let reply = status(&mut session, &cmd("status"));
        assert_eq!(reply.lines[0], "System Status Report:");
        assert!(reply.lines.contains(&"Active timers: 1".to_string()));
        assert_eq!(reply.lines.last().map(String::as_str), Some("All systems nominal."));
    }
}
