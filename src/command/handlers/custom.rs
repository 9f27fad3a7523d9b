//! Teaching and forgetting custom commands

use crate::command::custom::{CommandAction, CUSTOM_COMMAND_HINT};
use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::core::error::HeraldError;
use crate::session::SessionContext;

/// How many rules a listing shows
const LISTING_LIMIT: usize = 5;

pub fn custom_command_add(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    match ctx.custom_commands.create_from_phrase(&cmd.raw) {
        Ok(rule) => Reply::line(match &rule.action {
            CommandAction::Shell(command) => format!(
                "Custom command created: when you say '{}', I will run '{}'.",
                rule.trigger, command
            ),
            CommandAction::Text(text) => format!(
                "Custom command created: when you say '{}', I will say '{}'.",
                rule.trigger, text
            ),
        }),
        Err(e @ HeraldError::Parse(_)) => Reply::line(e.user_message()),
        Err(e) => Reply::new(vec![e.user_message(), CUSTOM_COMMAND_HINT.to_string()]),
    }
}

pub fn custom_command_list(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let rules = ctx.custom_commands.list();
    if rules.is_empty() {
        return Reply::new(vec![
            "You don't have any custom commands yet.".into(),
            "Create one by saying: 'when I say [trigger], run [command]'".into(),
        ]);
    }

    let mut reply = Reply::line(format!("You have {} custom commands:", rules.len()));
    for rule in rules.iter().take(LISTING_LIMIT) {
        let description = if rule.description.is_empty() {
            "No description"
        } else {
            rule.description.as_str()
        };
        reply.push(format!("- '{}': {}", rule.trigger, description));
    }
    reply
}

pub fn custom_command_remove(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let Some(trigger) = cmd.entity("trigger") else {
        return Reply::line("Which command should I remove? Say 'remove command [trigger]'.");
    };
    match ctx.custom_commands.remove(trigger) {
        Some(rule) => Reply::line(format!("Removed the custom command '{}'.", rule.trigger)),
        None => Reply::line(format!("There is no custom command for '{}'.", trigger)),
    }
}
