//! Who the user is

use rand::seq::SliceRandom;

use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::session::profile::system_user_name;
use crate::session::SessionContext;

pub fn user_identity(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    if let Some(name) = ctx.profile.display_name() {
        return Reply::line(format!("You are {}. How may I assist you?", name));
    }

    if ctx.profile.sanitize() {
        ctx.persist_memory();
    }
    Reply::new(vec![
        format!("Your system username is {}.", system_user_name()),
        "If you'd like, you can tell me your preferred name by saying 'my name is' followed by your name.".into(),
    ])
}

pub fn user_name_set(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let Some(name) = cmd.entity("name") else {
        return Reply::line("I didn't catch your name. Could you repeat that?");
    };

    if let Err(e) = ctx.profile.set_name(name) {
        return Reply::new(vec![
            e.user_message(),
            "I'm designed to maintain a professional and respectful interaction.".into(),
        ]);
    }
    ctx.persist_memory();

    let name = ctx.profile.name.clone();
    let pool = [
        format!("Understood. I will address you as {}.", name),
        format!("Pleasure to meet you, {}.", name),
        format!("Noted. Welcome, {}.", name),
        format!("I'll remember that. Hello, {}.", name),
    ];
    let line = pool
        .choose(&mut rand::thread_rng())
        .cloned()
        .unwrap_or_else(|| format!("Hello, {}.", name));
    Reply::line(line)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parsed::Intent;
    use crate::core::config::AssistantConfig;

    fn name_cmd(name: &str) -> ParsedCommand {
        ParsedCommand::new(&format!("my name is {}", name), Intent::UserNameSet, 0.95)
            .with_entity("name", name)
    }

    #[test]
    fn test_set_then_query_name() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        let reply = user_name_set(&mut ctx, &name_cmd("Phillippi"));
        assert!(reply.lines[0].contains("Phillippi"));

        let reply = user_identity(&mut ctx, &ParsedCommand::new("who am i", Intent::UserIdentity, 0.9));
        assert_eq!(reply.lines, vec!["You are Phillippi. How may I assist you?".to_string()]);
    }

    #[test]
    fn test_offensive_name_rejected_without_mutation() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        user_name_set(&mut ctx, &name_cmd("Elena"));
        let reply = user_name_set(&mut ctx, &name_cmd("fu(k"));
        assert_eq!(
            reply.lines[0],
            "I cannot accept that name. Please provide a different, respectful name."
        );
        assert_eq!(ctx.profile.name, "Elena");
    }

    #[test]
    fn test_unknown_name_falls_back_to_system_user() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        ctx.profile.name = "sh1t".into();
        let reply = user_identity(&mut ctx, &ParsedCommand::new("who am i", Intent::UserIdentity, 0.9));
        assert!(reply.lines[0].starts_with("Your system username is"));
        assert!(ctx.profile.name.is_empty());
    }
}
