use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::session::SessionContext;

pub fn list_plugins(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let plugins = ctx.services.plugins.list();
    if plugins.is_empty() {
        return Reply::line("No plugins loaded. Say 'load plugin [name]' to load one.");
    }

    let mut reply = Reply::line(format!("Loaded plugins ({}):", plugins.len()));
    for plugin in plugins {
        reply.push(format!("- {} v{}", plugin.title, plugin.version));
        reply.push(format!("  {}", plugin.description));
        reply.push(format!("  Commands: {}", plugin.commands.join(", ")));
    }
    reply
}

pub fn load_plugin(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let Some(name) = cmd.entity("plugin_name") else {
        return Reply::line("Which plugin would you like to load?");
    };
    match ctx.services.plugins.load(name) {
        Ok(plugin) => Reply::new(vec![
            format!("Loaded plugin {} v{}.", plugin.title, plugin.version),
            format!("Available commands: {}", plugin.commands.join(", ")),
        ]),
        Err(e) => Reply::line(format!("Failed to load plugin: {}", e.user_message())),
    }
}

/// "plugin <name> <command> [args...]"
pub fn plugin_command(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let parts: Vec<&str> = cmd.raw.split_whitespace().collect();
    let [_, plugin, command, args @ ..] = parts.as_slice() else {
        return Reply::line("Use format: 'plugin [name] [command] [args]'");
    };
    let args = (!args.is_empty()).then(|| args.join(" "));

    match ctx.services.plugins.execute(plugin, command, args.as_deref()) {
        Ok(output) => {
            let mut reply = Reply::line(
                output
                    .message
                    .unwrap_or_else(|| "Plugin command executed".to_string()),
            );
            if let Some(data) = output.data {
                reply.push(format!("Result: {}", data));
            }
            reply
        }
        Err(e) => Reply::line(format!("Plugin command failed: {}", e.user_message())),
    }
}
