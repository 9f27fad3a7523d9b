//! Lookups: weather, search, questions, arithmetic, continuation

use crate::command::math::{evaluate, format_number, looks_like_math};
use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::services::{FeatureRequest, FeatureResponse};
use crate::session::SessionContext;

const HERE_WORDS: [&str; 4] = ["here", "my location", "current location", "my area"];

fn response_lines(response: FeatureResponse) -> Vec<String> {
    let mut lines: Vec<String> = response.text.lines().map(str::to_string).collect();
    if let Some(source) = response.source {
        lines.push(format!("Source: {}", source));
    }
    lines
}

pub fn weather(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let location = cmd
        .entity("location")
        .filter(|place| !HERE_WORDS.contains(&place.to_lowercase().as_str()))
        .map(str::to_string);

    match ctx.services.features.handle(&FeatureRequest::Weather { location }) {
        Ok(response) => Reply::new(response_lines(response)),
        Err(e) => Reply::line(format!(
            "Unable to retrieve weather information: {}",
            e.user_message()
        )),
    }
}

pub fn web_search(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let Some(query) = cmd.entity("query").map(str::to_string) else {
        return Reply::line("What would you like me to search for?");
    };

    let mut reply = Reply::line(format!("Searching for: {}", query));
    match ctx.services.features.handle(&FeatureRequest::WebSearch { query }) {
        Ok(response) => reply.lines.extend(response_lines(response)),
        Err(e) => reply.push(format!("Search failed: {}", e.user_message())),
    }
    reply
}

/// Answers go through the display budget and may leave a continuation
pub fn question(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let request = FeatureRequest::Question {
        text: cmd.raw.clone(),
    };
    match ctx.services.features.handle(&request) {
        Ok(response) => Reply::new(ctx.memory.present(&response.text, response.source.as_deref())),
        Err(e) => {
            tracing::debug!("Question provider failed: {}", e);
            Reply::line("I don't have enough information to answer that question reliably.")
        }
    }
}

/// Arithmetic, or a question when the text has no math in it
pub fn calculation(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    if !looks_like_math(&cmd.raw) {
        return question(ctx, cmd);
    }
    match evaluate(&cmd.raw) {
        Ok((expression, value)) => {
            Reply::line(format!("{} equals {}", expression, format_number(value)))
        }
        Err(e) => Reply::line(format!("Unable to calculate: {}", e.user_message())),
    }
}

pub fn more_info(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    Reply::new(ctx.memory.continue_answer())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::parsed::Intent;
    use crate::core::config::AssistantConfig;
    use crate::core::error::Result;
    use crate::services::{FeatureProvider, Services};

    struct Encyclopedia;

    impl FeatureProvider for Encyclopedia {
        fn handle(&self, request: &FeatureRequest) -> Result<FeatureResponse> {
            match request {
                FeatureRequest::Question { .. } => {
                    Ok(FeatureResponse::new("z".repeat(700)).with_source("Encyclopedia"))
                }
                FeatureRequest::Weather { location } => Ok(FeatureResponse::new(format!(
                    "Sunny in {}",
                    location.as_deref().unwrap_or("your area")
                ))),
                other => Err(crate::core::error::HeraldError::external(other.provider(), "down")),
            }
        }
    }

    fn ctx_with_encyclopedia() -> SessionContext {
        SessionContext::in_memory(AssistantConfig::default()).with_services(Services {
            features: Box::new(Encyclopedia),
            ..Services::default()
        })
    }

    #[test]
    fn test_long_answer_is_continued() {
        let mut ctx = ctx_with_encyclopedia();
        let cmd = ParsedCommand::new("tell me about zebras", Intent::Question, 0.7);
        let reply = question(&mut ctx, &cmd);
        assert_eq!(reply.lines.len(), 2);
        assert_eq!(reply.lines[0].chars().count(), 503);

        let more = more_info(&mut ctx, &ParsedCommand::new("tell me more", Intent::MoreInfo, 0.95));
        assert_eq!(more.lines, vec!["z".repeat(200), "Source: Encyclopedia".to_string()]);
    }

    #[test]
    fn test_weather_here_means_no_location() {
        let mut ctx = ctx_with_encyclopedia();
        let cmd = ParsedCommand::new("weather here", Intent::Weather, 0.9).with_entity("location", "here");
        assert_eq!(weather(&mut ctx, &cmd).lines, vec!["Sunny in your area".to_string()]);
    }

    #[test]
    fn test_offline_failures_are_lines() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        let cmd = ParsedCommand::new("search for otters", Intent::WebSearch, 0.9).with_entity("query", "otters");
        let reply = web_search(&mut ctx, &cmd);
        assert_eq!(reply.lines[0], "Searching for: otters");
        assert_eq!(reply.lines[1], "Search failed: search: no provider is configured");

        let reply = question(&mut ctx, &ParsedCommand::new("who is ada lovelace", Intent::Question, 0.7));
        assert_eq!(
            reply.lines,
            vec!["I don't have enough information to answer that question reliably.".to_string()]
        );
    }

    #[test]
    fn test_calculation() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        let reply = calculation(&mut ctx, &ParsedCommand::new("what is 2 plus 3", Intent::Calculation, 0.85));
        assert_eq!(reply.lines, vec!["2 + 3 equals 5".to_string()]);

        let reply = calculation(&mut ctx, &ParsedCommand::new("calculate 4 / 0", Intent::Calculation, 0.85));
        assert_eq!(reply.lines, vec!["Unable to calculate: Cannot divide by zero.".to_string()]);
    }
}
