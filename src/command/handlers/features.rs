//! Keyword bands: substring-matched feature groups tried after the intent table

use crate::command::reply::Reply;
use crate::core::types::format_duration;
use crate::services::{FeatureRequest, MediaService, VolumeChange};
use crate::session::SessionContext;

use super::KeywordHandler;

const FOCUS_MINUTES: u64 = 25;
const WATER_SERVING_ML: u32 = 250;

/// Bands in the order they are tried
pub fn keyword_handlers() -> Vec<KeywordHandler> {
    vec![
        KeywordHandler {
            group: "media",
            matches: |t| contains_any(t, &["volume", "music", "play", "pause"]),
            handle: media,
        },
        KeywordHandler {
            group: "automation",
            matches: |t| contains_any(t, &["organize downloads", "organize files", "screenshot"]),
            handle: automation,
        },
        KeywordHandler {
            group: "communication",
            matches: |t| contains_any(t, &["translate", "send notification"]),
            handle: communication,
        },
        KeywordHandler {
            group: "productivity",
            matches: |t| contains_any(t, &["focus mode", "track habit", "log habit", "habit stats"]),
            handle: productivity,
        },
        KeywordHandler {
            group: "dev",
            matches: |t| contains_any(t, &["git", "docker"]),
            handle: dev_tools,
        },
        KeywordHandler {
            group: "home",
            matches: |t| {
                (contains_any(t, &["turn on", "turn off"]) && contains_any(t, &["light", "roku"]))
                    || t.contains("roku")
            },
            handle: home,
        },
        KeywordHandler {
            group: "health",
            matches: |t| contains_any(t, &["log water", "health summary", "log exercise"]),
            handle: health,
        },
        KeywordHandler {
            group: "finance",
            matches: |t| contains_any(t, &["add expense", "budget status", "stock price"]),
            handle: finance,
        },
    ]
}

fn contains_any(text: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| text.contains(needle))
}

/// Numbers appearing in `text`, in order; a leading currency sign is ignored
fn numbers(text: &str) -> impl Iterator<Item = f64> + '_ {
    text.split(|c: char| !(c.is_ascii_digit() || c == '.'))
        .map(|run| run.trim_matches('.'))
        .filter(|run| !run.is_empty())
        .filter_map(|run| run.parse::<f64>().ok())
}

fn first_whole(text: &str) -> Option<u32> {
    numbers(text)
        .next()
        .filter(|n| *n >= 0.0 && *n <= f64::from(u32::MAX))
        .map(|n| n as u32)
}

/// Raw text after the first case-insensitive occurrence of `phrase`
fn after<'a>(raw: &'a str, lower: &str, phrase: &str) -> Option<&'a str> {
    lower
        .find(phrase)
        .and_then(|at| raw.get(at + phrase.len()..))
        .map(str::trim)
        .filter(|rest| !rest.is_empty())
}

fn request(ctx: &SessionContext, request: FeatureRequest) -> Reply {
    match ctx.services.features.handle(&request) {
        Ok(response) => {
            let mut reply = Reply::new(response.text.lines().map(str::to_string).collect());
            if let Some(source) = response.source {
                reply.push(format!("Source: {}", source));
            }
            reply
        }
        Err(e) => Reply::line(e.user_message()),
    }
}

fn media(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("volume") {
        let change = if contains_any(&lower, &["up", "increase", "raise"]) {
            VolumeChange::Up
        } else if contains_any(&lower, &["down", "decrease", "lower"]) {
            VolumeChange::Down
        } else if lower.contains("mute") {
            VolumeChange::Mute
        } else if let Some(level) = first_whole(&lower) {
            VolumeChange::Set(level.min(100) as u8)
        } else {
            return Reply::line("Say 'volume up', 'volume down', 'mute volume' or 'set volume to 50'.");
        };
        return request(ctx, FeatureRequest::Volume(change));
    }

    if let Some(rest) = after(raw, &lower, "play") {
        let rest_lower = rest.to_ascii_lowercase();
        let (service, marker) = if rest_lower.contains("youtube") {
            (Some(MediaService::YouTube), "youtube")
        } else if rest_lower.contains("spotify") {
            (Some(MediaService::Spotify), "spotify")
        } else {
            (None, "")
        };
        let query = if marker.is_empty() {
            rest.to_string()
        } else {
            strip_service(rest, &rest_lower, marker)
        };
        if query.is_empty() {
            return Reply::line("What would you like me to play?");
        }
        return request(ctx, FeatureRequest::Play { service, query });
    }

    if contains_any(&lower, &["pause", "stop"]) {
        return request(ctx, FeatureRequest::PauseMedia);
    }

    Reply::line("What would you like me to play?")
}

/// Drop "on <service>" / "<service>" from a play query
fn strip_service(rest: &str, rest_lower: &str, service: &str) -> String {
    let cut = rest_lower
        .find(&format!("on {}", service))
        .or_else(|| rest_lower.find(service))
        .unwrap_or(rest.len());
    let tail = rest_lower[cut..]
        .find(service)
        .map(|at| cut + at + service.len())
        .unwrap_or(rest.len());
    format!("{} {}", &rest[..cut], &rest[tail..])
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn automation(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();
    if lower.contains("screenshot") {
        request(ctx, FeatureRequest::Screenshot)
    } else {
        request(ctx, FeatureRequest::OrganizeDownloads)
    }
}

fn communication(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if let Some(rest) = after(raw, &lower, "translate") {
        let rest_lower = rest.to_ascii_lowercase();
        return match rest_lower.rfind(" to ") {
            Some(at) if !rest[..at].trim().is_empty() && !rest[at + 4..].trim().is_empty() => {
                request(
                    ctx,
                    FeatureRequest::Translate {
                        text: rest[..at].trim().to_string(),
                        language: rest[at + 4..].trim().to_string(),
                    },
                )
            }
            _ => Reply::line("Use format: 'translate [text] to [language]'"),
        };
    }

    if lower.contains("translate") {
        return Reply::line("Use format: 'translate [text] to [language]'");
    }

    match after(raw, &lower, "send notification") {
        Some(message) => {
            let message = message
                .trim_start_matches(':')
                .trim_start_matches("saying")
                .trim()
                .to_string();
            if message.is_empty() {
                Reply::line("What should the notification say?")
            } else {
                request(ctx, FeatureRequest::SendNotification { message })
            }
        }
        None => Reply::line("What should the notification say?"),
    }
}

fn productivity(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("focus mode") {
        let minutes = focus_minutes(&lower).unwrap_or(FOCUS_MINUTES);
        let Some(secs) = minutes.checked_mul(60) else {
            return Reply::line("Failed to start focus mode: That timer is too long.");
        };
        return match ctx.scheduler.add_labeled_timer("Focus mode", secs) {
            Ok(timer) => Reply::line(format!(
                "Focus mode started for {}. I'll let you know when it's over.",
                format_duration(timer.duration_secs)
            )),
            Err(e) => Reply::line(format!("Failed to start focus mode: {}", e.user_message())),
        };
    }

    if lower.contains("habit stats") {
        return request(ctx, FeatureRequest::HabitStats);
    }

    let name = after(raw, &lower, "track habit").or_else(|| after(raw, &lower, "log habit"));
    match name {
        Some(name) => request(ctx, FeatureRequest::LogHabit { name: name.to_string() }),
        None => Reply::line("Which habit should I log?"),
    }
}

/// "<n> minute(s)" anywhere in the text
fn focus_minutes(lower: &str) -> Option<u64> {
    let words: Vec<&str> = lower.split_whitespace().collect();
    words.windows(2).find_map(|pair| {
        pair[1]
            .starts_with("minute")
            .then(|| pair[0].parse::<u64>().ok())
            .flatten()
            .filter(|n| *n > 0)
    })
}

fn dev_tools(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("git status") {
        return match ctx.services.system.run_shell("git status --porcelain") {
            Ok(output) if output.trim().is_empty() => Reply::line("Working tree is clean"),
            Ok(output) => {
                let summary: String = output.chars().take(100).collect();
                Reply::line(format!("Git status: {}", summary))
            }
            Err(e) => {
                tracing::debug!("git status failed: {}", e);
                Reply::line("Git error")
            }
        };
    }

    if contains_any(&lower, &["docker ps", "docker list"]) {
        return match ctx.services.system.run_shell("docker ps -q") {
            Ok(output) => {
                let running = output.lines().filter(|l| !l.trim().is_empty()).count();
                Reply::line(format!("{} running containers", running))
            }
            Err(e) => {
                tracing::debug!("docker ps failed: {}", e);
                Reply::line("Docker not available")
            }
        };
    }

    Reply::line("I can check 'git status' or 'docker ps'.")
}

fn home(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("light") {
        let device = if lower.contains("bedroom") {
            "bedroom_light"
        } else {
            "main_light"
        };
        return request(
            ctx,
            FeatureRequest::Light {
                device: device.to_string(),
                on: lower.contains("turn on"),
            },
        );
    }

    let command = ["home", "play", "pause", "up", "down"]
        .into_iter()
        .find(|command| lower.split_whitespace().any(|word| word == *command));
    match command {
        Some(command) => request(ctx, FeatureRequest::Roku { command: command.to_string() }),
        None => Reply::line("Roku commands: home, play, pause, up, down."),
    }
}

fn health(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("log water") {
        let millilitres = first_whole(&lower)
            .filter(|ml| *ml > 0)
            .unwrap_or(WATER_SERVING_ML);
        return request(ctx, FeatureRequest::LogWater { millilitres });
    }

    if lower.contains("log exercise") {
        let rest = after(&lower, &lower, "log exercise").unwrap_or_default();
        let words: Vec<&str> = rest.split_whitespace().collect();
        let entry = words.windows(2).find_map(|pair| {
            let minutes = pair[1].parse::<u32>().ok()?;
            pair[0]
                .chars()
                .all(|c| c.is_alphanumeric() || c == '_')
                .then(|| (pair[0].to_string(), minutes))
        });
        return match entry {
            Some((activity, minutes)) => {
                request(ctx, FeatureRequest::LogExercise { activity, minutes })
            }
            None => Reply::line("Use format: 'log exercise [activity] [minutes]'"),
        };
    }

    request(ctx, FeatureRequest::HealthSummary)
}

fn finance(ctx: &mut SessionContext, raw: &str) -> Reply {
    let lower = raw.to_ascii_lowercase();

    if lower.contains("add expense") {
        let Some(amount) = numbers(&lower).next().filter(|a| *a > 0.0) else {
            return Reply::line("How much did you spend? Try 'add expense 12.50 for food'.");
        };
        let category = if lower.contains("food") { "food" } else { "general" };
        return request(
            ctx,
            FeatureRequest::AddExpense {
                amount,
                category: category.to_string(),
            },
        );
    }

    if lower.contains("budget status") {
        return request(ctx, FeatureRequest::BudgetStatus);
    }

    let symbol = after(&lower, &lower, "stock price")
        .or_else(|| after(&lower, &lower, "price of"))
        .and_then(|rest| rest.trim_start_matches("of ").split_whitespace().next())
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()).to_uppercase())
        .filter(|symbol| !symbol.is_empty());
    match symbol {
        Some(symbol) => request(ctx, FeatureRequest::StockPrice { symbol }),
        None => Reply::line("Which stock symbol? Try 'stock price AAPL'."),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::core::config::AssistantConfig;
    use crate::core::error::{HeraldError, Result};
    use crate::services::{FeatureProvider, FeatureResponse, Services, SystemCapability};

    #[derive(Clone, Default)]
    struct Recorder(Arc<Mutex<Vec<FeatureRequest>>>);

    impl FeatureProvider for Recorder {
        fn handle(&self, request: &FeatureRequest) -> Result<FeatureResponse> {
            self.0.lock().unwrap().push(request.clone());
            Ok(FeatureResponse::new("ok"))
        }
    }

    struct FakeShell(std::result::Result<&'static str, &'static str>);

    impl SystemCapability for FakeShell {
        fn run_shell(&self, _command: &str) -> Result<String> {
            self.0
                .map(str::to_string)
                .map_err(|e| HeraldError::external("shell", e))
        }

        fn os_name(&self) -> String {
            "test".into()
        }
    }

    fn recording_ctx() -> (SessionContext, Recorder) {
        let recorder = Recorder::default();
        let ctx = SessionContext::in_memory(AssistantConfig::default()).with_services(Services {
            features: Box::new(recorder.clone()),
            ..Services::default()
        });
        (ctx, recorder)
    }

    fn dispatch(ctx: &mut SessionContext, raw: &str) -> Option<Reply> {
        let lower = raw.to_ascii_lowercase();
        keyword_handlers()
            .into_iter()
            .find(|band| (band.matches)(&lower))
            .map(|band| (band.handle)(ctx, raw))
    }

    fn last(recorder: &Recorder) -> FeatureRequest {
        recorder.0.lock().unwrap().last().cloned().unwrap()
    }

    #[test]
    fn test_media_requests() {
        let (mut ctx, rec) = recording_ctx();
        dispatch(&mut ctx, "set volume to 140").unwrap();
        assert_eq!(last(&rec), FeatureRequest::Volume(VolumeChange::Set(100)));

        dispatch(&mut ctx, "play lofi beats on YouTube").unwrap();
        assert_eq!(
            last(&rec),
            FeatureRequest::Play {
                service: Some(MediaService::YouTube),
                query: "lofi beats".into()
            }
        );

        dispatch(&mut ctx, "pause the music").unwrap();
        assert_eq!(last(&rec), FeatureRequest::PauseMedia);
    }

    #[test]
    fn test_translate_splits_on_last_to() {
        let (mut ctx, rec) = recording_ctx();
        dispatch(&mut ctx, "translate time to go to Spanish").unwrap();
        assert_eq!(
            last(&rec),
            FeatureRequest::Translate {
                text: "time to go".into(),
                language: "Spanish".into()
            }
        );
    }

    #[test]
    fn test_focus_mode_creates_timer() {
        let (mut ctx, _) = recording_ctx();
        let reply = dispatch(&mut ctx, "start focus mode for 50 minutes").unwrap();
        assert_eq!(
            reply.lines[0],
            "Focus mode started for 50 minutes. I'll let you know when it's over."
        );
        let active = ctx.scheduler.list_active();
        assert_eq!(active[0].timer.label, "Focus mode");

        dispatch(&mut ctx, "focus mode").unwrap();
        assert_eq!(ctx.scheduler.list_active()[1].timer.duration_secs, FOCUS_MINUTES * 60);
    }

    #[test]
    fn test_focus_mode_rejects_huge_durations() {
        let (mut ctx, _) = recording_ctx();
        for raw in [
            "start focus mode for 400000000000000000 minutes",
            "start focus mode for 300000000000000 minutes",
        ] {
            let reply = dispatch(&mut ctx, raw).unwrap();
            assert_eq!(
                reply.lines,
                vec!["Failed to start focus mode: That timer is too long.".to_string()]
            );
        }
        assert!(ctx.scheduler.list_active().is_empty());
    }

    #[test]
    fn test_dev_tools_use_shell() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default()).with_services(Services {
            system: Box::new(FakeShell(Ok(""))),
            ..Services::default()
        });
        assert_eq!(dispatch(&mut ctx, "git status").unwrap().lines[0], "Working tree is clean");

        ctx.services.system = Box::new(FakeShell(Ok("abc123\ndef456")));
        assert_eq!(dispatch(&mut ctx, "docker ps").unwrap().lines[0], "2 running containers");

        ctx.services.system = Box::new(FakeShell(Err("not found")));
        assert_eq!(dispatch(&mut ctx, "docker ps").unwrap().lines[0], "Docker not available");
        assert_eq!(dispatch(&mut ctx, "git status").unwrap().lines[0], "Git error");
    }

    #[test]
    fn test_home_health_finance() {
        let (mut ctx, rec) = recording_ctx();
        dispatch(&mut ctx, "turn off the bedroom lights").unwrap();
        assert_eq!(
            last(&rec),
            FeatureRequest::Light {
                device: "bedroom_light".into(),
                on: false
            }
        );

        dispatch(&mut ctx, "log water").unwrap();
        assert_eq!(last(&rec), FeatureRequest::LogWater { millilitres: 250 });

        dispatch(&mut ctx, "log exercise running 30 minutes").unwrap();
        assert_eq!(
            last(&rec),
            FeatureRequest::LogExercise {
                activity: "running".into(),
                minutes: 30
            }
        );

        dispatch(&mut ctx, "add expense $12.50 for food").unwrap();
        assert_eq!(
            last(&rec),
            FeatureRequest::AddExpense {
                amount: 12.5,
                category: "food".into()
            }
        );

        dispatch(&mut ctx, "stock price aapl").unwrap();
        assert_eq!(last(&rec), FeatureRequest::StockPrice { symbol: "AAPL".into() });
    }

    #[test]
    fn test_offline_provider_error_is_reported() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        let reply = dispatch(&mut ctx, "budget status").unwrap();
        assert_eq!(reply.lines, vec!["finance: no provider is configured".to_string()]);
    }

    #[test]
    fn test_unrelated_text_has_no_band() {
        let mut ctx = SessionContext::in_memory(AssistantConfig::default());
        assert!(dispatch(&mut ctx, "the quick brown fox").is_none());
    }
}
