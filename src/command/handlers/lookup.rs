//! Provider lookups: location, system, news, markets and web utilities
//!
//! Each handler pulls what it needs out of the raw text and hands a typed
//! [`FeatureRequest`] to the provider. Text that lacks the URL, username or
//! currency pair a request needs is answered with the expected form.

use crate::command::parsed::ParsedCommand;
use crate::command::reply::Reply;
use crate::core::error::{HeraldError, Result};
use crate::services::FeatureRequest;
use crate::session::SessionContext;

const DEFAULT_COIN: &str = "bitcoin";

/// Spoken coin names and tickers, with the name providers expect
const COINS: [(&str, &str); 9] = [
    ("bitcoin", "bitcoin"),
    ("ethereum", "ethereum"),
    ("dogecoin", "dogecoin"),
    ("litecoin", "litecoin"),
    ("cardano", "cardano"),
    ("ripple", "ripple"),
    ("btc", "bitcoin"),
    ("eth", "ethereum"),
    ("doge", "dogecoin"),
];

const GITHUB_MARKERS: [&str; 3] = ["github user", "github profile", "github"];
const GITHUB_FILLER: [&str; 4] = ["info", "for", "named", "called"];

/// Send `request` and turn the answer (or failure) into reply lines
fn ask(ctx: &SessionContext, request: FeatureRequest, failure: &str) -> Reply {
    match ctx.services.features.handle(&request) {
        Ok(response) => {
            let mut reply = Reply::new(response.text.lines().map(str::to_string).collect());
            if let Some(source) = response.source {
                reply.push(format!("Source: {}", source));
            }
            reply
        }
        Err(e) => Reply::line(format!("{}: {}", failure, e.user_message())),
    }
}

/// Like [`ask`], for requests extracted from text that may not parse
fn ask_parsed(request: Result<FeatureRequest>, ctx: &SessionContext, failure: &str) -> Reply {
    match request {
        Ok(request) => ask(ctx, request, failure),
        Err(e) => Reply::line(e.user_message()),
    }
}

fn trim_punctuation(token: &str) -> &str {
    token.trim_matches(|c: char| matches!(c, ',' | ';' | '!' | '?' | '"' | '\'' | '(' | ')' | '<' | '>'))
        .trim_end_matches('.')
}

/// First `http://` or `https://` URL in the text
pub fn find_url(raw: &str) -> Option<&str> {
    raw.split_whitespace().map(trim_punctuation).find(|token| {
        let lower = token.to_ascii_lowercase();
        ["http://", "https://"]
            .iter()
            .any(|scheme| lower.starts_with(scheme) && lower.len() > scheme.len())
    })
}

/// A URL, or a bare host name such as `example.com`
pub fn find_website(raw: &str) -> Option<&str> {
    find_url(raw).or_else(|| {
        raw.split_whitespace().map(trim_punctuation).find(|token| {
            let mut labels = token.split('.');
            let all_labels_ok = labels.clone().count() >= 2
                && labels.all(|label| {
                    !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
                });
            all_labels_ok && token.chars().any(|c| c.is_ascii_alphabetic())
        })
    })
}

fn shorten_request(raw: &str) -> Result<FeatureRequest> {
    find_url(raw)
        .map(|url| FeatureRequest::ShortenUrl { url: url.to_string() })
        .ok_or_else(|| {
            HeraldError::Parse(
                "Please provide a URL to shorten, like 'shorten https://example.com/long/path'.".into(),
            )
        })
}

fn website_request(raw: &str) -> Result<FeatureRequest> {
    find_website(raw)
        .map(|url| FeatureRequest::WebsiteStatus { url: url.to_string() })
        .ok_or_else(|| {
            HeraldError::Parse("Which website should I check? Try 'check website example.com'.".into())
        })
}

/// GitHub logins: 1-39 ASCII letters, digits or inner hyphens
fn is_github_login(name: &str) -> bool {
    (1..=39).contains(&name.len())
        && !name.starts_with('-')
        && !name.ends_with('-')
        && name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
}

fn github_request(raw: &str) -> Result<FeatureRequest> {
    let lower = raw.to_ascii_lowercase();
    let rest = GITHUB_MARKERS
        .iter()
        .find_map(|marker| lower.find(marker).map(|at| &raw[at + marker.len()..]))
        .unwrap_or_default();

    rest.split_whitespace()
        .map(trim_punctuation)
        .map(|word| word.trim_start_matches('@'))
        .find(|word| !GITHUB_FILLER.contains(&word.to_ascii_lowercase().as_str()))
        .filter(|word| is_github_login(word))
        .map(|username| FeatureRequest::GithubUser {
            username: username.to_string(),
        })
        .ok_or_else(|| HeraldError::Parse("Which GitHub user? Try 'github user octocat'.".into()))
}

fn currency_code(word: &str) -> Option<String> {
    let word = trim_punctuation(word);
    (word.len() == 3 && word.chars().all(|c| c.is_ascii_alphabetic()))
        .then(|| word.to_ascii_uppercase())
}

/// "<amount> <from> to|in|into <to>" anywhere in the text
fn currency_request(raw: &str) -> Result<FeatureRequest> {
    let words: Vec<&str> = raw.split_whitespace().collect();
    words
        .windows(4)
        .find_map(|w| {
            let amount = w[0].trim_start_matches('$').replace(',', "").parse::<f64>().ok()?;
            if !amount.is_finite() || amount < 0.0 {
                return None;
            }
            let from = currency_code(w[1])?;
            if !matches!(w[2].to_ascii_lowercase().as_str(), "to" | "in" | "into") {
                return None;
            }
            let to = currency_code(w[3])?;
            Some(FeatureRequest::CurrencyConvert { amount, from, to })
        })
        .ok_or_else(|| {
            HeraldError::Parse(
                "Use format: 'convert [amount] [from] to [to]', for example 'convert 100 USD to EUR'."
                    .into(),
            )
        })
}

fn coin(raw: &str) -> &'static str {
    let lower = raw.to_ascii_lowercase();
    let words: Vec<&str> = lower.split(|c: char| !c.is_ascii_alphanumeric()).collect();
    COINS
        .iter()
        .find(|(spoken, _)| words.contains(spoken))
        .map_or(DEFAULT_COIN, |(_, name)| *name)
}

fn news_topic(raw: &str) -> Option<String> {
    let lower = raw.to_ascii_lowercase();
    if lower.split_whitespace().any(|w| w == "tech" || w == "technology") {
        return Some("technology".into());
    }
    ["news about", "news on", "headlines about", "headlines on"]
        .iter()
        .find_map(|marker| lower.find(marker).map(|at| raw[at + marker.len()..].trim()))
        .filter(|topic| !topic.is_empty())
        .map(str::to_string)
}

pub fn location(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    ask(ctx, FeatureRequest::Location, "Unable to determine location")
}

pub fn timezone(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    ask(ctx, FeatureRequest::Timezone, "Unable to determine timezone information")
}

pub fn system_info(ctx: &mut SessionContext, _cmd: &ParsedCommand) -> Reply {
    let mut reply = Reply::line(format!("Operating system: {}", ctx.services.system.os_name()));
    match ctx.services.features.handle(&FeatureRequest::SystemInfo) {
        Ok(response) => reply.lines.extend(response.text.lines().map(str::to_string)),
        Err(e) => tracing::debug!("System details unavailable: {}", e),
    }
    reply
}

pub fn news(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let topic = news_topic(&cmd.raw);
    ask(ctx, FeatureRequest::News { topic }, "Failed to get news")
}

pub fn crypto_price(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    let request = FeatureRequest::CryptoPrice {
        coin: coin(&cmd.raw).to_string(),
    };
    ask(ctx, request, "Unable to get cryptocurrency price")
}

pub fn currency_convert(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    ask_parsed(currency_request(&cmd.raw), ctx, "Currency conversion failed")
}

pub fn github_user(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    ask_parsed(github_request(&cmd.raw), ctx, "Unable to look up that user")
}

pub fn shorten_url(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    ask_parsed(shorten_request(&cmd.raw), ctx, "Failed to shorten URL")
}

pub fn website_status(ctx: &mut SessionContext, cmd: &ParsedCommand) -> Reply {
    ask_parsed(website_request(&cmd.raw), ctx, "Unable to check website")
}
