//! Free text to intent classification
//!
//! [`Classifier`] is the seam for any external intent model. The bundled
//! [`PatternClassifier`] is a deterministic ordered phrase table: the first
//! matching rule wins, and each intent pulls its entities from the text.

use crate::command::math::looks_like_math;
use crate::command::parsed::{Intent, ParsedCommand};

pub trait Classifier {
    fn classify(&self, text: &str) -> ParsedCommand;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MatchKind {
    /// Whole normalized input equals the phrase
    Exact,
    /// Input starts with the phrase at a word boundary
    Prefix,
    /// Phrase appears anywhere at word boundaries
    Phrase,
}

struct Rule {
    intent: Intent,
    kind: MatchKind,
    phrases: &'static [&'static str],
    confidence: f32,
}

const fn rule(
    intent: Intent,
    kind: MatchKind,
    phrases: &'static [&'static str],
    confidence: f32,
) -> Rule {
    Rule {
        intent,
        kind,
        phrases,
        confidence,
    }
}

use MatchKind::{Exact, Phrase, Prefix};

/// Ordered rule table; earlier rules shadow later ones
const RULES: &[Rule] = &[
    rule(Intent::MoreInfo, Phrase, &["tell me more", "more information", "more info", "keep going", "go on"], 0.95),
    rule(Intent::MoreInfo, Exact, &["continue", "more"], 0.95),
    rule(Intent::CustomCommandAdd, Prefix, &["when i say"], 0.95),
    rule(Intent::CustomCommandRemove, Prefix, &["remove custom command", "delete custom command", "remove command", "delete command", "forget command"], 0.9),
    rule(Intent::CustomCommandList, Phrase, &["list commands", "list custom commands", "list my commands", "show commands", "show my commands", "my commands", "custom commands"], 0.9),
    rule(Intent::UserNameSet, Prefix, &["my name is", "call me"], 0.95),
    rule(Intent::UserIdentity, Phrase, &["who am i", "what is my name", "what's my name", "whats my name", "do you know my name", "do you know who i am"], 0.9),
    rule(Intent::Identity, Phrase, &["who are you", "what are you", "your name", "introduce yourself"], 0.9),
    rule(Intent::Capabilities, Phrase, &["what can you do", "what are you capable of", "your capabilities", "capabilities"], 0.9),
    rule(Intent::CancelTimer, Prefix, &["cancel the timer", "cancel timer", "stop the timer", "stop timer", "delete timer"], 0.9),
    rule(Intent::CancelReminder, Prefix, &["cancel the reminder", "cancel reminder", "delete the reminder", "delete reminder", "remove the reminder", "remove reminder"], 0.9),
    rule(Intent::ListTimers, Phrase, &["list timers", "list my timers", "show timers", "show my timers", "active timers", "my timers", "any timers"], 0.9),
    rule(Intent::ListReminders, Phrase, &["list reminders", "list my reminders", "show reminders", "show my reminders", "upcoming reminders", "my reminders", "any reminders"], 0.9),
    rule(Intent::SetTimer, Phrase, &["set timer", "set a timer", "start a timer", "start timer", "timer for"], 0.9),
    rule(Intent::SetReminder, Phrase, &["remind me", "set reminder", "set a reminder", "reminder to"], 0.9),
    rule(Intent::ListPlugins, Phrase, &["list plugins", "show plugins", "loaded plugins", "my plugins"], 0.9),
    rule(Intent::LoadPlugin, Prefix, &["load plugin"], 0.9),
    rule(Intent::PluginCommand, Prefix, &["plugin"], 0.85),
    rule(Intent::Farewell, Prefix, &["goodbye", "good bye", "bye"], 0.95),
    rule(Intent::Farewell, Exact, &["exit", "quit", "see you later", "good night", "shut down", "shutdown", "power down"], 0.95),
    rule(Intent::Greeting, Prefix, &["hello", "hi", "hey", "greetings", "good morning", "good afternoon", "good evening", "howdy"], 0.9),
    rule(Intent::ThankYou, Phrase, &["thank you", "thanks", "thx", "appreciate it", "much appreciated"], 0.9),
    rule(Intent::Help, Prefix, &["help"], 0.9),
    rule(Intent::Help, Phrase, &["what commands", "show help", "available commands"], 0.9),
    rule(Intent::SystemInfo, Phrase, &["system info", "system information", "system specs", "computer info", "hardware info"], 0.9),
    rule(Intent::Status, Exact, &["status", "report", "status report", "system status", "give me a status report", "give me a report"], 0.9),
    rule(Intent::Timezone, Phrase, &["timezone", "time zone"], 0.9),
    rule(Intent::Time, Phrase, &["what time", "the time", "current time", "time is it", "time now"], 0.9),
    rule(Intent::Date, Phrase, &["what date", "what day", "today's date", "todays date", "the date", "what is today"], 0.9),
    rule(Intent::Weather, Phrase, &["weather", "forecast", "temperature outside"], 0.9),
    rule(Intent::Location, Phrase, &["where am i", "my location", "current location", "locate me"], 0.9),
    rule(Intent::ShortenUrl, Prefix, &["shorten"], 0.9),
    rule(Intent::ShortenUrl, Phrase, &["shorten url", "shorten link", "short url"], 0.9),
    rule(Intent::WebsiteStatus, Phrase, &["check website", "check site", "website status", "site status", "website up", "website down"], 0.9),
    rule(Intent::GithubUser, Phrase, &["github user", "github profile"], 0.9),
    rule(Intent::GithubUser, Prefix, &["github"], 0.85),
    rule(Intent::CryptoPrice, Phrase, &["crypto price", "cryptocurrency price", "bitcoin price", "price of bitcoin", "ethereum price", "price of ethereum", "dogecoin price", "btc price", "eth price"], 0.9),
    rule(Intent::CurrencyConvert, Prefix, &["convert"], 0.85),
    rule(Intent::CurrencyConvert, Phrase, &["currency conversion", "exchange rate"], 0.85),
    rule(Intent::WebSearch, Prefix, &["search the web for", "search for", "look up", "google", "search"], 0.9),
    rule(Intent::News, Phrase, &["news", "headlines"], 0.9),
    rule(Intent::Calculation, Prefix, &["calculate", "compute"], 0.85),
    rule(Intent::Question, Prefix, &["tell me about", "explain", "define", "describe", "who", "what", "where", "when", "why", "how", "which"], 0.7),
];

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '\''
}

/// Byte offset of `phrase` in `text` where it is bounded by non-word chars
fn find_phrase(text: &str, phrase: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(found) = text[from..].find(phrase) {
        let start = from + found;
        let end = start + phrase.len();
        let before_ok = text[..start].chars().next_back().map_or(true, |c| !is_word_char(c));
        let after_ok = text[end..].chars().next().map_or(true, |c| !is_word_char(c));
        if before_ok && after_ok {
            return Some(start);
        }
        from = start + phrase.chars().next().map_or(1, char::len_utf8);
    }
    None
}

fn matches_rule(lower: &str, kind: MatchKind, phrase: &str) -> bool {
    match kind {
        Exact => lower == phrase,
        Prefix => find_phrase(lower, phrase) == Some(0),
        Phrase => find_phrase(lower, phrase).is_some(),
    }
}

/// Original-case text following `phrase`, if it occurs
fn text_after<'a>(clean: &'a str, lower: &str, phrase: &str) -> Option<&'a str> {
    let at = find_phrase(lower, phrase)?;
    Some(clean[at + phrase.len()..].trim())
}

/// Deterministic phrase-table classifier
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternClassifier;

impl PatternClassifier {
    fn extract(&self, rule: &Rule, phrase: &str, clean: &str, lower: &str) -> ParsedCommand {
        let parsed = ParsedCommand::new(clean, rule.intent, rule.confidence);
        let after = text_after(clean, lower, phrase).unwrap_or_default();
        match rule.intent {
            Intent::UserNameSet => parsed.with_entity("name", after),
            Intent::CustomCommandRemove => parsed.with_entity("trigger", after),
            Intent::CancelTimer | Intent::CancelReminder => parsed.with_entity("target", after),
            Intent::LoadPlugin => parsed.with_entity("plugin_name", after),
            Intent::WebSearch => parsed.with_entity("query", after),
            Intent::Weather => {
                let location = text_after(clean, lower, "in").or_else(|| text_after(clean, lower, "for"));
                match location {
                    Some(location) => parsed.with_entity("location", location),
                    None => parsed,
                }
            }
            _ => parsed,
        }
    }
}

impl Classifier for PatternClassifier {
    fn classify(&self, text: &str) -> ParsedCommand {
        let clean = text
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?'))
            .to_string();
        // ASCII lowercasing keeps byte offsets shared with `clean`
        let lower = clean.to_ascii_lowercase();

        if lower.is_empty() {
            return ParsedCommand::unknown(&clean, 0.0);
        }

        for rule in RULES {
            if rule.intent == Intent::Question && looks_like_math(&lower) {
                return ParsedCommand::new(&clean, Intent::Calculation, 0.85);
            }
            if let Some(phrase) = rule
                .phrases
                .iter()
                .find(|phrase| matches_rule(&lower, rule.kind, phrase))
            {
                return self.extract(rule, phrase, &clean, &lower);
            }
        }

        if looks_like_math(&lower) {
            return ParsedCommand::new(&clean, Intent::Calculation, 0.85);
        }

        let confidence = if lower.split_whitespace().count() < 3 {
            0.2
        } else {
            0.4
        };
        ParsedCommand::unknown(&clean, confidence)
    }
}
