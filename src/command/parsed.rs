//! Classifier output: intent tag, entities and confidence

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

/// Closed set of intent tags the classifier may assign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[non_exhaustive]
pub enum Intent {
    Greeting,
    Farewell,
    ThankYou,
    Help,
    Status,
    Time,
    Date,
    Identity,
    UserIdentity,
    UserNameSet,
    Capabilities,
    Weather,
    WebSearch,
    Question,
    Calculation,
    Location,
    Timezone,
    SystemInfo,
    News,
    CryptoPrice,
    CurrencyConvert,
    GithubUser,
    ShortenUrl,
    WebsiteStatus,
    SetTimer,
    SetReminder,
    ListTimers,
    ListReminders,
    CancelTimer,
    CancelReminder,
    CustomCommandAdd,
    CustomCommandList,
    CustomCommandRemove,
    MoreInfo,
    ListPlugins,
    LoadPlugin,
    PluginCommand,
    Unknown,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Greeting => "greeting",
            Self::Farewell => "farewell",
            Self::ThankYou => "thank_you",
            Self::Help => "help",
            Self::Status => "status",
            Self::Time => "time",
            Self::Date => "date",
            Self::Identity => "identity",
            Self::UserIdentity => "user_identity",
            Self::UserNameSet => "user_name_set",
            Self::Capabilities => "capabilities",
            Self::Weather => "weather",
            Self::WebSearch => "web_search",
            Self::Question => "question",
            Self::Calculation => "calculation",
            Self::Location => "location",
            Self::Timezone => "timezone",
            Self::SystemInfo => "system_info",
            Self::News => "news",
            Self::CryptoPrice => "crypto_price",
            Self::CurrencyConvert => "currency_convert",
            Self::GithubUser => "github_user",
            Self::ShortenUrl => "shorten_url",
            Self::WebsiteStatus => "website_status",
            Self::SetTimer => "set_timer",
            Self::SetReminder => "set_reminder",
            Self::ListTimers => "list_timers",
            Self::ListReminders => "list_reminders",
            Self::CancelTimer => "cancel_timer",
            Self::CancelReminder => "cancel_reminder",
            Self::CustomCommandAdd => "custom_command_add",
            Self::CustomCommandList => "custom_command_list",
            Self::CustomCommandRemove => "custom_command_remove",
            Self::MoreInfo => "more_info",
            Self::ListPlugins => "list_plugins",
            Self::LoadPlugin => "load_plugin",
            Self::PluginCommand => "plugin_command",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One classified input
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedCommand {
    pub raw: String,
    pub intent: Intent,
    pub entities: AHashMap<String, String>,
    confidence: f32,
}

impl ParsedCommand {
    /// Confidence is clamped into [0, 1]; NaN becomes 0
    pub fn new(raw: &str, intent: Intent, confidence: f32) -> Self {
        let confidence = if confidence.is_nan() {
            0.0
        } else {
            confidence.clamp(0.0, 1.0)
        };
        Self {
            raw: raw.to_string(),
            intent,
            entities: AHashMap::new(),
            confidence,
        }
    }

    pub fn unknown(raw: &str, confidence: f32) -> Self {
        Self::new(raw, Intent::Unknown, confidence)
    }

    pub fn with_entity(mut self, key: &str, value: impl Into<String>) -> Self {
        let value = value.into();
        if !value.trim().is_empty() {
            self.entities.insert(key.to_string(), value.trim().to_string());
        }
        self
    }

    pub fn entity(&self, key: &str) -> Option<&str> {
        self.entities.get(key).map(String::as_str)
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_confidence_clamped() {
        assert_eq!(ParsedCommand::new("x", Intent::Help, 1.7).confidence(), 1.0);
        assert_eq!(ParsedCommand::new("x", Intent::Help, -0.2).confidence(), 0.0);
        assert_eq!(ParsedCommand::new("x", Intent::Help, f32::NAN).confidence(), 0.0);
    }

    #[test]
    fn test_intent_serializes_as_tag() {
        assert_eq!(serde_json::to_string(&Intent::SetTimer).unwrap(), "\"set_timer\"");
        let intent: Intent = serde_json::from_str("\"custom_command_add\"").unwrap();
        assert_eq!(intent, Intent::CustomCommandAdd);
        assert_eq!(Intent::ThankYou.as_str(), "thank_you");
        assert_eq!(
            serde_json::to_string(&Intent::CurrencyConvert).unwrap(),
            format!("\"{}\"", Intent::CurrencyConvert.as_str())
        );
    }

    #[test]
    fn test_blank_entities_dropped() {
        let parsed = ParsedCommand::new("weather", Intent::Weather, 0.9)
            .with_entity("location", "  ")
            .with_entity("unit", " celsius ");
        assert_eq!(parsed.entity("location"), None);
        assert_eq!(parsed.entity("unit"), Some("celsius"));
    }
}
