//! User-defined trigger phrases
//!
//! Rules are checked against the raw input before classification, so a
//! custom trigger can shadow any built-in command.

use std::fs;
use std::path::PathBuf;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::core::error::{HeraldError, Result};
use crate::core::types::Timestamp;
use crate::services::SystemCapability;

/// Usage hint shown when a definition cannot be parsed
pub const CUSTOM_COMMAND_HINT: &str = "Try: 'when I say [trigger], run [command]'";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum CommandAction {
    Shell(String),
    Text(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomCommandRule {
    pub trigger: String,
    pub action: CommandAction,
    #[serde(default)]
    pub description: String,
    pub created_at: Timestamp,
}

impl CustomCommandRule {
    pub fn new(trigger: &str, action: CommandAction) -> Self {
        let description = match &action {
            CommandAction::Shell(command) => format!("Runs '{}'", command),
            CommandAction::Text(text) => format!("Says '{}'", text),
        };
        Self {
            trigger: normalize_trigger(trigger),
            action,
            description,
            created_at: Local::now(),
        }
    }
}

/// Outcome of running a rule
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionResult {
    pub success: bool,
    pub response: Option<String>,
    pub output: Option<String>,
    pub error: Option<String>,
}

impl ExecutionResult {
    pub fn lines(&self) -> Vec<String> {
        if !self.success {
            let error = self.error.as_deref().unwrap_or("Unknown error");
            return vec![format!("Error executing custom command: {}", error)];
        }
        self.response
            .iter()
            .chain(self.output.iter())
            .cloned()
            .collect()
    }
}

/// Lowercase, trimmed, without surrounding quotes or trailing punctuation
pub fn normalize_trigger(text: &str) -> String {
    text.trim()
        .trim_end_matches(|c: char| matches!(c, '.' | '!' | '?' | ',' | ';'))
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim()
        .to_lowercase()
}

/// Split "when I say <trigger>, run|say <action>" into its parts
fn parse_definition(text: &str) -> Result<(String, CommandAction)> {
    let invalid = || HeraldError::Parse(format!("I couldn't read that command definition. {}", CUSTOM_COMMAND_HINT));

    let text = text.trim();
    // ASCII lowercasing keeps byte offsets aligned with the original text
    let lower = text.to_ascii_lowercase();
    let rest_start = lower.find("when i say").ok_or_else(invalid)? + "when i say".len();
    let lower_rest = &lower[rest_start..];
    let rest = &text[rest_start..];

    const SEPARATORS: [(&str, bool); 4] = [
        (", run ", true),
        (", say ", false),
        (" run ", true),
        (" say ", false),
    ];
    let (at, separator, is_shell) = SEPARATORS
        .iter()
        .filter_map(|(sep, shell)| lower_rest.find(sep).map(|at| (at, *sep, *shell)))
        .min_by_key(|(at, sep, _)| (*at, usize::MAX - sep.len()))
        .ok_or_else(invalid)?;

    let trigger = normalize_trigger(&rest[..at]);
    let body = rest[at + separator.len()..]
        .trim()
        .trim_matches(|c: char| c == '"' || c == '\'')
        .trim();
    if trigger.is_empty() || body.is_empty() {
        return Err(invalid());
    }

    let action = if is_shell {
        CommandAction::Shell(body.to_string())
    } else {
        CommandAction::Text(body.to_string())
    };
    Ok((trigger, action))
}

/// Ordered rule list, persisted as JSON when a path is set
#[derive(Debug, Clone, Default)]
pub struct CustomCommandStore {
    rules: Vec<CustomCommandRule>,
    path: Option<PathBuf>,
}

impl CustomCommandStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open the store at `path`, starting empty if the file does not exist
    pub fn load(path: PathBuf) -> Result<Self> {
        let rules = if path.exists() {
            serde_json::from_str(&fs::read_to_string(&path)?)?
        } else {
            Vec::new()
        };
        Ok(Self {
            rules,
            path: Some(path),
        })
    }

    pub fn match_command(&self, text: &str) -> Option<&CustomCommandRule> {
        let key = normalize_trigger(text);
        if key.is_empty() {
            return None;
        }
        self.rules.iter().find(|rule| rule.trigger == key)
    }

    pub fn execute(&self, rule: &CustomCommandRule, system: &dyn SystemCapability) -> ExecutionResult {
        match &rule.action {
            CommandAction::Text(text) => ExecutionResult {
                success: true,
                response: Some(text.clone()),
                ..ExecutionResult::default()
            },
            CommandAction::Shell(command) => match system.run_shell(command) {
                Ok(output) => ExecutionResult {
                    success: true,
                    response: Some(format!("Executing: {}", command)),
                    output: (!output.is_empty()).then_some(output),
                    error: None,
                },
                Err(e) => ExecutionResult {
                    success: false,
                    error: Some(e.user_message()),
                    ..ExecutionResult::default()
                },
            },
        }
    }

    /// Parse a spoken definition and store the resulting rule
    pub fn create_from_phrase(&mut self, text: &str) -> Result<CustomCommandRule> {
        let (trigger, action) = parse_definition(text)?;
        let rule = CustomCommandRule::new(&trigger, action);
        self.add(rule.clone())?;
        Ok(rule)
    }

    pub fn add(&mut self, rule: CustomCommandRule) -> Result<()> {
        if self.rules.iter().any(|r| r.trigger == rule.trigger) {
            return Err(HeraldError::Validation(format!(
                "A custom command for '{}' already exists.",
                rule.trigger
            )));
        }
        info!("Custom command added: {}", rule.trigger);
        self.rules.push(rule);
        self.persist();
        Ok(())
    }

    /// Remove the rule for `trigger`, returning it if one existed
    pub fn remove(&mut self, trigger: &str) -> Option<CustomCommandRule> {
        let key = normalize_trigger(trigger);
        let index = self.rules.iter().position(|r| r.trigger == key)?;
        let rule = self.rules.remove(index);
        info!("Custom command removed: {}", rule.trigger);
        self.persist();
        Some(rule)
    }

    pub fn list(&self) -> &[CustomCommandRule] {
        &self.rules
    }

    fn persist(&self) {
        let Some(path) = &self.path else {
            return;
        };
        let result = serde_json::to_string_pretty(&self.rules)
            .map_err(HeraldError::from)
            .and_then(|json| {
                if let Some(dir) = path.parent() {
                    fs::create_dir_all(dir)?;
                }
                fs::write(path, json).map_err(HeraldError::from)
            });
        if let Err(e) = result {
            warn!("Failed to save custom commands: {}", e);
        }
    }
}
