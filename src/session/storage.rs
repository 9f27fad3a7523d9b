//! On-disk documents in the data directory
//!
//! - `config.toml`: `AssistantConfig`
//! - `memory.json`: conversation log, preferences, learned commands, counter
//! - `reminders.json`: owned by the scheduler
//! - `custom_commands.json`: owned by the custom command store

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::config::AssistantConfig;
use crate::core::error::Result;
use crate::session::memory::{ConversationMemory, ConversationRecord};
use crate::session::profile::UserProfile;

/// Persisted form of the memory record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MemoryDocument {
    pub conversations: Vec<ConversationRecord>,
    pub user_preferences: UserProfile,
    pub learned_commands: BTreeMap<String, String>,
    pub interaction_count: u64,
}

impl MemoryDocument {
    pub fn capture(profile: &UserProfile, memory: &ConversationMemory) -> Self {
        Self {
            conversations: memory.records().cloned().collect(),
            user_preferences: profile.clone(),
            learned_commands: memory.learned_commands.clone(),
            interaction_count: memory.interaction_count,
        }
    }

    pub fn into_parts(self) -> (UserProfile, ConversationMemory) {
        let memory = ConversationMemory::restore(
            self.conversations,
            self.interaction_count,
            self.learned_commands,
        );
        (self.user_preferences, memory)
    }
}

/// Paths of every persisted document
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// `$HERALD_HOME`, else `~/.herald`, else `./.herald`
    pub fn default_dir() -> PathBuf {
        if let Ok(dir) = std::env::var("HERALD_HOME") {
            return PathBuf::from(dir);
        }
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".herald")
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn config_path(&self) -> PathBuf {
        self.dir.join("config.toml")
    }

    pub fn memory_path(&self) -> PathBuf {
        self.dir.join("memory.json")
    }

    pub fn reminders_path(&self) -> PathBuf {
        self.dir.join("reminders.json")
    }

    pub fn custom_commands_path(&self) -> PathBuf {
        self.dir.join("custom_commands.json")
    }

    pub fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)?;
        Ok(())
    }

    /// Stored config, or defaults when the file does not exist yet
    pub fn load_config(&self) -> Result<AssistantConfig> {
        let path = self.config_path();
        if !path.exists() {
            return Ok(AssistantConfig::default());
        }
        let content = fs::read_to_string(&path)?;
        Ok(toml::from_str(&content)?)
    }

    pub fn save_config(&self, config: &AssistantConfig) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.config_path(), toml::to_string_pretty(config)?)?;
        Ok(())
    }

    /// Stored memory record with the user name sanitized
    ///
    /// A name the content filter rejects is blanked and the cleaned record
    /// is written back immediately.
    pub fn load_memory(&self) -> Result<MemoryDocument> {
        let path = self.memory_path();
        if !path.exists() {
            return Ok(MemoryDocument::default());
        }
        let content = fs::read_to_string(&path)?;
        let mut document: MemoryDocument = serde_json::from_str(&content)?;
        if document.user_preferences.sanitize() {
            info!("Cleared a stored user name rejected by the content filter");
            self.save_memory(&document)?;
        }
        Ok(document)
    }

    pub fn save_memory(&self, document: &MemoryDocument) -> Result<()> {
        self.ensure_dir()?;
        fs::write(self.memory_path(), serde_json::to_string_pretty(document)?)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_files_give_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        assert_eq!(storage.load_config().unwrap(), AssistantConfig::default());
        let memory = storage.load_memory().unwrap();
        assert!(memory.conversations.is_empty());
        assert_eq!(memory.interaction_count, 0);
    }

    #[test]
    fn test_config_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path().join("nested"));
        let mut config = AssistantConfig::default();
        config.wake_word = "jarvis".into();
        config.generative.enabled = false;
        storage.save_config(&config).unwrap();
        assert_eq!(storage.load_config().unwrap(), config);
    }

    #[test]
    fn test_offensive_stored_name_is_cleared_and_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(dir.path());
        fs::write(
            storage.memory_path(),
            r#"{"conversations": [], "user_preferences": {"name": "fu(k"}, "learned_commands": {}, "interaction_count": 4}"#,
        )
        .unwrap();

        let document = storage.load_memory().unwrap();
        assert!(document.user_preferences.name.is_empty());
        assert_eq!(document.interaction_count, 4);

        let on_disk = fs::read_to_string(storage.memory_path()).unwrap();
        assert!(!on_disk.contains("fu(k"));
    }
}
