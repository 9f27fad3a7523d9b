//! Process-lifetime state passed to every handler

use tracing::{info, warn};

use crate::command::custom::CustomCommandStore;
use crate::core::config::AssistantConfig;
use crate::core::error::Result;
use crate::llm::PromptContext;
use crate::scheduler::{Scheduler, SchedulerEvent};
use crate::services::Services;
use crate::session::memory::{ConversationMemory, ConversationRecord};
use crate::session::profile::{system_user_name, UserProfile};
use crate::session::storage::{MemoryDocument, Storage};

/// Everything a command handler may read or mutate
#[derive(Debug)]
pub struct SessionContext {
    pub config: AssistantConfig,
    pub profile: UserProfile,
    pub memory: ConversationMemory,
    pub scheduler: Scheduler,
    pub custom_commands: CustomCommandStore,
    pub services: Services,
    storage: Option<Storage>,
}

impl SessionContext {
    /// Session with nothing read from or written to disk
    pub fn in_memory(config: AssistantConfig) -> Self {
        Self {
            config,
            profile: UserProfile::default(),
            memory: ConversationMemory::new(),
            scheduler: Scheduler::new(),
            custom_commands: CustomCommandStore::new(),
            services: Services::default(),
            storage: None,
        }
    }

    /// Load every persisted document from the data directory
    pub fn open(storage: Storage) -> Result<Self> {
        storage.ensure_dir()?;
        let config = storage.load_config()?;
        if let Err(problem) = config.validate() {
            warn!("Config problem in {}: {}", storage.config_path().display(), problem);
        }
        let (profile, memory) = storage.load_memory()?.into_parts();
        let scheduler = Scheduler::with_store(storage.reminders_path())?;
        let custom_commands = CustomCommandStore::load(storage.custom_commands_path())?;
        info!(
            "Session loaded from {} ({} past interactions)",
            storage.dir().display(),
            memory.interaction_count
        );

        Ok(Self {
            config,
            profile,
            memory,
            scheduler,
            custom_commands,
            services: Services::default(),
            storage: Some(storage),
        })
    }

    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Stored display name, else the OS login name
    pub fn user_name(&self) -> String {
        self.profile
            .display_name()
            .map(str::to_string)
            .unwrap_or_else(system_user_name)
    }

    pub fn prompt_context(&self) -> PromptContext {
        let mut context = PromptContext::new(
            self.config.assistant_name.clone(),
            self.services.system.os_name(),
        )
        .with_user(self.profile.display_name());
        let skip = self.memory.len().saturating_sub(PromptContext::RECENT_LIMIT);
        for record in self.memory.records().skip(skip) {
            context.add_input(record.input.clone());
        }
        context
    }

    /// Log a fired timer or reminder in the conversation history
    pub fn record_event(&mut self, event: &SchedulerEvent) {
        let tag = match event {
            SchedulerEvent::TimerExpired(_) => "timer_expired",
            SchedulerEvent::ReminderFired(_) => "reminder_fired",
        };
        self.memory
            .push(ConversationRecord::now(&event.message(), tag, 1.0));
    }

    pub fn save_memory(&self) -> Result<()> {
        match &self.storage {
            Some(storage) => storage.save_memory(&MemoryDocument::capture(&self.profile, &self.memory)),
            None => Ok(()),
        }
    }

    /// Save memory after a mutating command, logging instead of failing
    pub fn persist_memory(&self) {
        if let Err(e) = self.save_memory() {
            warn!("Failed to save memory: {}", e);
        }
    }

    /// Write config and memory; called on every exit path
    pub fn flush(&self) -> Result<()> {
        if let Some(storage) = &self.storage {
            storage.save_config(&self.config)?;
            self.save_memory()?;
            info!("Session state saved to {}", storage.dir().display());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::Timer;
    use chrono::Local;

    #[test]
    fn test_open_and_flush_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut session = SessionContext::open(Storage::new(dir.path())).unwrap();
            session.profile.set_name("Elena").unwrap();
            session
                .memory
                .record_interaction(ConversationRecord::now("hello", "greeting", 0.9));
            session.flush().unwrap();
        }

        let session = SessionContext::open(Storage::new(dir.path())).unwrap();
        assert_eq!(session.user_name(), "Elena");
        assert_eq!(session.memory.interaction_count, 1);
        assert!(dir.path().join("config.toml").exists());
    }

    #[test]
    fn test_record_event_does_not_count_as_interaction() {
        let mut session = SessionContext::in_memory(AssistantConfig::default());
        let timer = Timer::start("Tea".into(), 60, Local::now()).unwrap();
        session.record_event(&SchedulerEvent::TimerExpired(timer));
        assert_eq!(session.memory.len(), 1);
        assert_eq!(session.memory.interaction_count, 0);
        assert_eq!(session.memory.records().next().unwrap().intent, "timer_expired");
    }

    #[test]
    fn test_prompt_context_uses_recent_inputs() {
        let mut session = SessionContext::in_memory(AssistantConfig::default());
        for i in 0..7 {
            session
                .memory
                .record_interaction(ConversationRecord::now(&format!("input {}", i), "unknown", 0.4));
        }
        let context = session.prompt_context();
        assert_eq!(context.recent_inputs.len(), PromptContext::RECENT_LIMIT);
        assert_eq!(context.recent_inputs.last().map(String::as_str), Some("input 6"));
    }
}
