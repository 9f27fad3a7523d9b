//! Assistant configuration with documented constants
//!
//! The persisted options live in `config.toml` inside the data directory.
//! Behavioral constants that are not user-tunable are collected here with
//! explanations of what they bound.

use serde::{Deserialize, Serialize};

// === DISPLAY & MEMORY LIMITS ===

/// Maximum characters shown for a single answer before truncation
///
/// Anything beyond this is parked in the continuation slot and released
/// 500 characters at a time by "tell me more".
pub const DISPLAY_BUDGET: usize = 500;

/// Number of conversation records kept in memory and on disk
///
/// Appending past this evicts the oldest record first.
pub const HISTORY_CAPACITY: usize = 100;

/// Confidence below which an unknown command is treated as not understood
///
/// Also gates the generative fallback: low-confidence input never reaches
/// the backend.
pub const LOW_CONFIDENCE: f32 = 0.3;

/// Confidence at or above which a dispatched phrase is learned
pub const LEARNING_CONFIDENCE: f32 = 0.8;

/// Configuration persisted between sessions
///
/// Voice options are carried for compatibility with voice front-ends; the
/// text loop only reads `learning_enabled` and the generative table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// Display name the assistant uses for itself
    pub assistant_name: String,
    /// Enable voice input when a voice front-end is attached
    pub voice_enabled: bool,
    /// Speech rate in words per minute
    pub voice_rate: u32,
    /// Output volume (0.0 - 1.0)
    pub voice_volume: f32,
    /// Wake word for always-listening mode
    pub wake_word: String,
    /// Keep the microphone open between commands
    pub always_listening: bool,
    /// Record confidently dispatched phrases in the learned-command map
    pub learning_enabled: bool,
    /// Speak replies as well as printing them
    pub use_voice_output: bool,
    /// Generative fallback backend
    pub generative: GenerativeConfig,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Herald".into(),
            voice_enabled: true,
            voice_rate: 150,
            voice_volume: 0.9,
            wake_word: "herald".into(),
            always_listening: false,
            learning_enabled: true,
            use_voice_output: false,
            generative: GenerativeConfig::default(),
        }
    }
}

/// Settings for the optional generative fallback
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerativeConfig {
    /// Try the backend for unknown commands at all
    pub enabled: bool,
    /// Completion endpoint (Ollama `/api/generate` or an OpenAI-compatible URL)
    pub api_url: String,
    /// Model name sent with each request
    pub model: String,
    /// Bearer token for hosted OpenAI-compatible endpoints
    pub api_key: Option<String>,
    /// Budget for one completion, in seconds
    ///
    /// A response that takes longer is abandoned and the user gets an apology.
    pub timeout_secs: u64,
}

impl Default for GenerativeConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_url: "http://localhost:11434/api/generate".into(),
            model: "llama3.2".into(),
            api_key: None,
            timeout_secs: 30,
        }
    }
}

impl AssistantConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.assistant_name.trim().is_empty() {
            return Err("assistant_name must not be empty".into());
        }

        if !(0.0..=1.0).contains(&self.voice_volume) {
            return Err(format!(
                "voice_volume ({}) must be between 0.0 and 1.0",
                self.voice_volume
            ));
        }

        if self.voice_rate == 0 {
            return Err("voice_rate must be positive".into());
        }

        if self.generative.enabled && self.generative.timeout_secs == 0 {
            return Err("generative.timeout_secs must be positive".into());
        }

        Ok(())
    }
}
