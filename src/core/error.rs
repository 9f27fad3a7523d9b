use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum HeraldError {
    #[error("Parse error: {0}")]
    Parse(String),

    #[error("{provider} error: {message}")]
    ExternalService { provider: String, message: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Scheduling error: {0}")]
    Scheduling(String),

    #[error("Generative backend timed out after {0:?}")]
    BackendTimeout(Duration),

    #[error("Generative backend error: {0}")]
    Backend(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("Config write error: {0}")]
    TomlSer(#[from] toml::ser::Error),
}

impl HeraldError {
    pub fn external(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ExternalService {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Text shown to the user when a handler gives up on a command.
    ///
    /// Parse/validation/scheduling messages are written for the user already,
    /// so they are passed through without the variant prefix.
    pub fn user_message(&self) -> String {
        match self {
            Self::Parse(msg) | Self::Validation(msg) | Self::Scheduling(msg) => msg.clone(),
            Self::ExternalService { provider, message } => format!("{}: {}", provider, message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, HeraldError>;
