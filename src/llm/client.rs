//! Async HTTP client for the generative fallback
//!
//! Model-agnostic: speaks the Ollama `/api/generate` format for local
//! models and the OpenAI chat-completions format for everything else.

use std::time::Duration;

use reqwest::Client;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::core::config::GenerativeConfig;
use crate::core::error::{HeraldError, Result};
use crate::llm::context::PromptContext;
use crate::llm::GenerativeBackend;

const MAX_COMPLETION_TOKENS: u32 = 1024;

/// Wire format, chosen from the endpoint URL
#[derive(Debug, Clone, PartialEq)]
pub enum ApiFormat {
    Ollama,
    OpenAI,
}

impl ApiFormat {
    fn detect(url: &str) -> Self {
        if url.contains("/api/generate") || url.contains(":11434") {
            Self::Ollama
        } else {
            Self::OpenAI
        }
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    client: Client,
    api_key: Option<String>,
    api_url: String,
    model: String,
    api_format: ApiFormat,
    available: bool,
}

impl LlmClient {
    pub fn new(api_key: Option<String>, api_url: String, model: String) -> Self {
        let api_format = ApiFormat::detect(&api_url);
        Self {
            client: Client::new(),
            api_key,
            api_url,
            model,
            api_format,
            available: false,
        }
    }

    /// Client for the `[generative]` config table, or None when disabled
    ///
    /// `LLM_API_KEY` in the environment overrides a missing `api_key`.
    pub fn from_config(config: &GenerativeConfig) -> Option<Self> {
        if !config.enabled {
            return None;
        }
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("LLM_API_KEY").ok());
        Some(Self::new(api_key, config.api_url.clone(), config.model.clone()))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn api_format(&self) -> &ApiFormat {
        &self.api_format
    }

    /// Check the backend is reachable within `budget` and remember the result
    pub async fn probe(&mut self, budget: Duration) -> bool {
        self.available = match self.api_format {
            ApiFormat::Ollama => {
                let tags_url = self.tags_url();
                match self.client.get(&tags_url).timeout(budget).send().await {
                    Ok(response) => response.status().is_success(),
                    Err(e) => {
                        debug!("Ollama probe failed: {}", e);
                        false
                    }
                }
            }
            ApiFormat::OpenAI => self.api_key.is_some(),
        };
        if self.available {
            info!("Generative backend available (model: {})", self.model);
        } else {
            warn!("Generative backend unreachable at {}", self.api_url);
        }
        self.available
    }

    fn tags_url(&self) -> String {
        match self.api_url.find("/api/") {
            Some(at) => format!("{}/api/tags", &self.api_url[..at]),
            None => format!("{}/api/tags", self.api_url.trim_end_matches('/')),
        }
    }

    /// One completion: `system` sets the persona, `user` is the input line
    pub async fn complete(&self, system: &str, user: &str) -> Result<String> {
        let text = match self.api_format {
            ApiFormat::Ollama => {
                let body = OllamaRequest {
                    model: &self.model,
                    prompt: user,
                    system,
                    stream: false,
                };
                self.post::<_, OllamaResponse>(&body).await?.response
            }
            ApiFormat::OpenAI => {
                let body = ChatRequest {
                    model: &self.model,
                    max_tokens: MAX_COMPLETION_TOKENS,
                    messages: [
                        ChatMessage { role: "system", content: system },
                        ChatMessage { role: "user", content: user },
                    ],
                };
                let reply: ChatResponse = self.post(&body).await?;
                reply
                    .choices
                    .into_iter()
                    .next()
                    .map(|choice| choice.message.content)
                    .unwrap_or_default()
            }
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(HeraldError::Backend("empty completion".into()));
        }
        Ok(text.to_string())
    }

    async fn post<B: Serialize, R: DeserializeOwned>(&self, body: &B) -> Result<R> {
        let mut request = self.client.post(&self.api_url).json(body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .send()
            .await
            .map_err(|e| HeraldError::Backend(e.to_string()))?;
        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(HeraldError::Backend(format!("{}: {}", status, detail.trim())));
        }
        response
            .json()
            .await
            .map_err(|e| HeraldError::Backend(e.to_string()))
    }
}

impl GenerativeBackend for LlmClient {
    fn is_available(&self) -> bool {
        self.available
    }

    async fn generate(&self, prompt: &str, context: &PromptContext) -> Result<String> {
        self.complete(&context.system_prompt(), prompt).await
    }
}

#[derive(Serialize)]
struct OllamaRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    system: &'a str,
    stream: bool,
}

#[derive(Deserialize)]
struct OllamaResponse {
    response: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    messages: [ChatMessage<'a>; 2],
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
