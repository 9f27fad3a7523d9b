//! Domain feature requests delegated to external providers

use serde::{Deserialize, Serialize};

use crate::core::error::{HeraldError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VolumeChange {
    Up,
    Down,
    Mute,
    Set(u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MediaService {
    YouTube,
    Spotify,
}

/// One typed request for a feature provider
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FeatureRequest {
    Weather { location: Option<String> },
    WebSearch { query: String },
    Question { text: String },
    Location,
    Timezone,
    SystemInfo,
    News { topic: Option<String> },
    CryptoPrice { coin: String },
    CurrencyConvert { amount: f64, from: String, to: String },
    GithubUser { username: String },
    ShortenUrl { url: String },
    WebsiteStatus { url: String },
    Volume(VolumeChange),
    Play { service: Option<MediaService>, query: String },
    PauseMedia,
    OrganizeDownloads,
    Screenshot,
    Translate { text: String, language: String },
    SendNotification { message: String },
    LogHabit { name: String },
    HabitStats,
    Light { device: String, on: bool },
    Roku { command: String },
    LogWater { millilitres: u32 },
    LogExercise { activity: String, minutes: u32 },
    HealthSummary,
    AddExpense { amount: f64, category: String },
    BudgetStatus,
    StockPrice { symbol: String },
}

impl FeatureRequest {
    /// Name of the provider family that serves this request
    pub fn provider(&self) -> &'static str {
        match self {
            Self::Weather { .. } => "weather",
            Self::WebSearch { .. } => "search",
            Self::Question { .. } => "knowledge",
            Self::Location | Self::Timezone => "location",
            Self::SystemInfo => "system",
            Self::News { .. } => "news",
            Self::CryptoPrice { .. } | Self::CurrencyConvert { .. } => "finance",
            Self::GithubUser { .. } | Self::ShortenUrl { .. } | Self::WebsiteStatus { .. } => "web",
            Self::Volume(_) | Self::Play { .. } | Self::PauseMedia => "media",
            Self::OrganizeDownloads | Self::Screenshot => "automation",
            Self::Translate { .. } | Self::SendNotification { .. } => "communication",
            Self::LogHabit { .. } | Self::HabitStats => "productivity",
            Self::Light { .. } | Self::Roku { .. } => "home",
            Self::LogWater { .. } | Self::LogExercise { .. } | Self::HealthSummary => "health",
            Self::AddExpense { .. } | Self::BudgetStatus | Self::StockPrice { .. } => "finance",
        }
    }
}

/// Provider answer, optionally attributed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureResponse {
    pub text: String,
    pub source: Option<String>,
}

impl FeatureResponse {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            source: None,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

pub trait FeatureProvider: Send + Sync {
    fn handle(&self, request: &FeatureRequest) -> Result<FeatureResponse>;
}

/// Default provider set with nothing configured
#[derive(Debug, Clone, Copy, Default)]
pub struct OfflineProviders;

impl FeatureProvider for OfflineProviders {
    fn handle(&self, request: &FeatureRequest) -> Result<FeatureResponse> {
        Err(HeraldError::external(
            request.provider(),
            "no provider is configured",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_reports_provider() {
        let err = OfflineProviders
            .handle(&FeatureRequest::StockPrice {
                symbol: "AAPL".into(),
            })
            .unwrap_err();
        assert_eq!(err.user_message(), "finance: no provider is configured");
    }

    #[test]
    fn test_provider_families() {
        assert_eq!(FeatureRequest::PauseMedia.provider(), "media");
        assert_eq!(
            FeatureRequest::Roku {
                command: "home".into()
            }
            .provider(),
            "home"
        );
        assert_eq!(FeatureRequest::HealthSummary.provider(), "health");
        assert_eq!(FeatureRequest::Timezone.provider(), "location");
        assert_eq!(
            FeatureRequest::ShortenUrl {
                url: "https://example.com".into()
            }
            .provider(),
            "web"
        );
    }
}
