//! User profile: display name and free-form preferences

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::core::error::{HeraldError, Result};
use crate::session::filter::is_name_acceptable;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Empty when unknown or cleared by the content filter
    #[serde(default)]
    pub name: String,
    /// Any other stored preference, kept as-is
    #[serde(flatten)]
    pub preferences: BTreeMap<String, serde_json::Value>,
}

impl UserProfile {
    /// Store a new name if it passes the content filter
    pub fn set_name(&mut self, name: &str) -> Result<()> {
        let name = name.trim();
        if !is_name_acceptable(name) {
            return Err(HeraldError::Validation(
                "I cannot accept that name. Please provide a different, respectful name.".into(),
            ));
        }
        self.name = name.to_string();
        Ok(())
    }

    /// The stored name, re-validated before it is echoed
    pub fn display_name(&self) -> Option<&str> {
        (!self.name.is_empty() && is_name_acceptable(&self.name)).then_some(self.name.as_str())
    }

    /// Blank a stored name the filter rejects; returns true if it changed
    pub fn sanitize(&mut self) -> bool {
        if !self.name.is_empty() && !is_name_acceptable(&self.name) {
            self.name.clear();
            return true;
        }
        false
    }
}

/// OS login name, used when no display name is stored
pub fn system_user_name() -> String {
    std::env::var("USER")
        .or_else(|_| std::env::var("USERNAME"))
        .unwrap_or_else(|_| "User".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_name_rejects_without_mutation() {
        let mut profile = UserProfile::default();
        profile.set_name("Elena").unwrap();
        assert!(profile.set_name("fu(k").is_err());
        assert_eq!(profile.name, "Elena");
    }

    #[test]
    fn test_sanitize_blanks_bad_name() {
        let mut profile = UserProfile {
            name: "sh1t".into(),
            ..UserProfile::default()
        };
        assert!(profile.display_name().is_none());
        assert!(profile.sanitize());
        assert!(profile.name.is_empty());
        assert!(!profile.sanitize());
    }

    #[test]
    fn test_preferences_flatten_alongside_name() {
        let json = r#"{"name": "Phillippi", "units": "metric"}"#;
        let profile: UserProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.display_name(), Some("Phillippi"));
        assert_eq!(profile.preferences["units"], "metric");

        let back = serde_json::to_value(&profile).unwrap();
        assert_eq!(back["name"], "Phillippi");
        assert_eq!(back["units"], "metric");
    }
}
