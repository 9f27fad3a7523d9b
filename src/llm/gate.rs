//! Policy gate in front of the generative fallback

use crate::core::config::LOW_CONFIDENCE;

/// Openers of lookups that want a sourced fact rather than a chat reply
const FACTUAL_OPENERS: [&str; 9] = [
    "who is",
    "who was",
    "what is",
    "when did",
    "when was",
    "where is",
    "how many",
    "how much",
    "define",
];

/// Whether the text reads like a factual or structured query
pub fn is_factual_or_structured(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    if lower.chars().any(|c| c.is_ascii_digit()) {
        return true;
    }
    if lower.contains("http://") || lower.contains("https://") || lower.contains("www.") {
        return true;
    }
    if lower.contains('@') || lower.contains('/') || lower.contains('=') {
        return true;
    }
    FACTUAL_OPENERS.iter().any(|opener| lower.starts_with(opener))
}

/// Whether an unknown command may be sent to the generative backend
pub fn should_generate(text: &str, confidence: f32) -> bool {
    confidence >= LOW_CONFIDENCE && !text.trim().is_empty() && !is_factual_or_structured(text)
}
