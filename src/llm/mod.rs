//! Generative fallback backend
//!
//! Only commands the classifier could not place reach this module, and
//! only after [`gate::should_generate`] approves them.

pub mod client;
pub mod context;
pub mod gate;

pub use client::LlmClient;
pub use context::PromptContext;

use crate::core::error::Result;

/// A text generator the router can fall back on
#[allow(async_fn_in_trait)]
pub trait GenerativeBackend {
    /// Last known reachability; checked before every call
    fn is_available(&self) -> bool;

    async fn generate(&self, prompt: &str, context: &PromptContext) -> Result<String>;
}
