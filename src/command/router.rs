//! Dispatch router - one input line in, one [`Reply`] out
//!
//! Bands are tried in a fixed order and the first that claims the input
//! answers it:
//!
//! 1. custom command rules (exact trigger match, before classification)
//! 2. the intent handler table
//! 3. keyword bands, by lowercase substring
//! 4. the generative backend, for gated `unknown` input only
//! 5. terminal fallbacks
//!
//! Every input is recorded in conversation memory before any band runs.

use std::time::Duration;

use ahash::AHashMap;
use tracing::{debug, warn};

use crate::command::classifier::{Classifier, PatternClassifier};
use crate::command::handlers::{intent_handlers, keyword_handlers, IntentHandler, KeywordHandler};
use crate::command::parsed::{Intent, ParsedCommand};
use crate::command::reply::Reply;
use crate::core::config::{LEARNING_CONFIDENCE, LOW_CONFIDENCE};
use crate::core::error::HeraldError;
use crate::llm::{gate, GenerativeBackend, LlmClient};
use crate::session::memory::ConversationRecord;
use crate::session::SessionContext;

/// Source line attached to generated answers
pub const GENERATIVE_SOURCE: &str = "Herald LLM.";

const APOLOGY: &str = "I apologize, but I'm unable to process that query at the moment.";
const APOLOGY_TIMEOUT: &str = "The language model is taking too long to respond.";
const APOLOGY_ERROR: &str = "The language model could not produce an answer.";
const NOT_UNDERSTOOD: &str = "I'm sorry, I did not understand that. Could you rephrase?";
const NOT_IMPLEMENTED: &str = "Command recognized but not yet implemented.";

/// Intent tag recorded for custom command matches
const CUSTOM_COMMAND_TAG: &str = "custom_command";

pub struct Router<C: Classifier = PatternClassifier, G: GenerativeBackend = LlmClient> {
    classifier: C,
    handlers: AHashMap<Intent, IntentHandler>,
    keywords: Vec<KeywordHandler>,
    backend: Option<G>,
    budget: Duration,
}

impl Router<PatternClassifier, LlmClient> {
    /// Built-in classifier and the HTTP backend, if one is configured
    pub fn standard(backend: Option<LlmClient>, budget: Duration) -> Self {
        Self::new(PatternClassifier, backend, budget)
    }
}

impl<C: Classifier, G: GenerativeBackend> Router<C, G> {
    pub fn new(classifier: C, backend: Option<G>, budget: Duration) -> Self {
        Self {
            classifier,
            handlers: intent_handlers(),
            keywords: keyword_handlers(),
            backend,
            budget,
        }
    }

    /// Install or replace the handler for `intent`
    pub fn register(&mut self, intent: Intent, handler: IntentHandler) -> Option<IntentHandler> {
        self.handlers.insert(intent, handler)
    }

    pub fn unregister(&mut self, intent: Intent) -> Option<IntentHandler> {
        self.handlers.remove(&intent)
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn backend(&self) -> Option<&G> {
        self.backend.as_ref()
    }

    /// Handle one input line
    ///
    /// Never fails: every error along the way becomes reply text.
    pub async fn dispatch(&self, ctx: &mut SessionContext, input: &str) -> Reply {
        if let Some(rule) = ctx.custom_commands.match_command(input).cloned() {
            debug!("Custom command '{}' matched", rule.trigger);
            ctx.memory
                .record_interaction(ConversationRecord::now(input, CUSTOM_COMMAND_TAG, 1.0));
            let result = ctx
                .custom_commands
                .execute(&rule, ctx.services.system.as_ref());
            ctx.persist_memory();
            return Reply::new(result.lines());
        }

        let parsed = self.classifier.classify(input);
        let confidence = parsed.confidence();
        debug!("Classified '{}' as {} ({:.2})", input, parsed.intent, confidence);

        ctx.memory
            .record_interaction(ConversationRecord::now(input, parsed.intent.as_str(), confidence));
        self.learn(ctx, &parsed);

        let reply = self.route(ctx, &parsed).await;
        ctx.persist_memory();
        reply
    }

    fn learn(&self, ctx: &mut SessionContext, parsed: &ParsedCommand) {
        if !ctx.config.learning_enabled
            || parsed.intent == Intent::Unknown
            || parsed.confidence() < LEARNING_CONFIDENCE
        {
            return;
        }
        ctx.memory.learn(&parsed.raw, parsed.intent.as_str());
    }

    async fn route(&self, ctx: &mut SessionContext, parsed: &ParsedCommand) -> Reply {
        if let Some(handler) = self.handlers.get(&parsed.intent) {
            debug!("Intent band: {}", parsed.intent);
            return handler(ctx, parsed);
        }

        let lower = parsed.raw.to_lowercase();
        if let Some(band) = self.keywords.iter().find(|band| (band.matches)(&lower)) {
            debug!("Keyword band: {}", band.group);
            return (band.handle)(ctx, &parsed.raw);
        }

        if parsed.intent != Intent::Unknown {
            debug!("No handler for {}", parsed.intent);
            return Reply::line(NOT_IMPLEMENTED);
        }

        if let Some(reply) = self.generate(ctx, parsed).await {
            return reply;
        }

        if parsed.confidence() < LOW_CONFIDENCE {
            Reply::line(NOT_UNDERSTOOD)
        } else {
            Reply::line(format!(
                "I understood '{}' but don't have an action for it yet.",
                parsed.raw
            ))
        }
    }

    /// Generative band; `None` when the backend is absent or the gate declines
    async fn generate(&self, ctx: &mut SessionContext, parsed: &ParsedCommand) -> Option<Reply> {
        let backend = self.backend.as_ref().filter(|b| b.is_available())?;
        if !gate::should_generate(&parsed.raw, parsed.confidence()) {
            debug!("Generative gate declined '{}'", parsed.raw);
            return None;
        }

        debug!("Generative band for '{}'", parsed.raw);
        let context = ctx.prompt_context();
        let outcome = tokio::time::timeout(self.budget, backend.generate(&parsed.raw, &context))
            .await
            .unwrap_or(Err(HeraldError::BackendTimeout(self.budget)));

        Some(match outcome {
            Ok(answer) => Reply::new(ctx.memory.present(answer.trim(), Some(GENERATIVE_SOURCE))),
            Err(HeraldError::BackendTimeout(after)) => {
                warn!("Generative backend timed out after {:?}", after);
                Reply::new(vec![APOLOGY.to_string(), APOLOGY_TIMEOUT.to_string()])
            }
            Err(e) => {
                warn!("Generative backend failed: {}", e);
                Reply::new(vec![APOLOGY.to_string(), APOLOGY_ERROR.to_string()])
            }
        })
    }
}

impl<C: Classifier, G: GenerativeBackend> std::fmt::Debug for Router<C, G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("handlers", &self.handlers.len())
            .field("keywords", &self.keywords)
            .field("backend", &self.backend.is_some())
            .field("budget", &self.budget)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::AssistantConfig;
    use crate::llm::PromptContext;

    struct Echo;

    impl GenerativeBackend for Echo {
        fn is_available(&self) -> bool {
            true
        }

        async fn generate(&self, prompt: &str, _context: &PromptContext) -> crate::core::error::Result<String> {
            Ok(format!("echo: {}", prompt))
        }
    }

    fn router() -> Router<PatternClassifier, Echo> {
        Router::new(PatternClassifier, Some(Echo), Duration::from_secs(1))
    }

    fn ctx() -> SessionContext {
        SessionContext::in_memory(AssistantConfig::default())
    }

    #[tokio::test]
    async fn test_every_dispatch_is_recorded() {
        let router = router();
        let mut ctx = ctx();
        router.dispatch(&mut ctx, "hello").await;
        router.dispatch(&mut ctx, "xq").await;
        assert_eq!(ctx.memory.interaction_count, 2);
        let intents: Vec<_> = ctx.memory.records().map(|r| r.intent.clone()).collect();
        assert_eq!(intents, ["greeting", "unknown"]);
    }

    #[tokio::test]
    async fn test_confident_phrases_are_learned() {
        let router = router();
        let mut ctx = ctx();
        router.dispatch(&mut ctx, "What time is it").await;
        assert_eq!(
            ctx.memory.learned_commands.get("what time is it").map(String::as_str),
            Some("time")
        );

        ctx.config.learning_enabled = false;
        router.dispatch(&mut ctx, "what's the date").await;
        assert!(!ctx.memory.learned_commands.contains_key("what's the date"));
    }

    #[tokio::test]
    async fn test_generated_answer_carries_source() {
        let router = router();
        let mut ctx = ctx();
        let reply = router.dispatch(&mut ctx, "compose a haiku about autumn leaves").await;
        assert_eq!(
            reply.lines,
            vec![
                "echo: compose a haiku about autumn leaves".to_string(),
                "Source: Herald LLM.".to_string()
            ]
        );
    }

    #[tokio::test]
    async fn test_learned_phrases_stay_bounded() {
        let router = router();
        let mut ctx = ctx();
        for i in 0..500 {
            router.dispatch(&mut ctx, &format!("set timer for {} seconds", i + 1)).await;
        }
        assert_eq!(ctx.memory.learned_commands.len(), 1);
        assert_eq!(
            ctx.memory.learned_commands.get("set timer for # seconds").map(String::as_str),
            Some("set_timer")
        );
        assert_eq!(ctx.memory.len(), crate::core::config::HISTORY_CAPACITY);
    }

    #[tokio::test]
    async fn test_unregistered_intent_is_not_implemented() {
        let mut router = router();
        router.unregister(Intent::Date);
        let mut ctx = ctx();
        let reply = router.dispatch(&mut ctx, "what's the date").await;
        assert_eq!(reply.lines, vec![NOT_IMPLEMENTED.to_string()]);
    }

    #[tokio::test]
    async fn test_keyword_band_catches_unknown_input() {
        let router = Router::<PatternClassifier, Echo>::new(PatternClassifier, None, Duration::from_secs(1));
        let mut ctx = ctx();
        let reply = router.dispatch(&mut ctx, "budget status").await;
        assert_eq!(reply.lines, vec!["finance: no provider is configured".to_string()]);
    }

    #[tokio::test]
    async fn test_without_backend_unknown_gets_terminal_line() {
        let router = Router::<PatternClassifier, Echo>::new(PatternClassifier, None, Duration::from_secs(1));
        let mut ctx = ctx();
        let reply = router.dispatch(&mut ctx, "compose a haiku about autumn leaves").await;
        assert_eq!(
            reply.lines,
            vec!["I understood 'compose a haiku about autumn leaves' but don't have an action for it yet.".to_string()]
        );
    }
}
