//! Conversation log and the continuation slot for long answers

use std::collections::{BTreeMap, VecDeque};

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::core::config::{DISPLAY_BUDGET, HISTORY_CAPACITY};
use crate::core::types::Timestamp;

/// Hint appended after a truncated answer
pub const CONTINUATION_HINT: &str = "(Say 'tell me more' to continue)";

/// Reply when "tell me more" has nothing to release
pub const NOTHING_TO_CONTINUE: &str = "There's no previous response to continue from.";

/// One dispatched command
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationRecord {
    pub timestamp: Timestamp,
    pub input: String,
    pub intent: String,
    pub confidence: f32,
}

impl ConversationRecord {
    pub fn now(input: &str, intent: &str, confidence: f32) -> Self {
        Self {
            timestamp: Local::now(),
            input: input.to_string(),
            intent: intent.to_string(),
            confidence,
        }
    }
}

/// Remainder of an answer that exceeded the display budget
#[derive(Debug, Clone, PartialEq)]
pub struct PendingContinuation {
    pub full_text: String,
    pub source: Option<String>,
    /// Characters already shown
    pub shown: usize,
}

/// Bounded turn log plus the single continuation slot
#[derive(Debug, Clone, Default)]
pub struct ConversationMemory {
    records: VecDeque<ConversationRecord>,
    pending: Option<PendingContinuation>,
    pub interaction_count: u64,
    /// Phrase -> intent tag for confidently handled commands
    pub learned_commands: BTreeMap<String, String>,
    /// Learned phrases, least recently learned first
    learned_order: VecDeque<String>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self {
            records: VecDeque::with_capacity(HISTORY_CAPACITY),
            ..Self::default()
        }
    }

    /// Rebuild from persisted parts, keeping only the newest records
    pub fn restore(
        records: Vec<ConversationRecord>,
        interaction_count: u64,
        learned_commands: BTreeMap<String, String>,
    ) -> Self {
        let mut memory = Self::new();
        for record in records {
            memory.push(record);
        }
        memory.interaction_count = interaction_count;
        for (phrase, intent) in learned_commands {
            memory.insert_learned(phrase, intent);
        }
        memory
    }

    /// Remember a confidently classified phrase
    ///
    /// Digit runs collapse to `#` so "set timer for 5 minutes" and
    /// "set timer for 10 minutes" share one entry. Past capacity the phrase
    /// learned longest ago is dropped.
    pub fn learn(&mut self, phrase: &str, intent: &str) {
        let pattern = learned_pattern(phrase);
        if !pattern.is_empty() {
            self.insert_learned(pattern, intent.to_string());
        }
    }

    fn insert_learned(&mut self, pattern: String, intent: String) {
        if self.learned_commands.insert(pattern.clone(), intent).is_some() {
            self.learned_order.retain(|known| *known != pattern);
        }
        self.learned_order.push_back(pattern);
        while self.learned_commands.len() > HISTORY_CAPACITY {
            let Some(oldest) = self.learned_order.pop_front() else {
                break;
            };
            self.learned_commands.remove(&oldest);
        }
    }

    /// Append a record, evicting the oldest past capacity
    pub fn push(&mut self, record: ConversationRecord) {
        if self.records.len() >= HISTORY_CAPACITY {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Log a dispatched command and bump the interaction counter
    pub fn record_interaction(&mut self, record: ConversationRecord) {
        self.interaction_count += 1;
        self.push(record);
    }

    pub fn records(&self) -> impl Iterator<Item = &ConversationRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pending(&self) -> Option<&PendingContinuation> {
        self.pending.as_ref()
    }

    /// Lines for an answer, truncated to the display budget
    ///
    /// A long answer replaces whatever continuation was pending. A short
    /// answer clears it and carries its source line directly.
    pub fn present(&mut self, answer: &str, source: Option<&str>) -> Vec<String> {
        let total = answer.chars().count();
        if total > DISPLAY_BUDGET {
            self.pending = Some(PendingContinuation {
                full_text: answer.to_string(),
                source: source.map(str::to_string),
                shown: DISPLAY_BUDGET,
            });
            return vec![
                format!("{}...", char_slice(answer, 0, DISPLAY_BUDGET)),
                CONTINUATION_HINT.to_string(),
            ];
        }

        self.pending = None;
        let mut lines = vec![answer.to_string()];
        if let Some(source) = source {
            lines.push(format!("Source: {}", source));
        }
        lines
    }

    /// Release the next slice of the pending answer
    pub fn continue_answer(&mut self) -> Vec<String> {
        let Some(pending) = self.pending.as_mut() else {
            return vec![NOTHING_TO_CONTINUE.to_string()];
        };

        let total = pending.full_text.chars().count();
        let end = (pending.shown + DISPLAY_BUDGET).min(total);
        let slice = char_slice(&pending.full_text, pending.shown, end);

        if end < total {
            pending.shown = end;
            return vec![format!("{}...", slice)];
        }

        let mut lines = vec![slice];
        if let Some(source) = &pending.source {
            lines.push(format!("Source: {}", source));
        }
        self.pending = None;
        lines
    }
}

/// Lowercased, whitespace-collapsed phrase with every digit run as `#`
fn learned_pattern(phrase: &str) -> String {
    let mut pattern = String::with_capacity(phrase.len());
    for word in phrase.split_whitespace() {
        if !pattern.is_empty() {
            pattern.push(' ');
        }
        let mut in_digits = false;
        for c in word.chars() {
            if c.is_ascii_digit() {
                if !in_digits {
                    pattern.push('#');
                }
                in_digits = true;
            } else {
                pattern.extend(c.to_lowercase());
                in_digits = false;
            }
        }
    }
    pattern
}

/// Characters [start, end) of `text`
fn char_slice(text: &str, start: usize, end: usize) -> String {
    text.chars().skip(start).take(end.saturating_sub(start)).collect()
}
