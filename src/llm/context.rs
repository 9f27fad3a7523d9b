//! Session context handed to the generative backend
//!
//! Summarizes who the user is and what was said recently so the model can
//! answer in the assistant's voice without seeing the whole memory record.

/// Prompt context for the generative fallback
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptContext {
    /// Name the assistant introduces itself with
    pub assistant_name: String,
    /// Stored display name, if it passed the content filter
    pub user_name: Option<String>,
    /// Host operating system
    pub system_info: String,
    /// Most recent user inputs, oldest first
    pub recent_inputs: Vec<String>,
}

impl PromptContext {
    /// Number of recent inputs carried into the prompt
    pub const RECENT_LIMIT: usize = 5;

    pub fn new(assistant_name: impl Into<String>, system_info: impl Into<String>) -> Self {
        Self {
            assistant_name: assistant_name.into(),
            system_info: system_info.into(),
            ..Self::default()
        }
    }

    pub fn with_user(mut self, user_name: Option<&str>) -> Self {
        self.user_name = user_name.map(str::to_string);
        self
    }

    /// Add a recent input, keeping only the last few
    pub fn add_input(&mut self, input: impl Into<String>) {
        self.recent_inputs.push(input.into());
        if self.recent_inputs.len() > Self::RECENT_LIMIT {
            self.recent_inputs.remove(0);
        }
    }

    /// System prompt text for one completion
    pub fn system_prompt(&self) -> String {
        let mut s = format!(
            "You are {}, a concise and helpful personal assistant. \
             Answer in plain text with no markdown. Keep answers brief unless asked for detail.\n",
            self.assistant_name
        );

        if let Some(name) = &self.user_name {
            s.push_str(&format!("The user's name is {}.\n", name));
        }
        if !self.system_info.is_empty() {
            s.push_str(&format!("The user's operating system is {}.\n", self.system_info));
        }

        if !self.recent_inputs.is_empty() {
            s.push_str("\nRecent requests:\n");
            for input in &self.recent_inputs {
                s.push_str(&format!("- {}\n", input));
            }
        }

        s
    }
}
