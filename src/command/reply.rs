/// Output of one dispatched command
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Reply {
    pub lines: Vec<String>,
    /// Set only by the farewell handler
    pub end_session: bool,
}

impl Reply {
    pub fn new(lines: Vec<String>) -> Self {
        Self {
            lines,
            end_session: false,
        }
    }

    pub fn line(text: impl Into<String>) -> Self {
        Self::new(vec![text.into()])
    }

    pub fn farewell(text: impl Into<String>) -> Self {
        Self {
            lines: vec![text.into()],
            end_session: true,
        }
    }

    pub fn push(&mut self, text: impl Into<String>) {
        self.lines.push(text.into());
    }

    pub fn text(&self) -> String {
        self.lines.join("\n")
    }
}

impl From<Vec<String>> for Reply {
    fn from(lines: Vec<String>) -> Self {
        Self::new(lines)
    }
}
