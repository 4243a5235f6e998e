//! The "last answer" register.

/// Value of a register that was never set or was reset.
pub const DEFAULT_ANSWER: &str = "0";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AnswerRegister {
    value: String,
}

impl Default for AnswerRegister {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerRegister {
    pub fn new() -> Self {
        Self {
            value: DEFAULT_ANSWER.to_string(),
        }
    }

    pub fn get(&self) -> &str {
        &self.value
    }

    pub fn set(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn reset(&mut self) {
        self.value = DEFAULT_ANSWER.to_string();
    }

    /// Returns true if there is something worth inserting into the buffer.
    pub fn is_insertable(&self) -> bool {
        !self.value.is_empty() && self.value != DEFAULT_ANSWER
    }
}
