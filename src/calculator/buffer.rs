//! Editable expression buffer with an insertion cursor.

use super::keypad::evaluator_token;

/// The formula being typed plus a cursor.
///
/// The cursor counts characters, not bytes, and always lies in
/// `0..=len()`, so it can never split a multi-byte character.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExpressionBuffer {
    text: String,
    cursor: usize,
}

impl ExpressionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a buffer holding `text` with the cursor at its end.
    pub fn from_text(text: impl Into<String>) -> Self {
        let text = text.into();
        let cursor = text.chars().count();
        Self { text, cursor }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Length in characters.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text before and after the cursor.
    pub fn split_at_cursor(&self) -> (&str, &str) {
        self.text.split_at(self.byte_offset(self.cursor))
    }

    /// Splice `token` in at the cursor and move the cursor past it.
    pub fn insert(&mut self, token: &str) {
        let token = evaluator_token(token);
        let at = self.byte_offset(self.cursor);
        self.text.insert_str(at, token);
        self.cursor += token.chars().count();
    }

    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor < self.len() {
            self.cursor += 1;
        }
    }

    /// Delete the character before the cursor.
    ///
    /// Returns false when the cursor is at the start and nothing changed.
    pub fn backspace(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }

        let at = self.byte_offset(self.cursor - 1);
        self.text.remove(at);
        self.cursor -= 1;
        true
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor = 0;
    }

    fn byte_offset(&self, chars: usize) -> usize {
        self.text
            .char_indices()
            .nth(chars)
            .map(|(offset, _)| offset)
            .unwrap_or(self.text.len())
    }
}
