//! Text field editing
//!
//! Positions are character indices (not byte offsets) clamped to the current
//! length, so callers can address "end of text" with `usize::MAX`.

use core::fmt;

use crate::element::TextChangeHandler;

/// Text field payload
#[derive(Clone)]
pub struct TextFieldState {
    content: String,
    caret: usize,
    /// Change callback, invoked after every edit
    pub on_change: TextChangeHandler,
}

impl TextFieldState {
    /// Field holding `initial` with the caret after the last character.
    pub fn new(initial: impl Into<String>, on_change: TextChangeHandler) -> Self {
        let content = initial.into();
        let caret = content.chars().count();
        Self {
            content,
            caret,
            on_change,
        }
    }

    /// Current content
    pub fn text(&self) -> &str {
        &self.content
    }

    /// Caret position in characters
    pub fn caret(&self) -> usize {
        self.caret
    }

    /// Length in characters
    pub fn char_len(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_offset(&self, position: usize) -> usize {
        self.content
            .char_indices()
            .nth(position)
            .map_or(self.content.len(), |(offset, _)| offset)
    }

    /// Insert `c` before character `position` and move the caret after it.
    /// Returns the position actually used.
    pub fn insert_char(&mut self, c: char, position: usize) -> usize {
        let position = position.min(self.char_len());
        let offset = self.byte_offset(position);
        self.content.insert(offset, c);
        self.caret = position.saturating_add(1);
        position
    }

    /// Delete the character at `position`; the caret moves to `position`.
    /// Returns the removed character, `None` past the end.
    pub fn delete_char(&mut self, position: usize) -> Option<char> {
        if position >= self.char_len() {
            return None;
        }
        let offset = self.byte_offset(position);
        let removed = self.content.remove(offset);
        self.caret = position;
        Some(removed)
    }

    /// Replace the whole content; the caret moves to the end.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.content = text.into();
        self.caret = self.char_len();
    }

    /// Text before the caret (used to place the caret when painting)
    pub fn before_caret(&self) -> &str {
        let offset = self.byte_offset(self.caret);
        self.content.get(..offset).unwrap_or(&self.content)
    }
}

impl fmt::Debug for TextFieldState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextFieldState")
            .field("content", &self.content)
            .field("caret", &self.caret)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn field(initial: &str) -> TextFieldState {
        TextFieldState::new(initial, Arc::new(|_, _| {}))
    }

    #[test]
    fn test_new_puts_caret_at_end() {
        let tf = field("héllo");
        assert_eq!(tf.caret(), 5);
        assert_eq!(tf.char_len(), 5);
    }

    #[test]
    fn test_insert_in_middle() {
        let mut tf = field("ac");
        assert_eq!(tf.insert_char('b', 1), 1);
        assert_eq!(tf.text(), "abc");
        assert_eq!(tf.caret(), 2);
    }

    #[test]
    fn test_insert_past_end_appends() {
        let mut tf = field("ab");
        assert_eq!(tf.insert_char('!', usize::MAX), 2);
        assert_eq!(tf.text(), "ab!");
        assert_eq!(tf.caret(), 3);
    }

    #[test]
    fn test_multibyte_positions_are_chars() {
        let mut tf = field("äö");
        tf.insert_char('ü', 1);
        assert_eq!(tf.text(), "äüö");
        assert_eq!(tf.delete_char(2), Some('ö'));
        assert_eq!(tf.text(), "äü");
        assert_eq!(tf.before_caret(), "äü");
    }

    #[test]
    fn test_delete_out_of_range() {
        let mut tf = field("x");
        assert_eq!(tf.delete_char(1), None);
        assert_eq!(tf.text(), "x");
        assert_eq!(tf.delete_char(0), Some('x'));
        assert_eq!(tf.text(), "");
        assert_eq!(tf.caret(), 0);
    }

    #[test]
    fn test_set_text_moves_caret() {
        let mut tf = field("");
        tf.set_text("abc");
        assert_eq!(tf.caret(), 3);
        assert_eq!(tf.before_caret(), "abc");
    }
}
