//! Single-line text input widget.

use crate::ui::theme::{Styles, Symbols};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

/// A single-line text input that scrolls horizontally to keep the
/// cursor visible.
#[derive(Debug, Clone)]
pub struct TextInput<'a> {
    content: &'a str,
    /// Cursor position (character index).
    cursor: usize,
    focused: bool,
    placeholder: Option<&'a str>,
}

impl<'a> TextInput<'a> {
    /// Create a new text input with the cursor at the end.
    pub fn new(content: &'a str) -> Self {
        Self {
            content,
            cursor: content.chars().count(),
            focused: true,
            placeholder: None,
        }
    }

    /// Set focus state.
    #[must_use]
    pub fn focused(mut self, focused: bool) -> Self {
        self.focused = focused;
        self
    }

    /// Set placeholder text.
    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = Some(placeholder);
        self
    }

    /// Set the cursor position (character index).
    #[must_use]
    pub fn cursor(mut self, cursor: usize) -> Self {
        self.cursor = cursor.min(self.content.chars().count());
        self
    }
}

impl Widget for TextInput<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let cursor_span = Span::styled(Symbols::CURSOR, Styles::default());

        if self.content.is_empty() {
            let mut spans = Vec::new();
            if self.focused {
                spans.push(cursor_span);
            }
            if let Some(placeholder) = self.placeholder {
                spans.push(Span::styled(placeholder, Styles::dim()));
            }
            Paragraph::new(Line::from(spans)).render(area, buf);
            return;
        }

        // Drop leading characters until the cursor fits in the visible width.
        let budget = usize::from(area.width).saturating_sub(1);
        let chars: Vec<char> = self.content.chars().collect();
        let mut start = 0;
        while start < self.cursor && visible_width(&chars[start..self.cursor]) > budget {
            start += 1;
        }

        let before: String = chars[start..self.cursor].iter().collect();
        let after: String = chars[self.cursor..].iter().collect();

        let mut spans = vec![Span::styled(before, Styles::default())];
        if self.focused {
            spans.push(cursor_span);
        }
        spans.push(Span::styled(after, Styles::default()));

        Paragraph::new(Line::from(spans)).render(area, buf);
    }
}

fn visible_width(chars: &[char]) -> usize {
    chars
        .iter()
        .map(|c| UnicodeWidthChar::width(*c).unwrap_or(0))
        .sum()
}

/// State for a text input, managing content and cursor position.
///
/// The cursor is a character index, so editing never splits a
/// multi-byte character.
#[derive(Debug, Clone, Default)]
pub struct TextInputState {
    content: String,
    cursor: usize,
}

impl TextInputState {
    /// Create a new empty text input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the current content.
    pub fn content(&self) -> &str {
        &self.content
    }

    /// Cursor position (character index).
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Clear the content.
    pub fn clear(&mut self) {
        self.content.clear();
        self.cursor = 0;
    }

    /// Replace the content and move the cursor to the end.
    pub fn set(&mut self, content: impl Into<String>) {
        self.content = content.into();
        self.cursor = self.content.chars().count();
    }

    /// Insert a character at the cursor position.
    pub fn insert(&mut self, ch: char) {
        let at = self.byte_index(self.cursor);
        self.content.insert(at, ch);
        self.cursor += 1;
    }

    /// Delete the character before the cursor (backspace).
    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Delete the character at the cursor (delete).
    pub fn delete(&mut self) {
        if self.cursor < self.char_count() {
            let at = self.byte_index(self.cursor);
            self.content.remove(at);
        }
    }

    /// Move cursor left.
    pub fn move_left(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    /// Move cursor right.
    pub fn move_right(&mut self) {
        if self.cursor < self.char_count() {
            self.cursor += 1;
        }
    }

    /// Move cursor to start.
    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    /// Move cursor to end.
    pub fn move_end(&mut self) {
        self.cursor = self.char_count();
    }

    /// Create a widget from this state.
    pub fn widget(&self) -> TextInput<'_> {
        TextInput::new(&self.content).cursor(self.cursor)
    }

    fn char_count(&self) -> usize {
        self.content.chars().count()
    }

    fn byte_index(&self, char_index: usize) -> usize {
        self.content
            .char_indices()
            .nth(char_index)
            .map_or(self.content.len(), |(i, _)| i)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::buffer_to_string;

    #[test]
    fn test_text_input_state_basic() {
        let mut state = TextInputState::new();
        assert!(state.content().is_empty());

        state.insert('H');
        state.insert('i');
        assert_eq!(state.content(), "Hi");
        assert_eq!(state.cursor(), 2);

        state.backspace();
        assert_eq!(state.content(), "H");

        state.clear();
        assert!(state.content().is_empty());
    }

    #[test]
    fn test_text_input_state_cursor_movement() {
        let mut state = TextInputState::new();
        state.set("Hello");

        state.move_left();
        state.move_left();
        assert_eq!(state.cursor(), 3);

        state.insert('X');
        assert_eq!(state.content(), "HelXlo");

        state.move_home();
        assert_eq!(state.cursor(), 0);
        state.move_left();
        assert_eq!(state.cursor(), 0);

        state.move_end();
        assert_eq!(state.cursor(), 6);
        state.move_right();
        assert_eq!(state.cursor(), 6);
    }

    #[test]
    fn test_editing_multibyte_text() {
        let mut state = TextInputState::new();
        state.set("I’m");
        state.move_left();
        state.backspace();
        assert_eq!(state.content(), "Im");

        state.move_home();
        state.delete();
        assert_eq!(state.content(), "m");

        state.insert('é');
        assert_eq!(state.content(), "ém");
        assert_eq!(state.cursor(), 1);
    }

    #[test]
    fn test_set_moves_cursor_to_end() {
        let mut state = TextInputState::new();
        state.set("Is [Hotel/Venue] available?");
        assert_eq!(state.cursor(), 27);
    }

    #[test]
    fn test_render_placeholder_when_empty() {
        let area = Rect::new(0, 0, 30, 1);
        let mut buf = Buffer::empty(area);
        TextInput::new("")
            .placeholder("Ask anything...")
            .focused(false)
            .render(area, &mut buf);

        assert_eq!(buffer_to_string(&buf), "Ask anything...");
    }

    #[test]
    fn test_render_scrolls_to_cursor() {
        let area = Rect::new(0, 0, 6, 1);
        let mut buf = Buffer::empty(area);
        TextInput::new("abcdefghij").render(area, &mut buf);

        let rendered = buffer_to_string(&buf);
        assert!(rendered.starts_with("fghij"));
        assert!(!rendered.contains('a'));
    }
}
