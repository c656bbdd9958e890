//! Status line under the chat input.

use crate::text::truncate_to_width;
use crate::ui::theme::Styles;
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    text::{Line, Span},
    widgets::Widget,
};

/// A key hint for the status line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyHint {
    pub key: &'static str,
    pub label: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, label: &'static str) -> Self {
        Self { key, label }
    }
}

/// One-row status line. A notice replaces the key hints while present.
#[derive(Debug, Clone, Default)]
pub struct StatusBar<'a> {
    hints: Vec<KeyHint>,
    notice: Option<&'a str>,
}

impl<'a> StatusBar<'a> {
    /// Create an empty status line.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add key hints.
    #[must_use]
    pub fn hints(mut self, hints: Vec<KeyHint>) -> Self {
        self.hints = hints;
        self
    }

    /// Show a notice instead of the hints.
    #[must_use]
    pub fn notice(mut self, notice: Option<&'a str>) -> Self {
        self.notice = notice;
        self
    }
}

impl Widget for StatusBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        if area.height < 1 || area.width < 1 {
            return;
        }

        let line = if let Some(notice) = self.notice {
            let text = truncate_to_width(notice, usize::from(area.width));
            Line::from(Span::styled(text, Styles::warning()))
        } else {
            let mut spans = Vec::new();
            for (i, hint) in self.hints.iter().enumerate() {
                if i > 0 {
                    spans.push(Span::styled("  ", Styles::dim()));
                }
                spans.push(Span::styled(hint.key, Styles::key_hint()));
                spans.push(Span::styled(format!(" {}", hint.label), Styles::dim()));
            }
            Line::from(spans)
        };

        buf.set_line(area.x, area.y, &line, area.width);
    }
}
