//! Expanded chat panel: header, message list, suggestions, input and
//! status line.

use chatbot_engine::{MessageView, Sender};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph, Widget},
};

use super::status_bar::StatusBar;
use super::text_input::TextInputState;
use crate::text::{truncate_to_width, wrap_text};
use crate::ui::layout::PanelLayout;
use crate::ui::theme::{Styles, Symbols};

/// Build the display lines for a message list at a given width.
///
/// Bot messages are left aligned and user messages right aligned, each
/// prefixed (or suffixed) by its sender marker. User messages carry their
/// timestamp on the following line.
pub fn message_lines(views: &[MessageView<'_>], width: u16) -> Vec<Line<'static>> {
    let text_width = usize::from(width.saturating_sub(3)).max(1);
    let mut lines = Vec::new();

    for (i, view) in views.iter().enumerate() {
        if i > 0 {
            lines.push(Line::default());
        }

        let wrapped = wrap_text(view.text, text_width);
        match view.message.sender {
            Sender::Bot => {
                for (n, chunk) in wrapped.into_iter().enumerate() {
                    let marker = if n == 0 { Symbols::BOT } else { " " };
                    lines.push(Line::from(vec![
                        Span::styled(format!("{marker} "), Styles::dim()),
                        Span::styled(chunk, Styles::bot_message()),
                    ]));
                }
            }
            Sender::User => {
                for (n, chunk) in wrapped.into_iter().enumerate() {
                    let marker = if n == 0 { Symbols::USER } else { " " };
                    lines.push(
                        Line::from(vec![
                            Span::styled(chunk, Styles::user_message()),
                            Span::styled(format!(" {marker}"), Styles::dim()),
                        ])
                        .alignment(Alignment::Right),
                    );
                }
                if let Some(timestamp) = &view.message.timestamp {
                    lines.push(
                        Line::from(Span::styled(format!("{timestamp}  "), Styles::timestamp()))
                            .alignment(Alignment::Right),
                    );
                }
            }
        }
    }

    lines
}

/// Number of lines the list can scroll up from the latest entry.
pub fn max_scroll(total_lines: usize, viewport: u16) -> u16 {
    u16::try_from(total_lines.saturating_sub(usize::from(viewport))).unwrap_or(u16::MAX)
}

/// The open chat panel.
#[derive(Debug, Clone)]
pub struct ChatPanel<'a> {
    layout: &'a PanelLayout,
    title: &'a str,
    messages: &'a [MessageView<'a>],
    suggestions: &'a [String],
    selected_suggestion: Option<usize>,
    input: &'a TextInputState,
    input_focused: bool,
    placeholder: &'a str,
    scroll: u16,
    status: StatusBar<'a>,
}

impl<'a> ChatPanel<'a> {
    /// Create a panel over a precomputed layout.
    pub fn new(
        layout: &'a PanelLayout,
        messages: &'a [MessageView<'a>],
        input: &'a TextInputState,
    ) -> Self {
        Self {
            layout,
            title: "",
            messages,
            suggestions: &[],
            selected_suggestion: None,
            input,
            input_focused: true,
            placeholder: "",
            scroll: 0,
            status: StatusBar::new(),
        }
    }

    #[must_use]
    pub fn title(mut self, title: &'a str) -> Self {
        self.title = title;
        self
    }

    /// Suggestions to offer, with the keyboard-highlighted one if any.
    #[must_use]
    pub fn suggestions(mut self, suggestions: &'a [String], selected: Option<usize>) -> Self {
        self.suggestions = suggestions;
        self.selected_suggestion = selected;
        self
    }

    #[must_use]
    pub fn input_focused(mut self, focused: bool) -> Self {
        self.input_focused = focused;
        self
    }

    #[must_use]
    pub fn placeholder(mut self, placeholder: &'a str) -> Self {
        self.placeholder = placeholder;
        self
    }

    /// Lines scrolled up from the latest message.
    #[must_use]
    pub fn scroll(mut self, scroll: u16) -> Self {
        self.scroll = scroll;
        self
    }

    #[must_use]
    pub fn status(mut self, status: StatusBar<'a>) -> Self {
        self.status = status;
        self
    }

    fn render_header(&self, buf: &mut Buffer) {
        let header = self.layout.header;
        if header.is_empty() {
            return;
        }
        buf.set_style(header, Styles::header());
        let title_width = usize::from(header.width.saturating_sub(self.layout.close.width + 1));
        let title = truncate_to_width(self.title, title_width);
        buf.set_string(header.x + 1, header.y, title, Styles::header());
        let close = self.layout.close;
        if !close.is_empty() {
            buf.set_string(close.x + close.width / 2, close.y, Symbols::CLOSE, Styles::header());
        }
    }

    fn render_messages(&self, buf: &mut Buffer) {
        let area = self.layout.messages;
        let lines = message_lines(self.messages, area.width);
        let max = max_scroll(lines.len(), area.height);
        let offset = max.saturating_sub(self.scroll.min(max));
        Paragraph::new(lines)
            .style(Styles::default())
            .scroll((offset, 0))
            .render(area, buf);
    }

    fn render_suggestions(&self, buf: &mut Buffer) {
        for (i, (row, suggestion)) in self
            .layout
            .suggestions
            .iter()
            .zip(self.suggestions)
            .enumerate()
        {
            let style = if self.selected_suggestion == Some(i) {
                Styles::suggestion_selected()
            } else {
                Styles::suggestion()
            };
            let width = usize::from(row.width.saturating_sub(2));
            let text = format!(" {} ", truncate_to_width(suggestion, width));
            buf.set_string(row.x, row.y, text, style);
        }
    }

    fn render_input(&self, buf: &mut Buffer) {
        let area = self.layout.input;
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(if self.input_focused {
                Styles::border_active()
            } else {
                Styles::border()
            })
            .style(Styles::default());
        let inner = block.inner(area);
        block.render(area, buf);

        let field = Rect::new(
            inner.x,
            inner.y,
            inner.width.saturating_sub(self.layout.send.width + 1),
            inner.height,
        );
        self.input
            .widget()
            .focused(self.input_focused)
            .placeholder(self.placeholder)
            .render(field, buf);

        let send_style = if self.input.content().trim().is_empty() {
            Styles::dim()
        } else {
            Styles::send()
        };
        let send = self.layout.send;
        if !send.is_empty() {
            buf.set_string(send.x + send.width / 2, send.y, Symbols::SEND, send_style);
        }
    }
}

impl Widget for ChatPanel<'_> {
    fn render(self, _area: Rect, buf: &mut Buffer) {
        let panel = self.layout.panel;
        Clear.render(panel, buf);
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Styles::border())
            .style(Styles::default())
            .render(panel, buf);

        self.render_header(buf);
        self.render_messages(buf);
        self.render_suggestions(buf);
        self.render_input(buf);
        let status_area = self.layout.status;
        self.status.render(status_area, buf);
    }
}
