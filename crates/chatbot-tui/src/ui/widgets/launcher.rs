//! Collapsed launcher shown while the panel is hidden.

use crate::text::visual_width;
use crate::ui::layout::launcher_layout;
use crate::ui::theme::{Styles, Symbols};
use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Rect},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

/// Round launcher button with a tooltip label beside it.
///
/// Rendered over the whole terminal area; it positions itself in the
/// bottom-right corner.
#[derive(Debug, Clone)]
pub struct Launcher<'a> {
    label: &'a str,
    show_label: bool,
}

impl<'a> Launcher<'a> {
    pub fn new(label: &'a str) -> Self {
        Self {
            label,
            show_label: true,
        }
    }

    /// Show or hide the tooltip label.
    #[must_use]
    pub fn show_label(mut self, show: bool) -> Self {
        self.show_label = show;
        self
    }
}

impl Widget for Launcher<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let label_width = u16::try_from(visual_width(self.label)).unwrap_or(u16::MAX);
        let layout = launcher_layout(area, label_width);

        let button = Paragraph::new(Symbols::LAUNCHER)
            .alignment(Alignment::Center)
            .style(Styles::launcher())
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Styles::launcher()),
            );
        button.render(layout.button, buf);

        if self.show_label && layout.tooltip.width > 0 {
            Paragraph::new(format!(" {} ", self.label))
                .style(Styles::tooltip())
                .render(layout.tooltip, buf);
        }
    }
}
