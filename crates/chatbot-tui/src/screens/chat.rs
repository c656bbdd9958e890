//! The host screen: the launcher while hidden, the panel while open.

use super::Screen;
use crate::app::{App, Focus};
use crate::ui::theme::Styles;
use crate::ui::widgets::{ChatPanel, KeyHint, Launcher, StatusBar};
use ratatui::{buffer::Buffer, layout::Rect, text::Line, widgets::Widget};

/// Narrower terminals show the launcher icon without its label.
const MIN_WIDTH_FOR_LABEL: u16 = 24;

const PANEL_HINTS: [KeyHint; 4] = [
    KeyHint::new("Enter", "send"),
    KeyHint::new("Tab", "suggestions"),
    KeyHint::new("Esc", "close"),
    KeyHint::new("^L", "new chat"),
];

/// Renders the widget over an otherwise empty host page.
pub struct ChatScreen;

impl Screen for ChatScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, Styles::default());
        let config = app.controller.config();

        if !app.controller.is_open() {
            let hint = Line::styled("Enter open  q quit", Styles::dim());
            if area.height > 0 {
                buf.set_line(area.x + 1, area.y, &hint, area.width.saturating_sub(1));
            }
            Launcher::new(&config.launcher_label)
                .show_label(area.width >= MIN_WIDTH_FOR_LABEL)
                .render(area, buf);
            return;
        }

        let layout = app.panel_layout();
        let views = app.controller.message_views();
        // Newest first: the transient notification, then the storage notice.
        let notice = match (app.notification.as_deref(), app.controller.notice()) {
            (Some(transient), Some(storage)) => Some(format!("{transient} · {storage}")),
            (transient, storage) => transient.or(storage).map(str::to_string),
        };
        let status = StatusBar::new()
            .hints(PANEL_HINTS.to_vec())
            .notice(notice.as_deref());

        ChatPanel::new(&layout, &views, &app.input)
            .title(&config.title)
            .placeholder(&config.placeholder)
            .suggestions(app.controller.suggestions(), app.selected_suggestion())
            .input_focused(app.focus == Focus::Input)
            .scroll(app.scroll)
            .status(status)
            .render(area, buf);
    }
}
