//! Layout helpers for the chat widget.
//!
//! The launcher and the panel are both anchored to the bottom-right corner
//! of the terminal. Layouts are pure functions of the terminal area so the
//! renderer and mouse hit-testing always agree.

use ratatui::layout::{Constraint, Direction, Layout, Position, Rect};

/// Widest the panel grows, in cells.
pub const PANEL_MAX_WIDTH: u16 = 56;

/// Gap kept between the widget and the terminal edges.
pub const EDGE_MARGIN: u16 = 1;

/// Launcher button size.
pub const LAUNCHER_WIDTH: u16 = 5;
pub const LAUNCHER_HEIGHT: u16 = 3;

/// Rows used by the input box, including its border.
const INPUT_HEIGHT: u16 = 3;

/// Rects for the collapsed launcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LauncherLayout {
    /// Clickable button.
    pub button: Rect,
    /// Tooltip label to the left of the button.
    pub tooltip: Rect,
}

/// Rects for the open panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLayout {
    /// Outer panel including its border.
    pub panel: Rect,
    /// Header bar with the title.
    pub header: Rect,
    /// Close control inside the header.
    pub close: Rect,
    /// Scrollable message list.
    pub messages: Rect,
    /// One row per visible suggestion.
    pub suggestions: Vec<Rect>,
    /// Input box including its border.
    pub input: Rect,
    /// Send control inside the input box.
    pub send: Rect,
    /// Status line under the input.
    pub status: Rect,
}

impl PanelLayout {
    /// Index of the suggestion row containing `pos`.
    pub fn suggestion_at(&self, pos: Position) -> Option<usize> {
        self.suggestions.iter().position(|r| r.contains(pos))
    }
}

/// Compute the launcher rects for a terminal area.
pub fn launcher_layout(area: Rect, label_width: u16) -> LauncherLayout {
    let width = LAUNCHER_WIDTH.min(area.width);
    let height = LAUNCHER_HEIGHT.min(area.height);
    let x = area.right().saturating_sub(width + EDGE_MARGIN).max(area.x);
    let y = area.bottom().saturating_sub(height + EDGE_MARGIN).max(area.y);
    let button = Rect::new(x, y, width, height);

    let tooltip_width = (label_width + 2).min(x.saturating_sub(area.x));
    let tooltip = Rect::new(
        x.saturating_sub(tooltip_width + 1).max(area.x),
        y + height / 2,
        tooltip_width,
        1.min(height),
    );

    LauncherLayout { button, tooltip }
}

/// Compute the outer panel rect for a terminal area.
pub fn panel_rect(area: Rect) -> Rect {
    let width = area
        .width
        .saturating_sub(EDGE_MARGIN * 2)
        .min(PANEL_MAX_WIDTH)
        .max(area.width.min(20));
    let height = (area.height.saturating_mul(9) / 10).max(area.height.min(12));
    let x = area.right().saturating_sub(width + EDGE_MARGIN).max(area.x);
    let y = area.bottom().saturating_sub(height).max(area.y);
    Rect::new(x, y, width.min(area.width), height.min(area.height))
}

/// Compute every panel rect for a terminal area and suggestion count.
pub fn panel_layout(area: Rect, suggestion_count: usize) -> PanelLayout {
    let panel = panel_rect(area);
    let inner = Rect::new(
        panel.x + 1,
        panel.y + 1,
        panel.width.saturating_sub(2),
        panel.height.saturating_sub(2),
    );

    // Always leave at least one row for messages.
    let fixed = 1 + INPUT_HEIGHT + 1;
    let available = inner.height.saturating_sub(fixed + 1);
    let suggestion_rows = u16::try_from(suggestion_count)
        .unwrap_or(u16::MAX)
        .min(available);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(1),
            Constraint::Length(suggestion_rows),
            Constraint::Length(INPUT_HEIGHT),
            Constraint::Length(1),
        ])
        .split(inner);

    // Short terminals squeeze sections to nothing; controls are clipped to
    // their section so they never point outside the panel.
    let header = chunks[0];
    let close = Rect::new(header.right().saturating_sub(3), header.y, 3, 1)
        .intersection(header);
    let suggestions = (0..chunks[2].height)
        .map(|i| Rect::new(chunks[2].x, chunks[2].y + i, chunks[2].width, 1))
        .collect();
    let input = chunks[3];
    let send = Rect::new(input.right().saturating_sub(4), input.y + 1, 3, 1)
        .intersection(input);

    PanelLayout {
        panel,
        header,
        close,
        messages: chunks[1],
        suggestions,
        input,
        send,
        status: chunks[4],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launcher_anchored_bottom_right() {
        let area = Rect::new(0, 0, 80, 24);
        let layout = launcher_layout(area, 6);

        assert_eq!(layout.button, Rect::new(74, 20, 5, 3));
        assert_eq!(layout.tooltip.y, 21);
        assert_eq!(layout.tooltip.width, 8);
        assert!(layout.tooltip.right() < layout.button.x);
    }

    #[test]
    fn test_panel_capped_width() {
        let panel = panel_rect(Rect::new(0, 0, 120, 40));
        assert_eq!(panel.width, PANEL_MAX_WIDTH);
        assert_eq!(panel.right(), 119);
        assert_eq!(panel.bottom(), 40);
        assert_eq!(panel.height, 36);
    }

    #[test]
    fn test_panel_fits_narrow_terminal() {
        let area = Rect::new(0, 0, 30, 10);
        let panel = panel_rect(area);
        assert!(panel.width <= area.width);
        assert!(panel.height <= area.height);
    }

    #[test]
    fn test_panel_layout_sections_stack() {
        let layout = panel_layout(Rect::new(0, 0, 80, 24), 1);

        assert_eq!(layout.header.y, layout.panel.y + 1);
        assert_eq!(layout.messages.y, layout.header.bottom());
        assert_eq!(layout.suggestions.len(), 1);
        assert_eq!(layout.suggestions[0].y, layout.messages.bottom());
        assert_eq!(layout.input.y, layout.suggestions[0].bottom());
        assert_eq!(layout.status.y, layout.input.bottom());
        assert_eq!(layout.close.right(), layout.header.right());
    }

    #[test]
    fn test_suggestions_never_crowd_out_messages() {
        let layout = panel_layout(Rect::new(0, 0, 40, 12), 50);
        assert!(layout.messages.height >= 1);
    }

    #[test]
    fn test_short_terminal_keeps_rects_inside_area() {
        for height in 0..=8 {
            let area = Rect::new(0, 0, 80, height);
            let layout = panel_layout(area, 1);

            let drawn = [
                layout.header,
                layout.close,
                layout.send,
                layout.input,
                layout.status,
            ];
            for rect in drawn {
                if !rect.is_empty() {
                    assert!(rect.bottom() <= area.bottom(), "height {height}: {rect:?}");
                }
            }
            assert!(layout.close.is_empty() || layout.header.contains(layout.close.as_position()));
        }
    }

    #[test]
    fn test_suggestion_hit_test() {
        let layout = panel_layout(Rect::new(0, 0, 80, 24), 2);
        let second = layout.suggestions[1];

        assert_eq!(
            layout.suggestion_at(Position::new(second.x + 2, second.y)),
            Some(1)
        );
        assert_eq!(
            layout.suggestion_at(Position::new(layout.header.x, layout.header.y)),
            None
        );
    }
}
