//! Theme and styling definitions for the chat widget.

use ratatui::style::{Color, Modifier, Style};

/// Color palette for the widget.
pub struct Palette;

impl Palette {
    // Base colors
    pub const BG: Color = Color::Rgb(255, 255, 255);
    pub const FG: Color = Color::Rgb(17, 24, 39);
    pub const DIM: Color = Color::Rgb(107, 114, 128);

    // Brand yellow used by the header, launcher and send control
    pub const ACCENT: Color = Color::Rgb(234, 203, 4);
    pub const ACCENT_DARK: Color = Color::Rgb(202, 138, 4);
    pub const ON_ACCENT: Color = Color::Rgb(0, 0, 0);

    // Message bubbles
    pub const USER_BUBBLE: Color = Color::Rgb(209, 213, 219);
    pub const BOT_BUBBLE: Color = Color::Rgb(243, 244, 246);

    // Suggestions
    pub const SUGGESTION_BG: Color = Color::Rgb(254, 249, 195);

    // Status colors
    pub const WARNING: Color = Color::Rgb(180, 83, 9);

    // Border colors
    pub const BORDER: Color = Color::Rgb(209, 213, 219);
    pub const BORDER_ACTIVE: Color = Color::Rgb(234, 203, 4);
}

/// Marker glyphs drawn in front of messages.
pub struct Symbols;

impl Symbols {
    pub const USER: &'static str = "▣";
    pub const BOT: &'static str = "●";
    pub const CLOSE: &'static str = "×";
    pub const SEND: &'static str = "➤";
    pub const LAUNCHER: &'static str = "◆";
    pub const CURSOR: &'static str = "▏";
}

/// Common styles used throughout the widget.
pub struct Styles;

impl Styles {
    /// Default text style.
    pub fn default() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BG)
    }

    /// Dimmed text for secondary information.
    pub fn dim() -> Style {
        Style::default().fg(Palette::DIM).bg(Palette::BG)
    }

    /// Panel header bar.
    pub fn header() -> Style {
        Style::default()
            .fg(Palette::ON_ACCENT)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Launcher button.
    pub fn launcher() -> Style {
        Style::default()
            .fg(Palette::ON_ACCENT)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Launcher tooltip label.
    pub fn tooltip() -> Style {
        Style::default().fg(Palette::BG).bg(Palette::FG)
    }

    /// User message text.
    pub fn user_message() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::USER_BUBBLE)
    }

    /// Bot message text.
    pub fn bot_message() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::BOT_BUBBLE)
    }

    /// Timestamp under a user message.
    pub fn timestamp() -> Style {
        Style::default()
            .fg(Palette::DIM)
            .bg(Palette::BG)
            .add_modifier(Modifier::ITALIC)
    }

    /// Suggestion chip.
    pub fn suggestion() -> Style {
        Style::default().fg(Palette::FG).bg(Palette::SUGGESTION_BG)
    }

    /// Suggestion chip under the keyboard cursor.
    pub fn suggestion_selected() -> Style {
        Style::default()
            .fg(Palette::ON_ACCENT)
            .bg(Palette::ACCENT)
            .add_modifier(Modifier::BOLD)
    }

    /// Send control.
    pub fn send() -> Style {
        Style::default().fg(Palette::ACCENT_DARK).bg(Palette::BG)
    }

    /// Storage notice in the status line.
    pub fn warning() -> Style {
        Style::default().fg(Palette::WARNING).bg(Palette::BG)
    }

    /// Key hint style (for status line).
    pub fn key_hint() -> Style {
        Style::default()
            .fg(Palette::FG)
            .bg(Palette::BG)
            .add_modifier(Modifier::BOLD)
    }

    /// Border style for inactive elements.
    pub fn border() -> Style {
        Style::default().fg(Palette::BORDER).bg(Palette::BG)
    }

    /// Border style for active/focused elements.
    pub fn border_active() -> Style {
        Style::default().fg(Palette::BORDER_ACTIVE).bg(Palette::BG)
    }
}
