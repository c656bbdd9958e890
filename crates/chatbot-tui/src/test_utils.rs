//! Test utilities for chatbot-tui rendering tests.

use crate::app::App;
pub use crate::headless::buffer_to_string;
use crate::screens::Screen;
use chatbot_engine::{ConversationStore, FixedClock, WidgetConfig, WidgetController};
use chrono::NaiveDate;
use ratatui::{backend::TestBackend, buffer::Buffer, layout::Rect, Terminal};

/// Default terminal width for tests.
pub const TEST_WIDTH: u16 = 80;

/// Default terminal height for tests.
pub const TEST_HEIGHT: u16 = 24;

/// Create a test terminal with the default dimensions (80x24).
pub fn create_test_terminal() -> Terminal<TestBackend> {
    let backend = TestBackend::new(TEST_WIDTH, TEST_HEIGHT);
    Terminal::new(backend).expect("Failed to create test terminal")
}

/// Controller over an in-memory store with the clock fixed at
/// 2024-01-01 09:00.
pub fn create_test_controller() -> WidgetController {
    let at = NaiveDate::from_ymd_opt(2024, 1, 1)
        .and_then(|d| d.and_hms_opt(9, 0, 0))
        .expect("valid test date");
    WidgetController::new(
        WidgetConfig::default(),
        ConversationStore::in_memory(),
        Box::new(FixedClock(at)),
    )
}

/// Create a test app with the panel hidden.
pub fn create_test_app() -> App {
    App::new(create_test_controller(), (TEST_WIDTH, TEST_HEIGHT))
}

/// Render a screen at the default size and return it as a string.
pub fn render_to_string<S: Screen>(screen: &S, app: &App) -> String {
    let area = Rect::new(0, 0, TEST_WIDTH, TEST_HEIGHT);
    let mut buffer = Buffer::empty(area);
    screen.render(app, area, &mut buffer);
    buffer_to_string(&buffer)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_test_terminal() {
        let terminal = create_test_terminal();
        let size = terminal.size().unwrap();
        assert_eq!(size.width, TEST_WIDTH);
        assert_eq!(size.height, TEST_HEIGHT);
    }

    #[test]
    fn test_create_test_app_starts_hidden() {
        let app = create_test_app();
        assert!(!app.controller.is_open());
        assert_eq!(app.terminal_size, (TEST_WIDTH, TEST_HEIGHT));
    }

    #[test]
    fn test_buffer_to_string() {
        let area = Rect::new(0, 0, 10, 3);
        let mut buffer = Buffer::empty(area);
        buffer.set_string(0, 0, "Hello", ratatui::style::Style::default());
        buffer.set_string(0, 1, "World", ratatui::style::Style::default());

        assert_eq!(buffer_to_string(&buffer), "Hello\nWorld\n");
    }
}
