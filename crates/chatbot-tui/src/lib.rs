//! chatbot-tui: Terminal front end for the chatbot widget
//!
//! This crate mounts a [`chatbot_engine::WidgetController`] in the terminal:
//! - A launcher in the bottom-right corner that expands into the panel
//! - The chat panel with messages, suggestions and an input line
//! - Headless mode for testing and automation

mod app;
mod event;
pub mod headless;
mod screens;
#[cfg(test)]
pub mod test_utils;
mod text;
mod ui;

use screens::{chat::ChatScreen, Screen};

pub use app::{App, Focus};
pub use chatbot_engine;
pub use event::{key_to_action, mouse_to_action, Action, Event, EventHandler};

use chatbot_engine::WidgetController;
use crossterm::{
    cursor::Show as ShowCursor,
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, stdout};
use tracing::info;

/// Tick rate of the terminal event thread (ms).
const TICK_RATE_MS: u64 = 250;

/// RAII guard for terminal state restoration.
struct TerminalGuard;

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(stdout(), DisableMouseCapture, LeaveAlternateScreen, ShowCursor);
    }
}

/// Mount the widget in the terminal and run until the user quits.
///
/// The controller is shut down (all timers cancelled) before returning.
pub async fn run_tui(controller: WidgetController) -> Result<(), Box<dyn std::error::Error>> {
    enable_raw_mode()?;
    let _guard = TerminalGuard;

    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let size = terminal.size()?;
    let mut app = App::new(controller, (size.width, size.height));
    let mut events = EventHandler::new(TICK_RATE_MS);
    info!("Widget mounted");

    let result = run_loop(&mut terminal, &mut app, &mut events).await;

    app.controller.shutdown();
    info!("Widget unmounted");
    terminal.show_cursor()?;

    result
}

async fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    app: &mut App,
    events: &mut EventHandler,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            ChatScreen.render(app, area, frame.buffer_mut());
        })?;

        if app.should_quit {
            return Ok(());
        }

        tokio::select! {
            event = events.next() => match event {
                Some(Event::Key(key)) => {
                    let action = key_to_action(key, app.controller.is_open());
                    app.handle_action(action);
                }
                Some(Event::Mouse(mouse)) => app.handle_action(mouse_to_action(mouse)),
                Some(Event::Resize(width, height)) => app.resize(width, height),
                Some(Event::Tick) => app.tick(),
                None => return Ok(()),
            },
            Some(timer) = app.controller.next_timer_event() => app.on_timer(timer),
        }
    }
}

/// Returns the TUI version.
pub fn tui_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{create_test_app, render_to_string};
    use insta::assert_snapshot;

    #[test]
    fn test_tui_version() {
        let version = tui_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }

    #[test]
    fn test_snapshot_hidden_hint_line() {
        let app = create_test_app();
        let screen = render_to_string(&ChatScreen, &app);
        let first_line = screen.lines().next().unwrap_or_default().trim();
        assert_snapshot!(first_line, @"Enter open  q quit");
    }

    #[tokio::test(start_paused = true)]
    async fn test_key_flow_open_type_close() {
        use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

        let mut app = create_test_app();
        let press = |app: &mut App, code: KeyCode| {
            let action = key_to_action(
                KeyEvent::new(code, KeyModifiers::NONE),
                app.controller.is_open(),
            );
            app.handle_action(action);
        };

        press(&mut app, KeyCode::Enter);
        assert!(app.controller.is_open());

        press(&mut app, KeyCode::Char('h'));
        press(&mut app, KeyCode::Char('i'));
        assert_eq!(app.controller.input(), "hi");

        press(&mut app, KeyCode::Esc);
        assert!(!app.controller.is_open());

        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_quit);
    }
}
