//! Terminal event handling for the chat widget.

use crossterm::event::{
    self, Event as CrosstermEvent, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, MouseButton,
    MouseEvent, MouseEventKind,
};
use std::time::Duration;
use tokio::sync::mpsc;

/// Events that can occur in the TUI.
#[derive(Debug, Clone)]
pub enum Event {
    /// A key was pressed.
    Key(KeyEvent),
    /// A mouse event occurred.
    Mouse(MouseEvent),
    /// A tick event for UI updates.
    Tick,
    /// Terminal was resized.
    Resize(u16, u16),
}

/// Reads terminal events on a background thread.
pub struct EventHandler {
    rx: mpsc::UnboundedReceiver<Event>,
    _tx: mpsc::UnboundedSender<Event>,
}

impl EventHandler {
    /// Create a new event handler with the specified tick rate.
    pub fn new(tick_rate_ms: u64) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let tx_clone = tx.clone();

        // crossterm polling is blocking, so it gets its own thread
        std::thread::spawn(move || {
            let tick_rate = Duration::from_millis(tick_rate_ms);
            loop {
                let event = if event::poll(tick_rate).unwrap_or(false) {
                    match event::read() {
                        Ok(CrosstermEvent::Key(key)) if key.kind != KeyEventKind::Release => {
                            Some(Event::Key(key))
                        }
                        Ok(CrosstermEvent::Mouse(mouse)) => Some(Event::Mouse(mouse)),
                        Ok(CrosstermEvent::Resize(w, h)) => Some(Event::Resize(w, h)),
                        _ => None,
                    }
                } else {
                    Some(Event::Tick)
                };

                if let Some(e) = event {
                    if tx_clone.send(e).is_err() {
                        break;
                    }
                }
            }
        });

        Self { rx, _tx: tx }
    }

    /// Get the next event, waiting until one is available.
    pub async fn next(&mut self) -> Option<Event> {
        self.rx.recv().await
    }
}

/// User intent derived from a key or mouse event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Quit,
    /// Expand the panel from the launcher.
    Open,
    /// Collapse the panel.
    Close,
    /// Send the input, or pick the highlighted suggestion.
    Submit,
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
    /// Move focus between the input and the suggestions.
    NextFocus,
    Up,
    Down,
    ScrollUp,
    ScrollDown,
    /// Start a new conversation.
    Reset,
    /// Left click at a terminal cell.
    Click { column: u16, row: u16 },
    None,
}

/// Convert a key event to an action. `open` is whether the panel is shown.
pub fn key_to_action(key: KeyEvent, open: bool) -> Action {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    if ctrl && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    if !open {
        return match key.code {
            KeyCode::Enter | KeyCode::Char(' ' | 'o') => Action::Open,
            KeyCode::Char('q') | KeyCode::Esc => Action::Quit,
            _ => Action::None,
        };
    }

    if ctrl {
        return match key.code {
            KeyCode::Char('l') => Action::Reset,
            _ => Action::None,
        };
    }

    match key.code {
        KeyCode::Esc => Action::Close,
        KeyCode::Enter => Action::Submit,
        KeyCode::Tab | KeyCode::BackTab => Action::NextFocus,
        KeyCode::Up => Action::Up,
        KeyCode::Down => Action::Down,
        KeyCode::PageUp => Action::ScrollUp,
        KeyCode::PageDown => Action::ScrollDown,
        KeyCode::Backspace => Action::Backspace,
        KeyCode::Delete => Action::Delete,
        KeyCode::Left => Action::Left,
        KeyCode::Right => Action::Right,
        KeyCode::Home => Action::Home,
        KeyCode::End => Action::End,
        KeyCode::Char(c) => Action::Insert(c),
        _ => Action::None,
    }
}

/// Convert a mouse event to an action.
pub fn mouse_to_action(mouse: MouseEvent) -> Action {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => Action::Click {
            column: mouse.column,
            row: mouse.row,
        },
        MouseEventKind::ScrollUp => Action::ScrollUp,
        MouseEventKind::ScrollDown => Action::ScrollDown,
        _ => Action::None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(c: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    #[test]
    fn test_ctrl_c_always_quits() {
        assert_eq!(key_to_action(ctrl('c'), false), Action::Quit);
        assert_eq!(key_to_action(ctrl('c'), true), Action::Quit);
    }

    #[test]
    fn test_launcher_keys() {
        assert_eq!(key_to_action(key(KeyCode::Enter), false), Action::Open);
        assert_eq!(key_to_action(key(KeyCode::Char('o')), false), Action::Open);
        assert_eq!(key_to_action(key(KeyCode::Char('q')), false), Action::Quit);
        assert_eq!(key_to_action(key(KeyCode::Char('x')), false), Action::None);
    }

    #[test]
    fn test_panel_keys() {
        assert_eq!(key_to_action(key(KeyCode::Esc), true), Action::Close);
        assert_eq!(key_to_action(key(KeyCode::Enter), true), Action::Submit);
        assert_eq!(key_to_action(key(KeyCode::Tab), true), Action::NextFocus);
        assert_eq!(key_to_action(ctrl('l'), true), Action::Reset);
    }

    #[test]
    fn test_typing_in_panel_inserts() {
        assert_eq!(key_to_action(key(KeyCode::Char('q')), true), Action::Insert('q'));
        assert_eq!(key_to_action(key(KeyCode::Char(' ')), true), Action::Insert(' '));
        assert_eq!(key_to_action(key(KeyCode::Backspace), true), Action::Backspace);
    }

    #[test]
    fn test_shifted_chars_insert() {
        let upper = KeyEvent::new(KeyCode::Char('A'), KeyModifiers::SHIFT);
        assert_eq!(key_to_action(upper, true), Action::Insert('A'));
    }

    #[test]
    fn test_mouse_click() {
        let click = MouseEvent {
            kind: MouseEventKind::Down(MouseButton::Left),
            column: 3,
            row: 7,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_to_action(click), Action::Click { column: 3, row: 7 });
    }

    #[test]
    fn test_mouse_wheel_scrolls() {
        let wheel = MouseEvent {
            kind: MouseEventKind::ScrollUp,
            column: 0,
            row: 0,
            modifiers: KeyModifiers::NONE,
        };
        assert_eq!(mouse_to_action(wheel), Action::ScrollUp);
    }
}
