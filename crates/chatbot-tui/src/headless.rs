//! Headless mode for the chat widget.
//!
//! Runs the widget against a [`TestBackend`] instead of a real terminal.
//! Actions are sent over a channel and the rendered screen is published
//! after every draw, which makes end-to-end tests and scripted demos
//! possible without a tty.

use crate::app::App;
use crate::event::Action;
use crate::screens::{chat::ChatScreen, Screen};
use chatbot_engine::{WidgetController, WidgetState};
use ratatui::{backend::TestBackend, buffer::Buffer, Terminal};
use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

/// Default terminal dimensions for headless mode.
pub const DEFAULT_WIDTH: u16 = 80;
pub const DEFAULT_HEIGHT: u16 = 24;

/// State captured from the headless widget after each render.
#[derive(Debug, Clone, Default)]
pub struct HeadlessState {
    /// Controller state.
    pub widget_state: WidgetState,
    /// Number of stored messages.
    pub message_count: usize,
    /// Text contents of the terminal buffer.
    pub screen_contents: String,
    /// Whether the loop has been asked to quit.
    pub should_quit: bool,
}

/// Handle to control a headless widget instance.
pub struct HeadlessHandle {
    action_tx: mpsc::UnboundedSender<Action>,
    state_rx: watch::Receiver<HeadlessState>,
}

impl HeadlessHandle {
    /// Send an action to the widget.
    ///
    /// Returns `true` if the action was sent successfully.
    pub fn send_action(&self, action: Action) -> bool {
        self.action_tx.send(action).is_ok()
    }

    /// Type a string into the input, one character at a time.
    pub fn type_text(&self, text: &str) -> bool {
        text.chars().all(|c| self.send_action(Action::Insert(c)))
    }

    /// Get the latest published state.
    pub fn state(&self) -> HeadlessState {
        self.state_rx.borrow().clone()
    }

    /// Wait until a condition holds on the state.
    ///
    /// Returns the state when the condition is met, or `None` if timed out.
    pub async fn wait_for<F>(&mut self, condition: F, timeout: Duration) -> Option<HeadlessState>
    where
        F: Fn(&HeadlessState) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;

        loop {
            let state = self.state();
            if condition(&state) {
                return Some(state);
            }

            let remaining = deadline.saturating_duration_since(tokio::time::Instant::now());
            if remaining.is_zero() {
                return None;
            }

            match tokio::time::timeout(remaining, self.state_rx.changed()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) | Err(_) => return None,
            }
        }
    }

    /// Wait for specific text to appear on screen.
    pub async fn wait_for_text(&mut self, text: &str, timeout: Duration) -> Option<HeadlessState> {
        self.wait_for(|s| s.screen_contents.contains(text), timeout)
            .await
    }

    /// Wait for the controller to reach `state`.
    pub async fn wait_for_state(
        &mut self,
        state: WidgetState,
        timeout: Duration,
    ) -> Option<HeadlessState> {
        self.wait_for(|s| s.widget_state == state, timeout).await
    }
}

/// Configuration for headless mode.
#[derive(Debug, Clone)]
pub struct HeadlessConfig {
    /// Terminal width.
    pub width: u16,
    /// Terminal height.
    pub height: u16,
    /// Tick rate in milliseconds.
    pub tick_rate_ms: u64,
}

impl Default for HeadlessConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            tick_rate_ms: 50,
        }
    }
}

/// Run the widget in headless mode.
///
/// Returns a handle to drive it and the join handle of the background
/// task. The task ends after [`Action::Quit`] or when the handle drops.
pub fn run_tui_headless(
    controller: WidgetController,
    config: HeadlessConfig,
) -> (HeadlessHandle, JoinHandle<Result<(), String>>) {
    let (action_tx, action_rx) = mpsc::unbounded_channel();
    let (state_tx, state_rx) = watch::channel(HeadlessState::default());

    let task = tokio::spawn(async move {
        run_headless_loop(controller, config, action_rx, state_tx)
            .await
            .map_err(|e| e.to_string())
    });

    (
        HeadlessHandle {
            action_tx,
            state_rx,
        },
        task,
    )
}

async fn run_headless_loop(
    controller: WidgetController,
    config: HeadlessConfig,
    mut action_rx: mpsc::UnboundedReceiver<Action>,
    state_tx: watch::Sender<HeadlessState>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let backend = TestBackend::new(config.width, config.height);
    let mut terminal = Terminal::new(backend)?;
    let mut app = App::new(controller, (config.width, config.height));
    let tick = Duration::from_millis(config.tick_rate_ms);

    loop {
        terminal.draw(|frame| {
            let area = frame.area();
            ChatScreen.render(&app, area, frame.buffer_mut());
        })?;

        let _ = state_tx.send(HeadlessState {
            widget_state: app.controller.state(),
            message_count: app.controller.store().len(),
            screen_contents: buffer_to_string(terminal.backend().buffer()),
            should_quit: app.should_quit,
        });

        if app.should_quit {
            break;
        }

        tokio::select! {
            action = action_rx.recv() => match action {
                Some(action) => app.handle_action(action),
                None => break,
            },
            Some(event) = app.controller.next_timer_event() => app.on_timer(event),
            () = tokio::time::sleep(tick) => app.tick(),
        }
    }

    app.controller.shutdown();
    Ok(())
}

/// Convert a buffer to a string, one line per row with trailing
/// whitespace trimmed.
pub fn buffer_to_string(buffer: &Buffer) -> String {
    let area = buffer.area;
    let mut result = String::new();

    for y in area.y..area.y + area.height {
        for x in area.x..area.x + area.width {
            if let Some(cell) = buffer.cell((x, y)) {
                result.push_str(cell.symbol());
            }
        }
        while result.ends_with(' ') {
            result.pop();
        }
        result.push('\n');
    }

    if result.ends_with('\n') {
        result.pop();
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::create_test_controller;

    const TIMEOUT: Duration = Duration::from_secs(10);

    #[tokio::test(start_paused = true)]
    async fn test_headless_starts_hidden() {
        let (mut handle, task) =
            run_tui_headless(create_test_controller(), HeadlessConfig::default());

        let state = handle.wait_for_text("Ask AI", TIMEOUT).await.unwrap();
        assert_eq!(state.widget_state, WidgetState::Hidden);
        assert_eq!(state.message_count, 0);

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_full_conversation() {
        let (mut handle, task) =
            run_tui_headless(create_test_controller(), HeadlessConfig::default());

        handle.send_action(Action::Open);
        let state = handle.wait_for_text("Good morning!", TIMEOUT).await.unwrap();
        assert_eq!(state.widget_state, WidgetState::Idle);

        handle.type_text("Hello");
        handle.send_action(Action::Submit);
        handle
            .wait_for_state(WidgetState::AwaitingReply, TIMEOUT)
            .await
            .unwrap();

        handle
            .wait_for_state(WidgetState::Revealing, TIMEOUT)
            .await
            .unwrap();
        let state = handle.wait_for_state(WidgetState::Idle, TIMEOUT).await.unwrap();
        assert_eq!(state.message_count, 3);
        assert!(state.screen_contents.contains("Lorem ipsum dolor sit amet"));

        handle.send_action(Action::Quit);
        task.await.unwrap().unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_headless_ends_when_handle_drops() {
        let (handle, task) = run_tui_headless(create_test_controller(), HeadlessConfig::default());
        drop(handle);
        task.await.unwrap().unwrap();
    }
}
