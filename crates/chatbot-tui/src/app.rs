//! Application state and update logic for the chat widget.

use crate::event::Action;
use crate::text::visual_width;
use crate::ui::layout::{launcher_layout, panel_layout, PanelLayout};
use crate::ui::widgets::{max_scroll, message_lines, TextInputState};
use chatbot_engine::{SubmitError, TimerEvent, WidgetController};
use ratatui::layout::{Position, Rect};
use tracing::debug;

/// Ticks a transient notification stays visible.
const NOTIFICATION_TICKS: usize = 12;

/// Lines moved per scroll step.
const SCROLL_STEP: u16 = 3;

/// Which part of the panel receives typing and Enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Input,
    /// Keyboard cursor is on the suggestion at this index.
    Suggestions(usize),
}

/// Main application state.
#[derive(Debug)]
pub struct App {
    /// The widget being driven.
    pub controller: WidgetController,
    /// Editable copy of the input field.
    pub input: TextInputState,
    pub focus: Focus,
    /// Lines scrolled up from the latest message (0 follows new messages).
    pub scroll: u16,
    /// Last known terminal size.
    pub terminal_size: (u16, u16),
    pub should_quit: bool,
    /// Transient message shown in the status line.
    pub notification: Option<String>,
    notification_ttl: usize,
}

impl App {
    /// Create the app around a controller.
    pub fn new(controller: WidgetController, terminal_size: (u16, u16)) -> Self {
        let mut input = TextInputState::new();
        input.set(controller.input());
        Self {
            controller,
            input,
            focus: Focus::Input,
            scroll: 0,
            terminal_size,
            should_quit: false,
            notification: None,
            notification_ttl: 0,
        }
    }

    /// Terminal area as a rect.
    pub fn area(&self) -> Rect {
        Rect::new(0, 0, self.terminal_size.0, self.terminal_size.1)
    }

    /// Current panel layout.
    pub fn panel_layout(&self) -> PanelLayout {
        panel_layout(self.area(), self.controller.suggestions().len())
    }

    /// Index of the keyboard-highlighted suggestion.
    pub fn selected_suggestion(&self) -> Option<usize> {
        match self.focus {
            Focus::Suggestions(i) => Some(i),
            Focus::Input => None,
        }
    }

    /// Handle an action.
    pub fn handle_action(&mut self, action: Action) {
        if action != Action::None {
            debug!(?action, state = ?self.controller.state(), "Handling action");
        }
        match action {
            Action::Quit => self.should_quit = true,
            Action::Open => self.open(),
            Action::Close => self.controller.close(),
            Action::Submit => match self.focus {
                Focus::Suggestions(i) => self.pick_suggestion(i),
                Focus::Input => self.submit(),
            },
            Action::Insert(c) => self.edit(|input| input.insert(c)),
            Action::Backspace => self.edit(TextInputState::backspace),
            Action::Delete => self.edit(TextInputState::delete),
            Action::Left => self.move_cursor(TextInputState::move_left),
            Action::Right => self.move_cursor(TextInputState::move_right),
            Action::Home => self.move_cursor(TextInputState::move_home),
            Action::End => self.move_cursor(TextInputState::move_end),
            Action::NextFocus => match self.focus {
                Focus::Input if !self.controller.suggestions().is_empty() => {
                    self.focus = Focus::Suggestions(0);
                }
                Focus::Input => {}
                Focus::Suggestions(_) => self.focus_input(),
            },
            Action::Up => match self.focus {
                Focus::Suggestions(i) => self.focus = Focus::Suggestions(i.saturating_sub(1)),
                Focus::Input => self.scroll_by(1),
            },
            Action::Down => match self.focus {
                Focus::Suggestions(i) => {
                    let last = self.controller.suggestions().len().saturating_sub(1);
                    self.focus = Focus::Suggestions((i + 1).min(last));
                }
                Focus::Input if !self.controller.suggestions().is_empty() => {
                    self.focus = Focus::Suggestions(0);
                }
                Focus::Input => self.scroll_by(-1),
            },
            Action::ScrollUp => self.scroll_by(i32::from(SCROLL_STEP)),
            Action::ScrollDown => self.scroll_by(-i32::from(SCROLL_STEP)),
            Action::Reset => {
                self.controller.reset_conversation();
                self.focus = Focus::Input;
                self.scroll = 0;
            }
            Action::Click { column, row } => self.click(Position::new(column, row)),
            Action::None => {}
        }
        self.sync();
    }

    /// Handle a timer event from the controller.
    pub fn on_timer(&mut self, event: TimerEvent) {
        self.controller.handle_timer_event(event);
        self.sync();
    }

    /// Called on each tick.
    pub fn tick(&mut self) {
        self.controller.process_timer_events();
        if self.notification_ttl > 0 {
            self.notification_ttl -= 1;
            if self.notification_ttl == 0 {
                self.notification = None;
            }
        }
        self.sync();
    }

    /// Record a new terminal size.
    pub fn resize(&mut self, width: u16, height: u16) {
        self.terminal_size = (width, height);
        self.scroll = self.scroll.min(self.max_scroll());
    }

    fn open(&mut self) {
        self.controller.open();
        self.focus = Focus::Input;
        self.scroll = 0;
    }

    fn submit(&mut self) {
        match self.controller.submit() {
            Ok(outcome) => {
                debug!(?outcome, "Message submitted");
                self.input.clear();
            }
            Err(SubmitError::Busy) => {
                self.set_notification("Reply in progress".to_string());
            }
            Err(SubmitError::Blank | SubmitError::Closed) => {}
        }
    }

    fn pick_suggestion(&mut self, index: usize) {
        if let Some(text) = self.controller.select_suggestion(index) {
            self.input.set(text);
        }
        self.focus = Focus::Input;
    }

    fn focus_input(&mut self) {
        self.controller.focus_input();
        self.focus = Focus::Input;
    }

    fn edit(&mut self, f: impl FnOnce(&mut TextInputState)) {
        if !self.controller.is_open() {
            return;
        }
        if self.focus != Focus::Input {
            self.focus_input();
        }
        f(&mut self.input);
        self.controller.set_input(self.input.content());
    }

    fn move_cursor(&mut self, f: impl FnOnce(&mut TextInputState)) {
        if self.focus == Focus::Input {
            f(&mut self.input);
        }
    }

    fn click(&mut self, pos: Position) {
        if !self.controller.is_open() {
            let label_width =
                u16::try_from(visual_width(&self.controller.config().launcher_label))
                    .unwrap_or(u16::MAX);
            let launcher = launcher_layout(self.area(), label_width);
            if launcher.button.contains(pos) || launcher.tooltip.contains(pos) {
                self.open();
            }
            return;
        }

        let layout = self.panel_layout();
        if layout.close.contains(pos) {
            self.controller.close();
        } else if let Some(index) = layout.suggestion_at(pos) {
            if index < self.controller.suggestions().len() {
                self.pick_suggestion(index);
            }
        } else if layout.send.contains(pos) {
            self.focus = Focus::Input;
            self.submit();
        } else if layout.input.contains(pos) {
            self.focus_input();
        }
    }

    fn scroll_by(&mut self, delta: i32) {
        let next = (i32::from(self.scroll) + delta).clamp(0, i32::from(self.max_scroll()));
        self.scroll = u16::try_from(next).unwrap_or(0);
    }

    fn max_scroll(&self) -> u16 {
        if !self.controller.is_open() {
            return 0;
        }
        let layout = self.panel_layout();
        let views = self.controller.message_views();
        let lines = message_lines(&views, layout.messages.width);
        max_scroll(lines.len(), layout.messages.height)
    }

    /// Keep view state consistent with the controller after a change.
    fn sync(&mut self) {
        if self.controller.take_scroll_request() {
            self.scroll = 0;
        }
        if let Focus::Suggestions(i) = self.focus {
            let count = self.controller.suggestions().len();
            if count == 0 || !self.controller.is_open() {
                self.focus = Focus::Input;
            } else if i >= count {
                self.focus = Focus::Suggestions(count - 1);
            }
        }
        if self.input.content() != self.controller.input() {
            self.input.set(self.controller.input());
        }
    }

    fn set_notification(&mut self, msg: String) {
        self.notification = Some(msg);
        self.notification_ttl = NOTIFICATION_TICKS;
    }
}
