//! Widget controller: the conversation state machine behind the chat panel.
//!
//! The controller owns transient UI state (visibility, input text,
//! suggestions, the active reveal) and drives the injected
//! [`ConversationStore`]. Visibility and reply progress live in one
//! [`WidgetState`] enum advanced by [`WidgetState::next`]; timers are
//! cancellable tasks owned by the controller.

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use crate::config::{ReplyPolicy, WidgetConfig};
use crate::greeting::{welcome_text, Clock};
use crate::message::Message;
use crate::scheduler::{Scheduler, TaskHandle, TimerEvent, TimerKind};
use crate::store::ConversationStore;
use crate::typewriter::{TickOutcome, Typewriter};

/// Visible state of the widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidgetState {
    /// Only the launcher icon is shown.
    #[default]
    Hidden,
    /// Panel open, nothing pending.
    Idle,
    /// Panel open, a bot reply is scheduled.
    AwaitingReply,
    /// Panel open, the latest bot message is being revealed.
    Revealing,
}

/// Inputs to the state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetEvent {
    /// The launcher icon was clicked.
    LauncherClicked {
        /// A reply timer is still running from before the panel closed.
        reply_pending: bool,
    },
    /// The panel close control was clicked.
    CloseClicked,
    /// A non-blank message was accepted.
    Submitted,
    /// The reply timer fired and the bot message was appended.
    ReplyDue,
    /// The reveal of the latest bot message finished.
    RevealCompleted {
        /// Another reply was scheduled right away.
        reply_pending: bool,
    },
    /// The conversation was reset.
    Reset,
}

impl WidgetState {
    /// Transition function for the widget.
    pub fn next(self, event: WidgetEvent) -> Self {
        use WidgetEvent as E;
        use WidgetState as S;

        match (self, event) {
            (S::Hidden, E::LauncherClicked { reply_pending: true }) => S::AwaitingReply,
            (S::Hidden, E::LauncherClicked { reply_pending: false }) => S::Idle,
            (_, E::CloseClicked) => S::Hidden,
            (S::Idle, E::Submitted) => S::AwaitingReply,
            (S::Hidden, E::ReplyDue) => S::Hidden,
            (_, E::ReplyDue) => S::Revealing,
            (S::Revealing, E::RevealCompleted { reply_pending: true }) => S::AwaitingReply,
            (S::Revealing, E::RevealCompleted { reply_pending: false }) => S::Idle,
            (S::Hidden, E::Reset) => S::Hidden,
            (_, E::Reset) => S::Idle,
            (state, _) => state,
        }
    }

    /// Whether the panel is visible.
    pub fn is_open(self) -> bool {
        self != Self::Hidden
    }
}

/// Why a submission was not accepted.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SubmitError {
    /// The input was empty or whitespace only.
    #[error("Message is blank")]
    Blank,
    /// A reply is still pending and the policy rejects new messages.
    #[error("A reply is already in progress")]
    Busy,
    /// The panel is not open.
    #[error("The chat panel is closed")]
    Closed,
}

/// What happened to an accepted submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The reply timer started.
    ReplyScheduled,
    /// The reply waits for the current one to finish.
    ReplyQueued,
}

/// A message as it should be displayed right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageView<'a> {
    /// The stored message.
    pub message: &'a Message,
    /// Text to display (a prefix while revealing).
    pub text: &'a str,
    /// Whether this entry is mid-reveal.
    pub revealing: bool,
}

/// Reveal in progress for the message at `index`.
#[derive(Debug)]
struct ActiveReveal {
    index: usize,
    typewriter: Typewriter,
    ticker: TaskHandle,
}

/// Controller for one mounted chat widget.
pub struct WidgetController {
    config: WidgetConfig,
    store: ConversationStore,
    clock: Box<dyn Clock>,
    scheduler: Scheduler,
    timer_rx: mpsc::UnboundedReceiver<TimerEvent>,
    state: WidgetState,
    input: String,
    autofilled: bool,
    suggestions: Vec<String>,
    /// Set on the first open of the session.
    opened_before: bool,
    queued_replies: usize,
    reply_task: Option<TaskHandle>,
    scroll_task: Option<TaskHandle>,
    reveal: Option<ActiveReveal>,
    scroll_requested: bool,
}

impl std::fmt::Debug for WidgetController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WidgetController")
            .field("state", &self.state)
            .field("messages", &self.store.len())
            .field("input", &self.input)
            .field("suggestions", &self.suggestions)
            .field("queued_replies", &self.queued_replies)
            .finish_non_exhaustive()
    }
}

impl WidgetController {
    /// Create a controller over an injected store.
    ///
    /// Timers are spawned lazily, but the controller must be used from
    /// within a tokio runtime.
    pub fn new(config: WidgetConfig, store: ConversationStore, clock: Box<dyn Clock>) -> Self {
        let (scheduler, timer_rx) = Scheduler::new();
        Self {
            config,
            store,
            clock,
            scheduler,
            timer_rx,
            state: WidgetState::Hidden,
            input: String::new(),
            autofilled: false,
            suggestions: Vec::new(),
            opened_before: false,
            queued_replies: 0,
            reply_task: None,
            scroll_task: None,
            reveal: None,
            scroll_requested: false,
        }
    }

    /// Current state.
    pub fn state(&self) -> WidgetState {
        self.state
    }

    /// Whether the panel is visible.
    pub fn is_open(&self) -> bool {
        self.state.is_open()
    }

    /// Widget configuration.
    pub fn config(&self) -> &WidgetConfig {
        &self.config
    }

    /// Read view of the conversation store.
    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    /// Current input text.
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Suggestions currently offered.
    pub fn suggestions(&self) -> &[String] {
        &self.suggestions
    }

    /// Replies waiting behind the current one.
    pub fn queued_replies(&self) -> usize {
        self.queued_replies
    }

    /// Storage notice to show the user, if persistence degraded.
    pub fn notice(&self) -> Option<&str> {
        self.store.notice()
    }

    /// Open the panel from the launcher.
    pub fn open(&mut self) {
        if self.is_open() {
            return;
        }
        self.apply(WidgetEvent::LauncherClicked {
            reply_pending: self.reply_task.is_some(),
        });
        self.scroll_task = Some(
            self.scheduler
                .after(self.config.scroll_settle(), TimerKind::ScrollDue),
        );

        if self.store.is_empty() {
            if !self.opened_before {
                let text = welcome_text(self.clock.now());
                debug!("Appending welcome message");
                self.store.add_message(Message::bot(text));
                self.scroll_requested = true;
            }
            self.suggestions.clone_from(&self.config.suggestions);
        }
        self.opened_before = true;
    }

    /// Close the panel. A running reveal is finished instantly; a pending
    /// reply still lands while hidden.
    pub fn close(&mut self) {
        if !self.is_open() {
            return;
        }
        self.suggestions.clear();
        self.scroll_task = None;
        if self.stop_reveal().is_some() {
            self.schedule_queued_reply();
        }
        self.apply(WidgetEvent::CloseClicked);
    }

    /// The input field received focus.
    pub fn focus_input(&mut self) {
        self.suggestions.clear();
        self.autofilled = false;
    }

    /// The user edited the input field.
    pub fn set_input(&mut self, value: impl Into<String>) {
        self.input = value.into();
        if self.autofilled {
            self.suggestions.clear();
            self.autofilled = false;
        }
    }

    /// Fill the input with the suggestion at `index`.
    pub fn select_suggestion(&mut self, index: usize) -> Option<&str> {
        if index >= self.suggestions.len() {
            return None;
        }
        let suggestion = self.suggestions.swap_remove(index);
        self.suggestions.clear();
        self.input = suggestion;
        self.autofilled = true;
        Some(&self.input)
    }

    /// Submit the current input as a user message.
    pub fn submit(&mut self) -> Result<SubmitOutcome, SubmitError> {
        if !self.is_open() {
            return Err(SubmitError::Closed);
        }
        if self.input.trim().is_empty() {
            return Err(SubmitError::Blank);
        }
        let busy = self.reply_task.is_some() || self.reveal.is_some();
        if busy && self.config.reply_policy == ReplyPolicy::Reject {
            debug!(state = ?self.state, "Rejected submission while busy");
            return Err(SubmitError::Busy);
        }

        let text = std::mem::take(&mut self.input);
        self.autofilled = false;
        self.suggestions.clear();
        self.store.add_message(Message::user(text, self.clock.now()));
        self.scroll_requested = true;

        if busy {
            self.queued_replies += 1;
            debug!(queued = self.queued_replies, "Queued reply");
            return Ok(SubmitOutcome::ReplyQueued);
        }

        self.schedule_reply();
        self.apply(WidgetEvent::Submitted);
        Ok(SubmitOutcome::ReplyScheduled)
    }

    /// Replace the conversation with an empty one. Pending replies and
    /// the active reveal are dropped; the welcome is not shown again.
    pub fn reset_conversation(&mut self) {
        self.cancel_reply();
        self.stop_reveal();
        self.store.reset();
        if self.is_open() {
            self.suggestions.clone_from(&self.config.suggestions);
        }
        self.apply(WidgetEvent::Reset);
    }

    /// Wait for the next timer event.
    pub async fn next_timer_event(&mut self) -> Option<TimerEvent> {
        self.timer_rx.recv().await
    }

    /// Handle every timer event that has already arrived.
    pub fn process_timer_events(&mut self) {
        while let Ok(event) = self.timer_rx.try_recv() {
            self.handle_timer_event(event);
        }
    }

    /// Handle one timer event. Events from cancelled tasks are ignored.
    pub fn handle_timer_event(&mut self, event: TimerEvent) {
        match event.kind {
            TimerKind::ScrollDue => {
                if self.scroll_task.as_ref().is_some_and(|t| t.owns(&event)) {
                    self.scroll_task = None;
                    self.scroll_requested = true;
                }
            }
            TimerKind::ReplyDue => {
                if self.reply_task.as_ref().is_some_and(|t| t.owns(&event)) {
                    self.reply_task = None;
                    self.deliver_reply();
                }
            }
            TimerKind::RevealTick => {
                if self.reveal.as_ref().is_some_and(|r| r.ticker.owns(&event)) {
                    self.advance_reveal();
                }
            }
        }
    }

    /// Messages as they should be drawn. Only the latest message can be
    /// mid-reveal; everything else shows its full text.
    pub fn message_views(&self) -> Vec<MessageView<'_>> {
        let messages = self.store.messages();
        let last = messages.len().checked_sub(1);
        messages
            .iter()
            .enumerate()
            .map(|(index, message)| {
                let reveal = self.reveal.as_ref().filter(|r| {
                    r.index == index
                        && Some(index) == last
                        && message.typewriter
                        && self.state == WidgetState::Revealing
                });
                match reveal {
                    Some(r) => MessageView {
                        message,
                        text: r.typewriter.displayed(),
                        revealing: true,
                    },
                    None => MessageView {
                        message,
                        text: &message.text,
                        revealing: false,
                    },
                }
            })
            .collect()
    }

    /// Returns true once per scroll-to-latest request.
    pub fn take_scroll_request(&mut self) -> bool {
        std::mem::take(&mut self.scroll_requested)
    }

    /// Cancel every timer and stop the reveal. Called on unmount.
    pub fn shutdown(&mut self) {
        self.stop_reveal();
        for task in [self.reply_task.take(), self.scroll_task.take()]
            .into_iter()
            .flatten()
        {
            task.cancel();
        }
        self.queued_replies = 0;
        self.suggestions.clear();
        self.state = WidgetState::Hidden;
        debug!("Widget shut down");
    }

    fn apply(&mut self, event: WidgetEvent) {
        let next = self.state.next(event);
        if next != self.state {
            debug!(from = ?self.state, to = ?next, ?event, "Widget transition");
        }
        self.state = next;
    }

    fn schedule_reply(&mut self) {
        self.reply_task = Some(
            self.scheduler
                .after(self.config.reply_delay(), TimerKind::ReplyDue),
        );
    }

    /// Start the next queued reply, if any. Returns true if one started.
    fn schedule_queued_reply(&mut self) -> bool {
        if self.queued_replies == 0 || self.reply_task.is_some() {
            return false;
        }
        self.queued_replies -= 1;
        self.schedule_reply();
        true
    }

    fn cancel_reply(&mut self) {
        if let Some(task) = self.reply_task.take() {
            task.cancel();
        }
        self.queued_replies = 0;
    }

    fn deliver_reply(&mut self) {
        let message = Message::bot_revealed(self.config.reply_text.clone());
        self.store.add_message(message);
        self.scroll_requested = true;
        self.apply(WidgetEvent::ReplyDue);

        if self.state == WidgetState::Revealing {
            let ticker = self
                .scheduler
                .every(self.config.reveal_speed(), TimerKind::RevealTick);
            self.reveal = Some(ActiveReveal {
                index: self.store.len() - 1,
                typewriter: Typewriter::new(self.config.reply_text.clone()),
                ticker,
            });
        } else {
            // Hidden: shown in full on reopen, so move straight on.
            self.schedule_queued_reply();
        }
    }

    /// Cancel the active reveal and its ticker. The stored message always
    /// holds the full text, so views show it complete from here on.
    fn stop_reveal(&mut self) -> Option<Typewriter> {
        let mut reveal = self.reveal.take()?;
        reveal.ticker.cancel();
        reveal.typewriter.cancel();
        debug!(index = reveal.index, "Reveal stopped");
        Some(reveal.typewriter)
    }

    fn advance_reveal(&mut self) {
        let Some(reveal) = self.reveal.as_mut() else {
            return;
        };
        if reveal.typewriter.tick() != TickOutcome::Completed {
            return;
        }
        if let Some(done) = self.reveal.take() {
            done.ticker.cancel();
        }
        let reply_pending = self.schedule_queued_reply();
        self.apply(WidgetEvent::RevealCompleted { reply_pending });
        if reply_pending {
            debug!(remaining = self.queued_replies, "Started queued reply");
        }
    }
}

impl Drop for WidgetController {
    fn drop(&mut self) {
        if self.reply_task.is_some() || self.reveal.is_some() {
            warn!("Widget dropped with timers still running");
        }
        self.shutdown();
    }
}
