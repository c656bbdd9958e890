//! Message types for chatbot conversations.
//!
//! Messages are built by the widget controller before they reach the
//! store, so constructors here stamp everything a message needs.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Format used for user message timestamps, e.g. `Jan 1, 2:30 PM`.
pub const TIMESTAMP_FORMAT: &str = "%b %-d, %-I:%M %p";

/// Author of a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sender {
    /// Typed by the person using the widget.
    User,
    /// Produced by the simulated bot.
    Bot,
}

impl std::fmt::Display for Sender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Bot => write!(f, "bot"),
        }
    }
}

/// A single entry in the conversation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    /// Message body.
    pub text: String,
    /// Who wrote it.
    pub sender: Sender,
    /// Whether the message should be revealed character by character.
    #[serde(default)]
    pub typewriter: bool,
    /// Display timestamp (user messages only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
}

impl Message {
    /// Create a user message stamped with the given local time.
    pub fn user(text: impl Into<String>, at: NaiveDateTime) -> Self {
        Self {
            text: text.into(),
            sender: Sender::User,
            typewriter: false,
            timestamp: Some(format_timestamp(at)),
        }
    }

    /// Create a bot message that renders in full immediately.
    pub fn bot(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            sender: Sender::Bot,
            typewriter: false,
            timestamp: None,
        }
    }

    /// Create a bot message marked for progressive reveal.
    pub fn bot_revealed(text: impl Into<String>) -> Self {
        Self {
            typewriter: true,
            ..Self::bot(text)
        }
    }
}

/// Format a local wall-clock time the way user messages display it.
pub fn format_timestamp(at: NaiveDateTime) -> String {
    at.format(TIMESTAMP_FORMAT).to_string()
}
