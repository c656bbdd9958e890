//! Configuration for the chatbot widget.
//!
//! Every field has a default, so a partial JSON file only overrides what
//! it names.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::greeting::default_suggestions;
use crate::persistence::DEFAULT_STORAGE_KEY;

/// Placeholder reply the simulated bot sends for every user message.
pub const PLACEHOLDER_REPLY: &str = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";

/// Widget configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WidgetConfig {
    /// Title shown in the panel header.
    #[serde(default = "default_title")]
    pub title: String,

    /// Tooltip label shown next to the launcher icon.
    #[serde(default = "default_launcher_label")]
    pub launcher_label: String,

    /// Placeholder text for the empty input field.
    #[serde(default = "default_placeholder")]
    pub placeholder: String,

    /// Text of the simulated bot reply.
    #[serde(default = "default_reply_text")]
    pub reply_text: String,

    /// Delay before the bot reply is appended, in milliseconds.
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,

    /// Delay between revealed characters, in milliseconds.
    #[serde(default = "default_reveal_speed_ms")]
    pub reveal_speed_ms: u64,

    /// Delay before scrolling after the panel opens, in milliseconds.
    #[serde(default = "default_scroll_settle_ms")]
    pub scroll_settle_ms: u64,

    /// Canned prompts offered on an empty conversation.
    #[serde(default = "default_suggestions")]
    pub suggestions: Vec<String>,

    /// How submissions are handled while a reply is in flight.
    #[serde(default)]
    pub reply_policy: ReplyPolicy,

    /// Top-level storage key for the persisted conversation.
    #[serde(default = "default_storage_key")]
    pub storage_key: String,
}

fn default_title() -> String {
    "CHATBOT".into()
}

fn default_launcher_label() -> String {
    "Ask AI".into()
}

fn default_placeholder() -> String {
    "Ask anything to CHATBOT...".into()
}

fn default_reply_text() -> String {
    PLACEHOLDER_REPLY.into()
}

fn default_reply_delay_ms() -> u64 {
    1000
}

fn default_reveal_speed_ms() -> u64 {
    50
}

fn default_scroll_settle_ms() -> u64 {
    100
}

fn default_storage_key() -> String {
    DEFAULT_STORAGE_KEY.into()
}

/// Policy for submissions made while a reply is pending or revealing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ReplyPolicy {
    /// Accept the message and schedule its reply after the current one.
    #[default]
    Queue,
    /// Refuse the submission and keep the input.
    Reject,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            title: default_title(),
            launcher_label: default_launcher_label(),
            placeholder: default_placeholder(),
            reply_text: default_reply_text(),
            reply_delay_ms: default_reply_delay_ms(),
            reveal_speed_ms: default_reveal_speed_ms(),
            scroll_settle_ms: default_scroll_settle_ms(),
            suggestions: default_suggestions(),
            reply_policy: ReplyPolicy::default(),
            storage_key: default_storage_key(),
        }
    }
}

impl WidgetConfig {
    /// Load configuration from a file, or defaults if it does not exist.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(ConfigError::Io)?;
        serde_json::from_str(&content).map_err(ConfigError::Parse)
    }

    /// Save configuration to a file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = serde_json::to_string_pretty(self).map_err(ConfigError::Serialize)?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(ConfigError::Io)?;
        }
        std::fs::write(path, content).map_err(ConfigError::Io)
    }

    /// Reply delay as a duration.
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }

    /// Reveal cadence as a duration. Never zero.
    pub fn reveal_speed(&self) -> Duration {
        Duration::from_millis(self.reveal_speed_ms.max(1))
    }

    /// Scroll settle delay as a duration.
    pub fn scroll_settle(&self) -> Duration {
        Duration::from_millis(self.scroll_settle_ms)
    }
}

/// Errors that can occur when working with configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// I/O error reading or writing config.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Error parsing config JSON.
    #[error("Parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Error serializing config to JSON.
    #[error("Serialize error: {0}")]
    Serialize(#[source] serde_json::Error),
}
