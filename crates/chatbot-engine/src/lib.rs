//! chatbot-engine: Headless core of the chatbot widget
//!
//! This crate provides everything except drawing, including:
//! - Message types and the persisted conversation store
//! - Key-value persistence with a versioned envelope
//! - The widget controller state machine and its timers
//! - The progressive reveal effect and welcome greeting

pub mod config;
pub mod greeting;
pub mod message;
pub mod persistence;
pub mod scheduler;
pub mod store;
pub mod typewriter;
pub mod widget;

// Re-export commonly used types
pub use config::{ConfigError, ReplyPolicy, WidgetConfig, PLACEHOLDER_REPLY};
pub use greeting::{
    default_suggestions, greeting_for_hour, welcome_text, Clock, FixedClock, SystemClock,
};
pub use message::{format_timestamp, Message, Sender};
pub use persistence::{
    FileStorage, MemoryStorage, PersistenceError, StateStorage, CURRENT_SCHEMA_VERSION,
    DEFAULT_STORAGE_KEY,
};
pub use scheduler::{TimerEvent, TimerKind};
pub use store::{ConversationState, ConversationStore, StoreError};
pub use typewriter::{TickOutcome, Typewriter};
pub use widget::{
    MessageView, SubmitError, SubmitOutcome, WidgetController, WidgetEvent, WidgetState,
};

/// Returns the engine version.
pub fn engine_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_version() {
        let version = engine_version();
        assert!(!version.is_empty());
        assert!(version.starts_with("0."));
    }
}
