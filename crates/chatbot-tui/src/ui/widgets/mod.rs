//! Widgets that make up the chat UI.

pub mod chat_panel;
pub mod launcher;
pub mod status_bar;
pub mod text_input;

pub use chat_panel::{max_scroll, message_lines, ChatPanel};
pub use launcher::Launcher;
pub use status_bar::{KeyHint, StatusBar};
pub use text_input::TextInputState;
