//! UI building blocks for the chat widget.

pub mod layout;
pub mod theme;
pub mod widgets;
