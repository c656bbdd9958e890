//! Text measuring and wrapping for the message list.

mod width;
mod wrap;

pub use width::{truncate_to_width, visual_width};
pub use wrap::wrap_text;
