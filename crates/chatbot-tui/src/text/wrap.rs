//! Word wrapping for message text.

/// Wrap text to `width` cells. Explicit newlines are kept and an empty
/// input yields one empty line so a bubble never collapses.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    if width == 0 {
        return vec![text.to_string()];
    }
    let lines: Vec<String> = textwrap::wrap(text, width)
        .into_iter()
        .map(std::borrow::Cow::into_owned)
        .collect();
    if lines.is_empty() {
        vec![String::new()]
    } else {
        lines
    }
}
