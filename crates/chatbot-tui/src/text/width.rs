//! Text width and truncation utilities.

use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Visual width of a string in terminal cells.
pub fn visual_width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Truncate a string to fit within `max_width` cells, appending "..."
/// when anything was cut. Never splits a character.
pub fn truncate_to_width(s: &str, max_width: usize) -> String {
    if visual_width(s) <= max_width {
        return s.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut result = String::new();
    let mut width = 0;

    for ch in s.chars() {
        let ch_width = UnicodeWidthChar::width(ch).unwrap_or(0);
        if width + ch_width > target_width {
            break;
        }
        result.push(ch);
        width += ch_width;
    }

    result.push_str("...");
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visual_width_ascii() {
        assert_eq!(visual_width("hello"), 5);
        assert_eq!(visual_width(""), 0);
    }

    #[test]
    fn test_visual_width_wide_chars() {
        assert_eq!(visual_width("你好"), 4);
        assert_eq!(visual_width("I’m"), 3);
    }

    #[test]
    fn test_truncate_no_truncation_needed() {
        assert_eq!(truncate_to_width("CHATBOT", 10), "CHATBOT");
        assert_eq!(truncate_to_width("CHATBOT", 7), "CHATBOT");
    }

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate_to_width("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_wide_chars_on_boundary() {
        assert_eq!(truncate_to_width("你好世界", 6), "你...");
        assert_eq!(truncate_to_width("你好世界", 7), "你好...");
    }

    #[test]
    fn test_truncate_very_short() {
        assert_eq!(truncate_to_width("hello", 3), "...");
        assert_eq!(truncate_to_width("hello", 0), "...");
    }
}
