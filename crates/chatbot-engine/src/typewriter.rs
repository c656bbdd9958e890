//! Progressive character-by-character reveal of message text.

use std::time::Duration;

/// Default delay between revealed characters.
pub const DEFAULT_REVEAL_SPEED: Duration = Duration::from_millis(50);

/// Result of advancing a [`Typewriter`] by one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// One more character became visible.
    Advanced,
    /// The full text was already visible; completion is reported now.
    Completed,
    /// Completion was already reported, or the reveal was cancelled.
    Finished,
}

/// Reveal state for a single target text.
#[derive(Debug, Clone)]
pub struct Typewriter {
    text: String,
    /// Byte offset of the revealed prefix (always on a char boundary).
    cursor: usize,
    completed: bool,
    cancelled: bool,
}

impl Typewriter {
    /// Start revealing `text` from an empty prefix.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            cursor: 0,
            completed: false,
            cancelled: false,
        }
    }

    /// The full target text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The prefix currently displayed.
    pub fn displayed(&self) -> &str {
        &self.text[..self.cursor]
    }

    /// Whether every character is visible.
    pub fn is_fully_revealed(&self) -> bool {
        self.cursor == self.text.len()
    }

    /// Whether completion has been reported.
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// Whether the reveal was cancelled.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Advance by one tick.
    pub fn tick(&mut self) -> TickOutcome {
        if self.completed || self.cancelled {
            return TickOutcome::Finished;
        }
        match self.text[self.cursor..].chars().next() {
            Some(ch) => {
                self.cursor += ch.len_utf8();
                TickOutcome::Advanced
            }
            None => {
                self.completed = true;
                TickOutcome::Completed
            }
        }
    }

    /// Stop ticking without reporting completion.
    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    /// Rewind to the empty prefix so the reveal can run again.
    pub fn restart(&mut self) {
        self.cursor = 0;
        self.completed = false;
        self.cancelled = false;
    }

    /// Lazily yield every displayed state from empty to the full text.
    pub fn frames(&self) -> Frames<'_> {
        Frames {
            text: &self.text,
            next: Some(0),
        }
    }
}

/// Iterator over growing prefixes of a text. See [`Typewriter::frames`].
#[derive(Debug, Clone)]
pub struct Frames<'a> {
    text: &'a str,
    next: Option<usize>,
}

impl<'a> Iterator for Frames<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let end = self.next?;
        self.next = self.text[end..]
            .chars()
            .next()
            .map(|ch| end + ch.len_utf8());
        Some(&self.text[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reveals_one_char_per_tick() {
        let mut tw = Typewriter::new("abc");
        assert_eq!(tw.displayed(), "");

        assert_eq!(tw.tick(), TickOutcome::Advanced);
        assert_eq!(tw.displayed(), "a");
        assert_eq!(tw.tick(), TickOutcome::Advanced);
        assert_eq!(tw.tick(), TickOutcome::Advanced);
        assert_eq!(tw.displayed(), "abc");
        assert!(tw.is_fully_revealed());
        assert!(!tw.is_completed());
    }

    #[test]
    fn test_completes_exactly_once() {
        let mut tw = Typewriter::new("hi");
        let outcomes: Vec<TickOutcome> = (0..5).map(|_| tw.tick()).collect();

        let completions = outcomes
            .iter()
            .filter(|o| **o == TickOutcome::Completed)
            .count();
        assert_eq!(completions, 1);
        assert_eq!(outcomes[2], TickOutcome::Completed);
        assert_eq!(outcomes[3], TickOutcome::Finished);
        assert_eq!(tw.displayed(), "hi");
    }

    #[test]
    fn test_frames_count_is_len_plus_one() {
        let text = "Lorem ipsum dolor sit amet, consectetur adipiscing elit.";
        let tw = Typewriter::new(text);
        let frames: Vec<&str> = tw.frames().collect();

        assert_eq!(frames.len(), text.chars().count() + 1);
        assert_eq!(frames[0], "");
        assert_eq!(frames[1], "L");
        assert_eq!(*frames.last().unwrap(), text);
    }

    #[test]
    fn test_frames_respect_char_boundaries() {
        let tw = Typewriter::new("I’m");
        let frames: Vec<&str> = tw.frames().collect();
        assert_eq!(frames, vec!["", "I", "I’", "I’m"]);
    }

    #[test]
    fn test_multibyte_ticks() {
        let mut tw = Typewriter::new("é😀");
        tw.tick();
        assert_eq!(tw.displayed(), "é");
        tw.tick();
        assert_eq!(tw.displayed(), "é😀");
        assert_eq!(tw.tick(), TickOutcome::Completed);
    }

    #[test]
    fn test_empty_text_completes_on_first_tick() {
        let mut tw = Typewriter::new("");
        assert_eq!(tw.frames().count(), 1);
        assert_eq!(tw.tick(), TickOutcome::Completed);
    }

    #[test]
    fn test_cancel_stops_without_completion() {
        let mut tw = Typewriter::new("abc");
        tw.tick();
        tw.cancel();

        assert_eq!(tw.tick(), TickOutcome::Finished);
        assert_eq!(tw.displayed(), "a");
        assert!(!tw.is_completed());
        assert!(tw.is_cancelled());
    }

    #[test]
    fn test_restart() {
        let mut tw = Typewriter::new("ab");
        while tw.tick() != TickOutcome::Completed {}

        tw.restart();
        assert_eq!(tw.displayed(), "");
        assert_eq!(tw.tick(), TickOutcome::Advanced);
        assert_eq!(tw.tick(), TickOutcome::Advanced);
        assert_eq!(tw.tick(), TickOutcome::Completed);
    }
}
