//! Welcome greeting and canned suggestions.

use chrono::{Local, NaiveDateTime, Timelike};

/// Source of local wall-clock time.
pub trait Clock: Send {
    /// Current local time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock reading the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock pinned to a fixed time.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub NaiveDateTime);

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// Greeting for an hour of the day (0-23).
pub fn greeting_for_hour(hour: u32) -> &'static str {
    if hour < 12 {
        "Good morning!"
    } else if hour < 18 {
        "Good afternoon!"
    } else {
        "Good evening!"
    }
}

/// Full welcome message text for the given local time.
pub fn welcome_text(at: NaiveDateTime) -> String {
    format!(
        "{} Ask me about anything in the grid. I’m still in Beta, so please give feedback to help me improve.",
        greeting_for_hour(at.hour())
    )
}

/// Suggestions offered before the user has typed anything.
pub fn default_suggestions() -> Vec<String> {
    vec!["Is [Hotel/Venue] available for a show on [Date]?".to_string()]
}
