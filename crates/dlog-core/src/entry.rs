//! The parsed time-block entry and its side channels.

use serde::{Deserialize, Serialize};

use crate::category::Category;
use crate::time::ClockTime;

/// Reserved id of the synthetic sleep entry inserted by gap-filling.
pub const SLEEP_ENTRY_ID: u32 = 0;

/// A time interval with semantic content, parsed from one log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    /// `0` is reserved for the synthetic sleep entry; user-derived entries
    /// carry their 1-based source line number, stable across mutation.
    pub id: u32,
    pub start: ClockTime,
    /// May be "before" `start`, meaning the interval crosses midnight.
    pub end: ClockTime,
    /// Activity text with bar markup and surrounding whitespace stripped.
    pub content: String,
    /// Count of intensity markers in the source line. Not clamped: display
    /// layers assume a practical ceiling of 5, the data model does not.
    pub immersion: u32,
    /// Derived from `start`/`end`, always in `[0, 1439]`.
    pub duration_minutes: i64,
    /// Mutable after creation: classification and manual reassignment both
    /// update it in place.
    pub category: Category,
}

impl Entry {
    /// Creates a user entry with derived duration and the default category.
    #[must_use]
    pub fn new(id: u32, start: ClockTime, end: ClockTime, content: String, immersion: u32) -> Self {
        Self {
            id,
            start,
            end,
            content,
            immersion,
            duration_minutes: start.minutes_until(end),
            category: Category::Routine,
        }
    }

    /// Whether this is the synthetic sleep entry from gap-filling.
    #[must_use]
    pub const fn is_sleep_fill(&self) -> bool {
        self.id == SLEEP_ENTRY_ID
    }
}

/// Everything extracted from one raw log text.
///
/// Thoughts and actions are flat, ordered side channels for the whole log;
/// they are not linked to specific entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedLog {
    pub entries: Vec<Entry>,
    pub thoughts: Vec<String>,
    pub actions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn t(s: &str) -> ClockTime {
        s.parse().unwrap()
    }

    #[test]
    fn new_entry_derives_duration_and_default_category() {
        let entry = Entry::new(3, t("09:00"), t("10:30"), "寫程式".to_string(), 4);
        assert_eq!(entry.duration_minutes, 90);
        assert_eq!(entry.category, Category::Routine);
        assert!(!entry.is_sleep_fill());
    }

    #[test]
    fn cross_midnight_entry_duration() {
        let entry = Entry::new(1, t("23:00"), t("01:00"), "看劇".to_string(), 1);
        assert_eq!(entry.duration_minutes, 120);
    }
}
