//! Wall-clock time-of-day with minute precision.

use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minutes in a full day; used by the midnight-wrap rule.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// Error for unparseable clock times.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("invalid clock time: {value}")]
pub struct TimeParseError {
    pub value: String,
}

/// A wall-clock time of day in `HH:MM` form.
///
/// Entries carry no date: a day log is a single calendar day, and an
/// interval whose end is "before" its start is taken to cross midnight.
/// Ordering is the natural time ordering, which for the fixed-width
/// `HH:MM` rendering coincides with lexicographic order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// Start of day, `00:00`.
    pub const MIDNIGHT: Self = Self(NaiveTime::MIN);

    /// Creates a clock time from hour and minute.
    ///
    /// Returns `None` when out of range (hour > 23 or minute > 59).
    #[must_use]
    pub fn from_hm(hour: u32, minute: u32) -> Option<Self> {
        NaiveTime::from_hms_opt(hour, minute, 0).map(Self)
    }

    /// The hour component, 0..=23.
    #[must_use]
    pub fn hour(self) -> u32 {
        self.0.hour()
    }

    /// Minutes since midnight, 0..=1439.
    #[must_use]
    pub fn minute_of_day(self) -> i64 {
        i64::from(self.0.hour()) * 60 + i64::from(self.0.minute())
    }

    /// Minutes from `self` to `end`, wrapping across midnight.
    ///
    /// The wrap applies only when the raw difference is strictly negative,
    /// so equal times yield 0 rather than a full day. The result is always
    /// in `[0, 1439]`; a single interval is assumed to span less than
    /// 24 hours.
    #[must_use]
    pub fn minutes_until(self, end: Self) -> i64 {
        let diff = end.minute_of_day() - self.minute_of_day();
        if diff < 0 { diff + MINUTES_PER_DAY } else { diff }
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for ClockTime {
    type Err = TimeParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveTime::parse_from_str(s, "%H:%M")
            .map(Self)
            .map_err(|_| TimeParseError {
                value: s.to_string(),
            })
    }
}

impl TryFrom<String> for ClockTime {
    type Error = TimeParseError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ClockTime> for String {
    fn from(time: ClockTime) -> Self {
        time.to_string()
    }
}
