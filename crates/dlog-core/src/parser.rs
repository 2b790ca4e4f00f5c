//! Line-oriented parser for the daily log notation.
//!
//! The grammar is fixed: each line is independently one of
//! - a thought line: `- > 想法`
//! - an action line: `- v 待辦`
//! - a time header: `- HH:MM ~ HH:MM 內容 ❚❚❚`
//!
//! Anything else is dropped without error. Immersion is the length of the
//! first contiguous run of bar glyphs found in the entry body.

use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::category::Category;
use crate::entry::{Entry, ParsedLog, SLEEP_ENTRY_ID};
use crate::time::ClockTime;

/// Content of the synthetic sleep entry inserted by gap-filling.
pub const SLEEP_PLACEHOLDER: &str = "睡眠";

/// The two accepted immersion bar glyphs: U+275A and the fullwidth bar.
static BAR_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new("[❚｜]+").unwrap());

static THOUGHT_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\s*>\s*(.+)$").unwrap());

static ACTION_LINE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^-?\s*v\s+(.+)$").unwrap());

static TIME_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^-?\s*(\d{2}:\d{2})\s*~\s*(\d{2}:\d{2})(.*)$").unwrap());

/// Parse errors surfaced to the user.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The log text contained no recognizable time entries.
    #[error("no valid entries found in the log text")]
    NoValidEntries,
}

/// Parses raw log text into entries plus thought/action side channels.
///
/// Lines are trimmed and classified in priority order: thought, action,
/// time header. Unrecognized lines are skipped, never an error. Entry ids
/// are 1-based source line numbers, so they stay stable when categories or
/// ordering change later.
pub fn parse(raw: &str) -> ParsedLog {
    let mut parsed = ParsedLog::default();
    let mut line_number: u32 = 0;

    for line in raw.lines() {
        line_number += 1;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(captures) = THOUGHT_LINE.captures(line) {
            parsed.thoughts.push(captures[1].trim().to_string());
            continue;
        }

        if let Some(captures) = ACTION_LINE.captures(line) {
            parsed.actions.push(captures[1].trim().to_string());
            continue;
        }

        if let Some(captures) = TIME_HEADER.captures(line) {
            let (Ok(start), Ok(end)) = (
                ClockTime::from_str(&captures[1]),
                ClockTime::from_str(&captures[2]),
            ) else {
                tracing::debug!(line_number, line, "dropping line with out-of-range time");
                continue;
            };

            let (content, immersion) = split_immersion(&captures[3]);
            parsed
                .entries
                .push(Entry::new(line_number, start, end, content, immersion));
            continue;
        }

        tracing::trace!(line_number, line, "dropping unrecognized line");
    }

    parsed
}

/// Splits an entry body into content and immersion count.
///
/// The first contiguous run of bar glyphs is counted and removed; the
/// trimmed remainder is the content. No run means immersion 0.
fn split_immersion(body: &str) -> (String, u32) {
    let Some(run) = BAR_RUN.find(body) else {
        return (body.trim().to_string(), 0);
    };

    let mut content = String::with_capacity(body.len());
    content.push_str(&body[..run.start()]);
    content.push_str(&body[run.end()..]);

    let immersion = run.as_str().chars().count();
    (
        content.trim().to_string(),
        u32::try_from(immersion).unwrap_or(u32::MAX),
    )
}

/// Fails when parsing yielded zero entries.
///
/// Checked before gap-filling: a log made of only thoughts and actions has
/// nothing to analyze and the whole attempt aborts.
pub fn validate(parsed: &ParsedLog) -> Result<(), ParseError> {
    if parsed.entries.is_empty() {
        return Err(ParseError::NoValidEntries);
    }
    Ok(())
}

/// Sorts entries by start time and prepends a sleep entry covering
/// midnight to the first recorded start, unless the log already begins at
/// `00:00`. Idempotent: at most one sleep entry ever exists.
pub fn fill_sleep_gap(entries: &mut Vec<Entry>) {
    entries.sort_by_key(|entry| entry.start);

    let Some(first) = entries.first() else {
        return;
    };
    if first.start == ClockTime::MIDNIGHT {
        return;
    }

    let sleep = Entry {
        id: SLEEP_ENTRY_ID,
        start: ClockTime::MIDNIGHT,
        end: first.start,
        content: SLEEP_PLACEHOLDER.to_string(),
        immersion: 0,
        duration_minutes: ClockTime::MIDNIGHT.minutes_until(first.start),
        category: Category::Resting,
    };
    entries.insert(0, sleep);
}
