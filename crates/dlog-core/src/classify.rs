//! Deterministic local categorization and remote-label application.
//!
//! Remote classification lives in `dlog-llm`; this module owns the other
//! half of the contract: validating and applying a remote label vector,
//! and the keyword/time-of-day fallback that can never fail.

use std::fmt;

use thiserror::Error;

use crate::category::Category;
use crate::entry::Entry;
use crate::time::ClockTime;

/// Content keywords for the resting category.
const RESTING_KEYWORDS: &[&str] = &["睡", "午睡", "休息", "小憩", "補眠", "sleep", "nap", "rest"];

/// Content keywords for the work category.
const WORK_KEYWORDS: &[&str] = &[
    "工作", "開會", "會議", "加班", "報告", "客戶", "work", "meeting", "standup",
];

/// Content keywords for the development category.
const DEVELOPMENT_KEYWORDS: &[&str] = &[
    "學習", "閱讀", "讀書", "練習", "上課", "寫作", "study", "learn", "read", "course", "practice",
];

/// Content keywords for the family category.
const FAMILY_KEYWORDS: &[&str] = &["家人", "爸", "媽", "小孩", "陪", "family", "kids", "parents"];

/// Start hours before this default to resting when no keyword matches.
const EARLY_MORNING_END_HOUR: u32 = 7;

/// How the entry set ended up categorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassificationMode {
    /// Labels came from the remote classifier.
    Remote,
    /// The remote call failed or was skipped; keyword/time rules applied.
    LocalFallback,
}

impl fmt::Display for ClassificationMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Remote => "remote",
            Self::LocalFallback => "local fallback",
        };
        write!(f, "{s}")
    }
}

/// Errors applying a remote label vector.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClassifyError {
    /// The label vector did not match the user entry count.
    #[error("expected {expected} labels, got {got}")]
    LabelCountMismatch { expected: usize, got: usize },
}

/// Applies remote labels to user entries, in order.
///
/// The synthetic sleep entry keeps its preset category and does not count
/// toward the expected label count. Application is all-or-nothing: a count
/// mismatch leaves every entry untouched.
pub fn apply_labels(entries: &mut [Entry], labels: &[Category]) -> Result<(), ClassifyError> {
    let expected = entries.iter().filter(|e| !e.is_sleep_fill()).count();
    if labels.len() != expected {
        return Err(ClassifyError::LabelCountMismatch {
            expected,
            got: labels.len(),
        });
    }

    for (entry, label) in entries
        .iter_mut()
        .filter(|e| !e.is_sleep_fill())
        .zip(labels)
    {
        entry.category = *label;
    }
    Ok(())
}

/// Categorizes user entries with keyword and time-of-day rules.
///
/// Deterministic, synchronous, infallible: the guaranteed landing spot
/// when the remote classifier is unavailable.
pub fn classify_local(entries: &mut [Entry]) {
    for entry in entries.iter_mut().filter(|e| !e.is_sleep_fill()) {
        entry.category = local_category(&entry.content, entry.start);
    }
    tracing::debug!("applied local keyword/time classification");
}

/// Decision order, first match wins: resting keywords, work keywords,
/// development keywords, family keywords, early-morning start, routine.
fn local_category(content: &str, start: ClockTime) -> Category {
    if contains_any(content, RESTING_KEYWORDS) {
        return Category::Resting;
    }
    if contains_any(content, WORK_KEYWORDS) {
        return Category::Work;
    }
    if contains_any(content, DEVELOPMENT_KEYWORDS) {
        return Category::Development;
    }
    if contains_any(content, FAMILY_KEYWORDS) {
        return Category::Family;
    }
    if start.hour() < EARLY_MORNING_END_HOUR {
        return Category::Resting;
    }
    Category::Routine
}

fn contains_any(content: &str, keywords: &[&str]) -> bool {
    keywords.iter().any(|keyword| content.contains(keyword))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{fill_sleep_gap, parse};

    fn log_entries(raw: &str) -> Vec<Entry> {
        let mut entries = parse(raw).entries;
        fill_sleep_gap(&mut entries);
        entries
    }

    #[test]
    fn keyword_rules_for_sample_day() {
        let mut entries = log_entries("- 09:00 ~ 10:00 閱讀 ❚❚❚\n- 10:00 ~ 11:30 開會 ❚❚");
        classify_local(&mut entries);

        assert_eq!(entries[0].category, Category::Resting); // gap fill
        assert_eq!(entries[1].category, Category::Development);
        assert_eq!(entries[2].category, Category::Work);
    }

    #[test]
    fn resting_keywords_win_over_work_keywords() {
        let mut entries = log_entries("- 13:00 ~ 13:30 工作前小憩");
        classify_local(&mut entries);
        assert_eq!(entries[1].category, Category::Resting);
    }

    #[test]
    fn early_morning_defaults_to_resting() {
        let mut entries = log_entries("- 02:00 ~ 03:00 滑手機");
        classify_local(&mut entries);
        // id 0 sleep fill covers 00:00~02:00, the 02:00 entry hits the hour rule
        assert_eq!(entries[1].category, Category::Resting);
    }

    #[test]
    fn seven_oclock_is_not_early_morning() {
        let mut entries = log_entries("- 07:00 ~ 08:00 滑手機");
        classify_local(&mut entries);
        assert_eq!(entries[1].category, Category::Routine);
    }

    #[test]
    fn unmatched_content_falls_back_to_routine() {
        let mut entries = log_entries("- 12:00 ~ 13:00 吃午餐散步");
        classify_local(&mut entries);
        assert_eq!(entries[1].category, Category::Routine);
    }

    #[test]
    fn family_keywords_classify_family() {
        let mut entries = log_entries("- 18:00 ~ 20:00 陪小孩");
        classify_local(&mut entries);
        assert_eq!(entries[1].category, Category::Family);
    }

    #[test]
    fn sleep_fill_entry_keeps_preset_category() {
        let mut entries = log_entries("- 09:00 ~ 10:00 開會");
        classify_local(&mut entries);
        assert!(entries[0].is_sleep_fill());
        assert_eq!(entries[0].category, Category::Resting);
    }

    #[test]
    fn apply_labels_assigns_in_order() {
        let mut entries = log_entries("- 09:00 ~ 10:00 閱讀\n- 10:00 ~ 11:00 開會");
        apply_labels(&mut entries, &[Category::Social, Category::Work]).unwrap();

        assert_eq!(entries[0].category, Category::Resting); // sleep fill untouched
        assert_eq!(entries[1].category, Category::Social);
        assert_eq!(entries[2].category, Category::Work);
    }

    #[test]
    fn apply_labels_rejects_count_mismatch_without_partial_application() {
        let mut entries = log_entries("- 09:00 ~ 10:00 閱讀\n- 10:00 ~ 11:00 開會");
        let err = apply_labels(&mut entries, &[Category::Work]).unwrap_err();
        assert_eq!(
            err,
            ClassifyError::LabelCountMismatch {
                expected: 2,
                got: 1
            }
        );
        // Nothing was mutated
        assert!(
            entries
                .iter()
                .filter(|e| !e.is_sleep_fill())
                .all(|e| e.category == Category::Routine)
        );
    }
}
