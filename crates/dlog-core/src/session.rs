//! The owned analysis session: one parsed log, one mutable entry set.

use std::collections::HashMap;

use thiserror::Error;

use crate::analysis::{self, AnalysisConfig, EnergyTransition, ImmersionRanking};
use crate::category::Category;
use crate::classify::{self, ClassifyError};
use crate::entry::Entry;
use crate::parser::{self, ParseError};

/// Error for category reassignment against a missing entry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("no entry with id {0}")]
pub struct UnknownEntryId(pub u32);

/// One analysis session over one day's log.
///
/// The entry sequence is the single mutable source of truth; thoughts and
/// actions are read-only once parsed. There is no ambient state anywhere:
/// starting a new analysis means constructing a fresh session, which is
/// the reset boundary.
#[derive(Debug, Clone)]
pub struct LogSession {
    entries: Vec<Entry>,
    thoughts: Vec<String>,
    actions: Vec<String>,
}

impl LogSession {
    /// Parses, validates, and gap-fills raw log text into a session.
    ///
    /// # Errors
    ///
    /// `ParseError::NoValidEntries` when the text contains no time
    /// entries; the caller surfaces this and aborts the attempt.
    pub fn from_text(raw: &str) -> Result<Self, ParseError> {
        let parsed = parser::parse(raw);
        parser::validate(&parsed)?;

        let mut entries = parsed.entries;
        parser::fill_sleep_gap(&mut entries);

        tracing::debug!(
            entries = entries.len(),
            thoughts = parsed.thoughts.len(),
            actions = parsed.actions.len(),
            "session created"
        );
        Ok(Self {
            entries,
            thoughts: parsed.thoughts,
            actions: parsed.actions,
        })
    }

    /// All entries, gap-fill included, ordered by start time.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn thoughts(&self) -> &[String] {
        &self.thoughts
    }

    #[must_use]
    pub fn actions(&self) -> &[String] {
        &self.actions
    }

    /// Human-authored entries only: everything except the synthetic sleep
    /// entry. Classification is scoped to these.
    pub fn user_entries(&self) -> impl Iterator<Item = &Entry> {
        self.entries.iter().filter(|entry| !entry.is_sleep_fill())
    }

    /// Applies a remote label vector to the user entries, all-or-nothing.
    pub fn apply_remote_labels(&mut self, labels: &[Category]) -> Result<(), ClassifyError> {
        classify::apply_labels(&mut self.entries, labels)
    }

    /// Applies the deterministic keyword/time fallback to user entries.
    pub fn classify_local(&mut self) {
        classify::classify_local(&mut self.entries);
    }

    /// Reassigns one entry's category (manual override).
    ///
    /// Statistics are not updated in place; take a fresh [`snapshot`]
    /// afterwards.
    ///
    /// [`snapshot`]: Self::snapshot
    pub fn reassign(&mut self, id: u32, category: Category) -> Result<(), UnknownEntryId> {
        let entry = self
            .entries
            .iter_mut()
            .find(|entry| entry.id == id)
            .ok_or(UnknownEntryId(id))?;
        entry.category = category;
        Ok(())
    }

    /// Computes a full statistics snapshot from the current entries.
    ///
    /// Always a wholesale recompute; snapshots are disposable projections
    /// and never updated incrementally.
    #[must_use]
    pub fn snapshot(&self, config: &AnalysisConfig) -> StatsSnapshot {
        StatsSnapshot {
            total_minutes: analysis::total_minutes(&self.entries),
            category_minutes: analysis::category_minutes(&self.entries),
            immersion_distribution: analysis::immersion_distribution(&self.entries),
            immersion_by_category: analysis::immersion_by_category(&self.entries),
            energy_transitions: analysis::energy_transitions(
                &self.entries,
                config.energy_change_threshold,
            ),
            productivity_score: analysis::productivity_score(
                &self.entries,
                config.high_immersion_threshold,
            ),
        }
    }
}

/// Derived statistics for one entry set. Pure projection: recomputed
/// wholesale whenever any entry's category changes.
#[derive(Debug, Clone)]
pub struct StatsSnapshot {
    pub total_minutes: i64,
    pub category_minutes: HashMap<Category, i64>,
    pub immersion_distribution: HashMap<u32, i64>,
    pub immersion_by_category: Vec<ImmersionRanking>,
    pub energy_transitions: Vec<EnergyTransition>,
    pub productivity_score: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "- 09:00 ~ 10:00 閱讀 ❚❚❚\n- 10:00 ~ 11:30 開會 ❚❚";

    #[test]
    fn from_text_rejects_empty_logs() {
        assert_eq!(
            LogSession::from_text("- > 沒有時間格").unwrap_err(),
            ParseError::NoValidEntries
        );
    }

    #[test]
    fn from_text_gap_fills_and_orders() {
        let session = LogSession::from_text(SAMPLE).unwrap();
        assert_eq!(session.entries().len(), 3);
        assert!(session.entries()[0].is_sleep_fill());
        assert_eq!(session.user_entries().count(), 2);
    }

    #[test]
    fn snapshot_for_sample_day() {
        let mut session = LogSession::from_text(SAMPLE).unwrap();
        session.classify_local();
        let snapshot = session.snapshot(&AnalysisConfig::default());

        assert_eq!(snapshot.total_minutes, 690);
        assert_eq!(snapshot.category_minutes[&Category::Development], 60);
        assert_eq!(snapshot.category_minutes[&Category::Work], 90);
        assert_eq!(snapshot.category_minutes[&Category::Resting], 540);
        assert!(snapshot.energy_transitions.is_empty());
    }

    #[test]
    fn reassign_changes_next_snapshot() {
        let mut session = LogSession::from_text(SAMPLE).unwrap();
        session.classify_local();

        let reading_id = session
            .user_entries()
            .find(|e| e.content == "閱讀")
            .map(|e| e.id)
            .unwrap();
        session.reassign(reading_id, Category::Social).unwrap();

        let snapshot = session.snapshot(&AnalysisConfig::default());
        assert_eq!(snapshot.category_minutes[&Category::Social], 60);
        assert!(
            !snapshot
                .category_minutes
                .contains_key(&Category::Development)
        );
    }

    #[test]
    fn reassign_unknown_id_errors() {
        let mut session = LogSession::from_text(SAMPLE).unwrap();
        assert_eq!(
            session.reassign(99, Category::Work).unwrap_err(),
            UnknownEntryId(99)
        );
    }

    #[test]
    fn apply_remote_labels_respects_user_entry_count() {
        let mut session = LogSession::from_text(SAMPLE).unwrap();
        let labels = vec![Category::Development, Category::Work];
        session.apply_remote_labels(&labels).unwrap();

        let categories: Vec<Category> = session.user_entries().map(|e| e.category).collect();
        assert_eq!(categories, labels);
    }
}
