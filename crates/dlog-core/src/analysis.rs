//! Pure statistics over a finalized entry sequence.
//!
//! Every function here is synchronous, total, and recomputes from scratch;
//! nothing is cached between calls. Categories must already be assigned
//! (classification runs before any of this).

use std::collections::HashMap;
use std::fmt;

use serde::Serialize;

use crate::category::Category;
use crate::entry::Entry;
use crate::time::ClockTime;

/// Tuning knobs for the analysis pass.
#[derive(Debug, Clone)]
pub struct AnalysisConfig {
    /// Minimum absolute immersion difference between consecutive active
    /// entries to count as an energy transition.
    pub energy_change_threshold: i64,

    /// Immersion at or above this counts as high-immersion for the
    /// productivity score.
    pub high_immersion_threshold: u32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            energy_change_threshold: 2,
            high_immersion_threshold: 4,
        }
    }
}

/// Total minutes per category. Zero-minute categories are absent.
pub fn category_minutes(entries: &[Entry]) -> HashMap<Category, i64> {
    let mut minutes = HashMap::new();
    for entry in entries {
        *minutes.entry(entry.category).or_insert(0) += entry.duration_minutes;
    }
    minutes
}

/// Total minutes per immersion level, restricted to levels 1 through 5.
///
/// Entries at level 0 or above 5 are excluded entirely, not clipped.
pub fn immersion_distribution(entries: &[Entry]) -> HashMap<u32, i64> {
    let mut minutes = HashMap::new();
    for entry in entries {
        if (1..=5).contains(&entry.immersion) {
            *minutes.entry(entry.immersion).or_insert(0) += entry.duration_minutes;
        }
    }
    minutes
}

/// Sum of all durations, no filtering.
pub fn total_minutes(entries: &[Entry]) -> i64 {
    entries.iter().map(|entry| entry.duration_minutes).sum()
}

/// A category ranked by duration-weighted average immersion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImmersionRanking {
    pub category: Category,
    /// Average immersion in integer tenths (e.g. 27 = 2.7), so ranking
    /// comparisons and the one-decimal display stay exact.
    pub average_tenths: i64,
    pub total_minutes: i64,
}

impl ImmersionRanking {
    /// Average immersion as a one-decimal float, for display.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn average_immersion(&self) -> f64 {
        self.average_tenths as f64 / 10.0
    }
}

/// Ranks categories by duration-weighted average immersion, descending.
///
/// Resting entries and entries with immersion 0 are excluded. A category
/// whose qualifying entries carry zero total duration is omitted rather
/// than producing a division by zero. Ties keep the original encounter
/// order of the category.
pub fn immersion_by_category(entries: &[Entry]) -> Vec<ImmersionRanking> {
    let mut order: Vec<Category> = Vec::new();
    let mut weighted: HashMap<Category, (i64, i64)> = HashMap::new();

    for entry in entries {
        if entry.category == Category::Resting || entry.immersion == 0 {
            continue;
        }
        if !weighted.contains_key(&entry.category) {
            order.push(entry.category);
        }
        let (sum, minutes) = weighted.entry(entry.category).or_insert((0, 0));
        *sum += i64::from(entry.immersion) * entry.duration_minutes;
        *minutes += entry.duration_minutes;
    }

    let mut rankings: Vec<ImmersionRanking> = order
        .into_iter()
        .filter_map(|category| {
            let (sum, minutes) = weighted[&category];
            if minutes == 0 {
                return None;
            }
            // round(10 * sum / minutes) in integer arithmetic
            let average_tenths = (20 * sum + minutes) / (2 * minutes);
            Some(ImmersionRanking {
                category,
                average_tenths,
                total_minutes: minutes,
            })
        })
        .collect();

    rankings.sort_by(|a, b| b.average_tenths.cmp(&a.average_tenths));
    rankings
}

/// Direction of an energy transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionKind {
    Increase,
    Decrease,
}

impl fmt::Display for TransitionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
        };
        write!(f, "{s}")
    }
}

/// One side of an energy transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitionEndpoint {
    pub content: String,
    pub immersion: u32,
}

/// A jump in immersion between two consecutive active entries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnergyTransition {
    /// Start time of the entry the transition lands on.
    pub time: ClockTime,
    pub kind: TransitionKind,
    /// Signed immersion difference, `to - from`.
    pub difference: i64,
    pub from: TransitionEndpoint,
    pub to: TransitionEndpoint,
}

/// Detects immersion jumps between consecutive non-resting entries.
///
/// Resting entries are filtered out first, preserving relative order; the
/// first remaining entry has no predecessor and never yields a transition.
pub fn energy_transitions(entries: &[Entry], threshold: i64) -> Vec<EnergyTransition> {
    let active: Vec<&Entry> = entries
        .iter()
        .filter(|entry| entry.category != Category::Resting)
        .collect();

    let mut transitions = Vec::new();
    for pair in active.windows(2) {
        let (previous, current) = (pair[0], pair[1]);
        let difference = i64::from(current.immersion) - i64::from(previous.immersion);
        if difference.abs() < threshold {
            continue;
        }
        transitions.push(EnergyTransition {
            time: current.start,
            kind: if difference > 0 {
                TransitionKind::Increase
            } else {
                TransitionKind::Decrease
            },
            difference,
            from: TransitionEndpoint {
                content: previous.content.clone(),
                immersion: previous.immersion,
            },
            to: TransitionEndpoint {
                content: current.content.clone(),
                immersion: current.immersion,
            },
        });
    }
    transitions
}

/// Share of non-resting time spent in high-immersion work or development.
///
/// Returns `round(100 * productive / active)` in `[0, 100]`, and 0 when
/// there are no active minutes at all.
pub fn productivity_score(entries: &[Entry], high_immersion_threshold: u32) -> u32 {
    let mut active_minutes: i64 = 0;
    let mut productive_minutes: i64 = 0;

    for entry in entries {
        if entry.category == Category::Resting {
            continue;
        }
        active_minutes += entry.duration_minutes;
        if entry.category.is_productive() && entry.immersion >= high_immersion_threshold {
            productive_minutes += entry.duration_minutes;
        }
    }

    if active_minutes == 0 {
        return 0;
    }
    let score = (200 * productive_minutes + active_minutes) / (2 * active_minutes);
    u32::try_from(score).unwrap_or(0)
}

/// Stable partition of entries by category, preserving relative order
/// within each group. Display-only: nothing downstream aggregates it.
pub fn group_by_category(entries: &[Entry]) -> HashMap<Category, Vec<Entry>> {
    let mut groups: HashMap<Category, Vec<Entry>> = HashMap::new();
    for entry in entries {
        groups.entry(entry.category).or_default().push(entry.clone());
    }
    groups
}
