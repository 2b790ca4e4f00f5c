//! Dashboard rendering for an analyzed day.
//!
//! Consumes the statistics snapshot and renders either a human-readable
//! terminal report or a JSON document. Rendering imposes nothing on the
//! core: it is a pure projection of the snapshot shapes.

use std::fmt::Write;

use serde::Serialize;

use dlog_core::{
    Category, ClassificationMode, EnergyTransition, Entry, LogSession, StatsSnapshot,
};

/// Formats minutes as a duration string.
/// Returns "Xh Ym" if >= 1 hour, "Xm" if < 1 hour.
/// Negative durations are treated as 0m.
pub fn format_duration(minutes: i64) -> String {
    if minutes < 0 {
        return "0m".to_string();
    }
    let hours = minutes / 60;
    let rest = minutes % 60;

    if hours >= 1 {
        format!("{hours}h {rest}m")
    } else {
        format!("{rest}m")
    }
}

/// Generates a 10-character progress bar.
/// Values <5% of max get a single block for visibility.
#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss
)]
pub fn progress_bar(value: i64, max: i64) -> String {
    if max == 0 {
        return "░░░░░░░░░░".to_string();
    }

    let ratio = value as f64 / max as f64;
    let filled = if ratio < 0.05 && value > 0 {
        1
    } else {
        (ratio * 10.0).round().min(10.0) as usize
    };

    let empty = 10 - filled;
    format!("{}{}", "█".repeat(filled), "░".repeat(empty))
}

/// Formats the human-readable dashboard.
pub fn format_report(
    session: &LogSession,
    snapshot: &StatsSnapshot,
    mode: ClassificationMode,
) -> String {
    let mut output = String::new();

    writeln!(output, "DAY REPORT").unwrap();
    writeln!(output, "══════════").unwrap();
    writeln!(output).unwrap();
    writeln!(
        output,
        "Total logged: {}    Productivity score: {}/100",
        format_duration(snapshot.total_minutes),
        snapshot.productivity_score
    )
    .unwrap();
    writeln!(output, "Classification: {mode}").unwrap();

    writeln!(output).unwrap();
    writeln!(output, "BY CATEGORY").unwrap();
    writeln!(output, "───────────").unwrap();
    for category in Category::ALL {
        let Some(&minutes) = snapshot.category_minutes.get(&category) else {
            continue;
        };
        writeln!(
            output,
            "  {:<12}{:>8}  {}",
            category.label(),
            format_duration(minutes),
            progress_bar(minutes, snapshot.total_minutes)
        )
        .unwrap();
    }

    writeln!(output).unwrap();
    writeln!(output, "IMMERSION").unwrap();
    writeln!(output, "─────────").unwrap();
    let level_max = snapshot
        .immersion_distribution
        .values()
        .copied()
        .max()
        .unwrap_or(0);
    if level_max == 0 {
        writeln!(output, "  (no immersion recorded)").unwrap();
    } else {
        for level in (1..=5).rev() {
            let Some(&minutes) = snapshot.immersion_distribution.get(&level) else {
                continue;
            };
            writeln!(
                output,
                "  level {level}{:>8}  {}",
                format_duration(minutes),
                progress_bar(minutes, level_max)
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "FOCUS RANKING").unwrap();
    writeln!(output, "─────────────").unwrap();
    if snapshot.immersion_by_category.is_empty() {
        writeln!(output, "  (no focused categories)").unwrap();
    } else {
        for (index, ranking) in snapshot.immersion_by_category.iter().enumerate() {
            writeln!(
                output,
                "  {}. {:<12} avg {:.1}  {}",
                index + 1,
                ranking.category.label(),
                ranking.average_immersion(),
                format_duration(ranking.total_minutes)
            )
            .unwrap();
        }
    }

    writeln!(output).unwrap();
    writeln!(output, "ENERGY SHIFTS").unwrap();
    writeln!(output, "─────────────").unwrap();
    if snapshot.energy_transitions.is_empty() {
        writeln!(output, "  (no significant shifts)").unwrap();
    } else {
        for transition in &snapshot.energy_transitions {
            writeln!(
                output,
                "  {}  {} {:+}  {} ({}) → {} ({})",
                transition.time,
                transition.kind,
                transition.difference,
                transition.from.content,
                transition.from.immersion,
                transition.to.content,
                transition.to.immersion
            )
            .unwrap();
        }
    }

    if !session.thoughts().is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "THOUGHTS").unwrap();
        writeln!(output, "────────").unwrap();
        for thought in session.thoughts() {
            writeln!(output, "  - {thought}").unwrap();
        }
    }

    if !session.actions().is_empty() {
        writeln!(output).unwrap();
        writeln!(output, "ACTIONS").unwrap();
        writeln!(output, "───────").unwrap();
        for action in session.actions() {
            writeln!(output, "  - {action}").unwrap();
        }
    }

    output
}

// ========== JSON Output ==========

#[derive(Debug, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct ImmersionRow {
    pub level: u32,
    pub minutes: i64,
}

#[derive(Debug, Serialize)]
pub struct RankingRow {
    pub category: Category,
    pub average_immersion: f64,
    pub minutes: i64,
}

/// Full report document for `--json` output.
#[derive(Debug, Serialize)]
pub struct JsonReport<'a> {
    pub classification: String,
    pub total_minutes: i64,
    pub productivity_score: u32,
    pub categories: Vec<CategoryRow>,
    pub immersion_distribution: Vec<ImmersionRow>,
    pub focus_ranking: Vec<RankingRow>,
    pub energy_transitions: &'a [EnergyTransition],
    pub entries: &'a [Entry],
    pub thoughts: &'a [String],
    pub actions: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice: Option<String>,
    /// Present when advice was requested but failed; the dashboard above
    /// is still complete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub advice_error: Option<String>,
}

/// Builds the JSON report with deterministic row ordering.
#[must_use]
pub fn build_json_report<'a>(
    session: &'a LogSession,
    snapshot: &'a StatsSnapshot,
    mode: ClassificationMode,
    advice: Option<String>,
    advice_error: Option<String>,
) -> JsonReport<'a> {
    let categories = Category::ALL
        .iter()
        .filter_map(|category| {
            snapshot
                .category_minutes
                .get(category)
                .map(|&minutes| CategoryRow {
                    category: *category,
                    minutes,
                })
        })
        .collect();

    let immersion_distribution = (1..=5)
        .filter_map(|level| {
            snapshot
                .immersion_distribution
                .get(&level)
                .map(|&minutes| ImmersionRow { level, minutes })
        })
        .collect();

    let focus_ranking = snapshot
        .immersion_by_category
        .iter()
        .map(|ranking| RankingRow {
            category: ranking.category,
            average_immersion: ranking.average_immersion(),
            minutes: ranking.total_minutes,
        })
        .collect();

    JsonReport {
        classification: mode.to_string(),
        total_minutes: snapshot.total_minutes,
        productivity_score: snapshot.productivity_score,
        categories,
        immersion_distribution,
        focus_ranking,
        energy_transitions: &snapshot.energy_transitions,
        entries: session.entries(),
        thoughts: session.thoughts(),
        actions: session.actions(),
        advice,
        advice_error,
    }
}
