//! Command-line argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Daily activity log analyzer.
///
/// Parses a day's free-text activity log, classifies each time block into
/// a life category (Claude API with a deterministic local fallback), and
/// prints aggregate statistics and trend signals.
#[derive(Debug, Parser)]
#[command(name = "dlog", version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to config file.
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available subcommands.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Analyze a daily log file and print the dashboard.
    Analyze {
        /// Path to the log file.
        file: PathBuf,

        /// Skip the remote classifier and use local keyword/time rules.
        #[arg(long)]
        offline: bool,

        /// Output the full report as JSON.
        #[arg(long)]
        json: bool,

        /// Also request coaching advice for the day.
        #[arg(long)]
        advice: bool,
    },

    /// Manage the stored Claude API key.
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

/// API key management actions.
#[derive(Debug, Subcommand)]
pub enum KeyAction {
    /// Store an API key.
    Set {
        /// The API key to store.
        key: String,
    },

    /// Show whether a key is stored (masked).
    Show,

    /// Remove the stored key.
    Clear,
}
