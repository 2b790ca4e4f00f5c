//! Daily activity log analyzer CLI.

pub mod cli;
pub mod commands;
pub mod config;
pub mod credential;
pub mod report;

pub use cli::{Cli, Commands, KeyAction};
pub use config::Config;
pub use credential::ApiKeyStore;
