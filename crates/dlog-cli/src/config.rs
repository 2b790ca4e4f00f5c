//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use dlog_core::AnalysisConfig;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Claude model used for classification and advice.
    pub model: String,

    /// API key override; the stored credential file is used when absent.
    pub api_key: Option<String>,

    /// Minimum immersion jump that counts as an energy transition.
    pub energy_change_threshold: i64,

    /// Immersion level at or above which time counts as high-immersion.
    pub high_immersion_threshold: u32,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_deref().map(|_| "[REDACTED]"))
            .field("energy_change_threshold", &self.energy_change_threshold)
            .field("high_immersion_threshold", &self.high_immersion_threshold)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-20250514".to_string(),
            api_key: None,
            energy_change_threshold: 2,
            high_immersion_threshold: 4,
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (DLOG_*)
        figment = figment.merge(Env::prefixed("DLOG_"));

        figment.extract()
    }

    /// Analysis knobs derived from this configuration.
    #[must_use]
    pub const fn analysis(&self) -> AnalysisConfig {
        AnalysisConfig {
            energy_change_threshold: self.energy_change_threshold,
            high_immersion_threshold: self.high_immersion_threshold,
        }
    }
}

/// Returns the platform-specific config directory for dlog.
///
/// On Linux: `~/.config/dlog`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("dlog"))
}
