//! Configuration settings for breathe.
//!
//! Settings are loaded from `~/.breathe/config.yaml`. Every field has a
//! default, so a partial file is fine.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cli::args::OutputFormat;
use crate::config::Paths;
use crate::error::BreatheError;
use crate::features::breathing::{PhaseDurations, DEFAULT_CHALLENGE_ID, DEFAULT_TARGET_CYCLES};

/// Main configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// General settings.
    pub general: GeneralConfig,
    /// Breathing exercise settings.
    pub breathing: BreathingConfig,
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct GeneralConfig {
    /// Default output format.
    pub default_output: OutputFormat,
    /// Color output setting.
    pub color: ColorSetting,
}

/// Color output setting.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ColorSetting {
    /// Auto-detect based on terminal.
    #[default]
    Auto,
    /// Always use colors.
    Always,
    /// Never use colors.
    Never,
}

impl ColorSetting {
    /// Apply the setting to `colored`'s global override.
    pub fn apply(self) {
        match self {
            Self::Auto => colored::control::unset_override(),
            Self::Always => colored::control::set_override(true),
            Self::Never => colored::control::set_override(false),
        }
    }
}

/// Breathing exercise settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BreathingConfig {
    /// Cycles per session.
    pub target_cycles: u32,
    /// Challenge that finished sessions are checked into.
    pub challenge_id: String,
    /// Phase lengths in seconds.
    pub phases: PhaseDurations,
}

impl Default for BreathingConfig {
    fn default() -> Self {
        Self {
            target_cycles: DEFAULT_TARGET_CYCLES,
            challenge_id: DEFAULT_CHALLENGE_ID.to_string(),
            phases: PhaseDurations::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load() -> Result<Self, BreatheError> {
        let paths = Paths::new()?;
        Self::load_from_path(&paths.config_file)
    }

    /// Load configuration from a specific path.
    ///
    /// If the config file doesn't exist, returns default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed.
    pub fn load_from_path(path: &Path) -> Result<Self, BreatheError> {
        if !path.exists() {
            tracing::debug!(path = %path.display(), "No config file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|e| {
            BreatheError::Config(format!("Failed to read config file {}: {e}", path.display()))
        })?;

        serde_yaml::from_str(&contents).map_err(|e| {
            BreatheError::Config(format!("Failed to parse config file {}: {e}", path.display()))
        })
    }
}
