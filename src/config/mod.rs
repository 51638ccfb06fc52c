//! Configuration management for breathe.
//!
//! Loads settings from `~/.breathe/` and resolves data paths.

mod paths;
mod settings;

pub use paths::Paths;
pub use settings::{BreathingConfig, ColorSetting, Config, GeneralConfig};
