//! Error types for breathe.

use thiserror::Error;

/// Errors produced by the breathing engine and its host.
#[derive(Debug, Error)]
pub enum BreatheError {
    /// A phase was configured with a non-positive duration.
    #[error("Invalid phase duration: {0} (must be a positive number of seconds)")]
    InvalidDuration(i64),

    /// `start()` was called while a session is still active.
    #[error("A breathing session is already running ({0})")]
    AlreadyRunning(String),

    /// `start()` was called with zero target cycles.
    #[error("Invalid cycle count: {0} (must be at least 1)")]
    InvalidCycleCount(u32),

    /// The progress tracker returned data the engine cannot use.
    #[error("Malformed challenge progress: {0}")]
    MalformedProgress(String),

    /// Configuration problem (paths, config file, terminal setup).
    #[error("Configuration error: {0}")]
    Config(String),

    /// Database problem.
    #[error("Database error: {0}")]
    Database(String),

    /// Requested record does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Parse or serialization failure.
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O failure.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for BreatheError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e.to_string())
    }
}

impl From<serde_json::Error> for BreatheError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
