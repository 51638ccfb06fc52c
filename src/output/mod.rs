//! Output formatting for breathe.
//!
//! Every command result can be shown as colored text or as JSON.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::error::BreatheError;
use crate::features::breathing::{DailyCheckIn, ExitReport, ProgressSummary};

pub use json::*;
pub use pretty::*;

/// Format the result of leaving a breathing session.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_exit(
    report: Option<&ExitReport>,
    completed_sessions: u32,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_exit_pretty(report, completed_sessions)),
        OutputFormat::Json => format_exit_json(report, completed_sessions),
    }
}

/// Format challenge progress.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_progress(
    summary: &ProgressSummary,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_progress_pretty(summary)),
        OutputFormat::Json => to_json(summary),
    }
}

/// Format the daily check-in history.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if JSON serialization fails.
pub fn format_history(
    challenge_id: &str,
    days: &[DailyCheckIn],
    format: OutputFormat,
) -> Result<String, BreatheError> {
    match format {
        OutputFormat::Pretty => Ok(format_history_pretty(challenge_id, days)),
        OutputFormat::Json => format_history_json(challenge_id, days),
    }
}
