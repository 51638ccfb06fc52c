//! JSON output formatting for breathe.

use serde::Serialize;
use serde_json::json;

use crate::error::BreatheError;
use crate::features::breathing::{DailyCheckIn, ExitReport};

/// Serialize any value as pretty JSON.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if serialization fails.
pub fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<String, BreatheError> {
    Ok(serde_json::to_string_pretty(value)?)
}

/// Format an exit report as JSON.
///
/// `report` is `null` when nothing was recorded.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if serialization fails.
pub fn format_exit_json(
    report: Option<&ExitReport>,
    completed_sessions: u32,
) -> Result<String, BreatheError> {
    let output = json!({
        "completed_sessions": completed_sessions,
        "report": report,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format daily check-ins as JSON.
///
/// # Errors
///
/// Returns `BreatheError::Parse` if serialization fails.
pub fn format_history_json(
    challenge_id: &str,
    days: &[DailyCheckIn],
) -> Result<String, BreatheError> {
    let output = json!({
        "challenge_id": challenge_id,
        "count": days.len(),
        "days": days,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}
