//! Challenge progress reporting.
//!
//! The breathing engine does not own challenge data. It talks to a
//! [`ProgressReporter`] once per visit, when the user leaves the exercise.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::BreatheError;

/// Challenge the breathing exercise reports into by default.
pub const DEFAULT_CHALLENGE_ID: &str = "master-of-air-breathing";

/// Counters stored for a challenge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeProgress {
    /// Total check-ins recorded for the challenge
    pub check_ins: i64,
    /// Current streak in days
    pub streak: i64,
}

/// Persistence collaborator for challenge progress.
#[cfg_attr(test, mockall::automock)]
pub trait ProgressReporter {
    /// Read the current counters for a challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the counters cannot be read.
    fn challenge_progress(&self, challenge_id: &str) -> Result<ChallengeProgress, BreatheError>;

    /// Overwrite the counters for a challenge.
    ///
    /// # Errors
    ///
    /// Returns an error if the counters cannot be written.
    fn update_challenge_progress(
        &self,
        challenge_id: &str,
        streak_delta: i64,
        streak: i64,
        new_check_ins: i64,
    ) -> Result<(), BreatheError>;

    /// Per-day check-in counts keyed by ISO date (`YYYY-MM-DD`).
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    fn daily_check_ins(&self, challenge_id: &str) -> Result<BTreeMap<String, i64>, BreatheError>;

    /// Set the check-in count for one day.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be written.
    fn add_daily_check_in(
        &self,
        challenge_id: &str,
        date: &str,
        count: i64,
    ) -> Result<(), BreatheError>;
}

/// What an exit wrote to the tracker.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitReport {
    /// Challenge that was updated
    pub challenge_id: String,
    /// Sessions added to the check-in total by this exit
    pub sessions_reported: u32,
    /// Breaths completed this visit (sessions × cycles per session)
    pub breaths_completed: u32,
    /// Check-in total after the update
    pub check_ins: i64,
    /// Streak as stored
    pub streak: i64,
    /// Date the daily entry was written for
    pub date: NaiveDate,
    /// Daily count after the update
    pub today_count: i64,
}

/// Format a date as a ledger key.
#[must_use]
pub fn date_key(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

/// Read-modify-write the challenge counters after `sessions` new completions.
///
/// Returns the updated progress. Negative counters from the reporter are
/// rejected before anything is written.
///
/// # Errors
///
/// Returns `BreatheError::MalformedProgress` for unusable counters, or the
/// reporter's own error.
pub fn flush_sessions(
    reporter: &dyn ProgressReporter,
    challenge_id: &str,
    sessions: u32,
) -> Result<ChallengeProgress, BreatheError> {
    let current = reporter.challenge_progress(challenge_id)?;
    if current.check_ins < 0 || current.streak < 0 {
        tracing::warn!(
            challenge = challenge_id,
            check_ins = current.check_ins,
            streak = current.streak,
            "Reporter returned negative counters"
        );
        return Err(BreatheError::MalformedProgress(format!(
            "negative counters for {challenge_id}: check_ins={}, streak={}",
            current.check_ins, current.streak
        )));
    }

    let new_check_ins = current.check_ins + i64::from(sessions);
    reporter.update_challenge_progress(challenge_id, 0, current.streak, new_check_ins)?;

    Ok(ChallengeProgress {
        check_ins: new_check_ins,
        streak: current.streak,
    })
}

/// Bump today's entry in the daily check-in ledger by one.
///
/// Returns the new count for the day.
///
/// # Errors
///
/// Returns `BreatheError::MalformedProgress` if today's stored count is
/// negative, or the reporter's own error.
pub fn record_daily_check_in(
    reporter: &dyn ProgressReporter,
    challenge_id: &str,
    today: NaiveDate,
) -> Result<i64, BreatheError> {
    let key = date_key(today);
    let ledger = reporter.daily_check_ins(challenge_id)?;
    let today_count = ledger.get(&key).copied().unwrap_or(0);
    if today_count < 0 {
        tracing::warn!(challenge = challenge_id, date = %key, today_count, "Negative daily count");
        return Err(BreatheError::MalformedProgress(format!(
            "negative daily count for {challenge_id} on {key}: {today_count}"
        )));
    }

    let count = today_count + 1;
    reporter.add_daily_check_in(challenge_id, &key, count)?;
    Ok(count)
}
