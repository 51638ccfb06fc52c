//! Challenge progress commands: `progress`, `history`, `clear`.

use chrono::Local;
use colored::Colorize;

use crate::cli::args::{ChallengeArgs, OutputFormat};
use crate::config::Config;
use crate::error::BreatheError;
use crate::features::breathing::ChallengeStore;
use crate::output::{format_history, format_progress, to_json};

fn challenge_id(config: &Config, args: ChallengeArgs) -> String {
    args.challenge
        .unwrap_or_else(|| config.breathing.challenge_id.clone())
}

/// Show totals and today's count for a challenge.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn progress(
    config: &Config,
    args: ChallengeArgs,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    let store = ChallengeStore::new()?;
    let id = challenge_id(config, args);
    let summary = store.summary(&id, Local::now().date_naive())?;
    format_progress(&summary, format)
}

/// Show the most recent daily check-ins.
///
/// # Errors
///
/// Returns an error if the store cannot be read.
pub fn history(
    config: &Config,
    args: ChallengeArgs,
    limit: usize,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    let store = ChallengeStore::new()?;
    let id = challenge_id(config, args);
    let days = store.recent_days(&id, limit)?;
    format_history(&id, &days, format)
}

/// Delete stored progress for a challenge.
///
/// # Errors
///
/// Returns `BreatheError::Config` without `--force`, or a storage error.
pub fn clear(
    config: &Config,
    args: ChallengeArgs,
    force: bool,
    format: OutputFormat,
) -> Result<String, BreatheError> {
    let id = challenge_id(config, args);
    if !force {
        return Err(BreatheError::Config(format!(
            "This deletes all progress for '{id}'. Re-run with --force to confirm."
        )));
    }

    let store = ChallengeStore::new()?;
    let removed = store.clear(&id)?;
    tracing::info!(challenge = %id, removed, "Cleared challenge progress");

    match format {
        OutputFormat::Json => to_json(&serde_json::json!({
            "challenge_id": id,
            "removed": removed,
        })),
        OutputFormat::Pretty => Ok(if removed {
            format!("{} Cleared progress for {id}", "✓".green())
        } else {
            format!("Nothing stored for {id}.")
        }),
    }
}
