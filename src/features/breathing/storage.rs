//! Challenge progress storage.
//!
//! Persists challenge counters and the daily check-in ledger to the local
//! database. This is the [`ProgressReporter`] used by the command line.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rusqlite::params;
use serde::{Deserialize, Serialize};

use super::reporter::{date_key, ChallengeProgress, ProgressReporter};
use crate::error::BreatheError;
use crate::storage::Database;

/// One day in the check-in ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyCheckIn {
    /// Calendar day
    pub date: NaiveDate,
    /// Check-ins on that day
    pub count: i64,
}

/// Challenge totals plus the count for one day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressSummary {
    /// Challenge id
    pub challenge_id: String,
    /// Total check-ins
    pub check_ins: i64,
    /// Current streak in days
    pub streak: i64,
    /// Day the count refers to
    pub date: NaiveDate,
    /// Check-ins on that day
    pub today_count: i64,
}

/// SQLite-backed challenge tracker.
pub struct ChallengeStore {
    db: Database,
}

impl ChallengeStore {
    /// Open the store in the default database.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened.
    pub fn new() -> Result<Self, BreatheError> {
        let db = Database::open()?;
        Ok(Self { db })
    }

    /// Create storage with an existing database connection.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self { db }
    }

    /// Totals for a challenge and its check-in count on `today`.
    ///
    /// # Errors
    ///
    /// Returns an error if either query fails.
    pub fn summary(
        &self,
        challenge_id: &str,
        today: NaiveDate,
    ) -> Result<ProgressSummary, BreatheError> {
        let progress = self.challenge_progress(challenge_id)?;
        let today_count = self
            .daily_check_ins(challenge_id)?
            .get(&date_key(today))
            .copied()
            .unwrap_or(0);

        Ok(ProgressSummary {
            challenge_id: challenge_id.to_string(),
            check_ins: progress.check_ins,
            streak: progress.streak,
            date: today,
            today_count,
        })
    }

    /// Most recent days with check-ins, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or a stored date is unreadable.
    pub fn recent_days(
        &self,
        challenge_id: &str,
        limit: usize,
    ) -> Result<Vec<DailyCheckIn>, BreatheError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT date, count FROM daily_check_ins
                  WHERE challenge_id = ?1
                  ORDER BY date DESC
                  LIMIT ?2",
            )
            .map_err(|e| BreatheError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params![challenge_id, limit], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| BreatheError::Database(format!("Failed to query check-ins: {e}")))?;

        let mut days = Vec::new();
        for row in rows {
            let (date, count) = row.map_err(|e| BreatheError::Database(e.to_string()))?;
            let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d").map_err(|e| {
                BreatheError::MalformedProgress(format!("bad ledger date {date:?}: {e}"))
            })?;
            days.push(DailyCheckIn { date, count });
        }

        Ok(days)
    }

    /// Delete everything stored for a challenge.
    ///
    /// Returns true if anything was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self, challenge_id: &str) -> Result<bool, BreatheError> {
        let conn = self.db.connection();

        let progress = conn
            .execute(
                "DELETE FROM challenge_progress WHERE challenge_id = ?1",
                [challenge_id],
            )
            .map_err(|e| BreatheError::Database(format!("Failed to clear progress: {e}")))?;
        let daily = conn
            .execute(
                "DELETE FROM daily_check_ins WHERE challenge_id = ?1",
                [challenge_id],
            )
            .map_err(|e| BreatheError::Database(format!("Failed to clear check-ins: {e}")))?;

        Ok(progress + daily > 0)
    }
}

impl ProgressReporter for ChallengeStore {
    fn challenge_progress(&self, challenge_id: &str) -> Result<ChallengeProgress, BreatheError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare(
                r"SELECT check_ins, streak FROM challenge_progress
                  WHERE challenge_id = ?1",
            )
            .map_err(|e| BreatheError::Database(format!("Failed to prepare query: {e}")))?;

        let result = stmt
            .query_row([challenge_id], |row| {
                Ok(ChallengeProgress {
                    check_ins: row.get(0)?,
                    streak: row.get(1)?,
                })
            })
            .optional()
            .map_err(|e| BreatheError::Database(format!("Failed to query progress: {e}")))?;

        // A challenge nobody has checked into yet starts from zero
        Ok(result.unwrap_or_default())
    }

    fn update_challenge_progress(
        &self,
        challenge_id: &str,
        streak_delta: i64,
        streak: i64,
        new_check_ins: i64,
    ) -> Result<(), BreatheError> {
        let conn = self.db.connection();

        conn.execute(
            r"INSERT INTO challenge_progress (challenge_id, check_ins, streak, updated_at)
              VALUES (?1, ?2, ?3, ?4)
              ON CONFLICT(challenge_id) DO UPDATE SET
                check_ins = excluded.check_ins,
                streak = excluded.streak,
                updated_at = excluded.updated_at",
            params![
                challenge_id,
                new_check_ins,
                streak + streak_delta,
                Utc::now().to_rfc3339(),
            ],
        )
        .map_err(|e| BreatheError::Database(format!("Failed to update progress: {e}")))?;

        Ok(())
    }

    fn daily_check_ins(&self, challenge_id: &str) -> Result<BTreeMap<String, i64>, BreatheError> {
        let conn = self.db.connection();

        let mut stmt = conn
            .prepare("SELECT date, count FROM daily_check_ins WHERE challenge_id = ?1")
            .map_err(|e| BreatheError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([challenge_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })
            .map_err(|e| BreatheError::Database(format!("Failed to query check-ins: {e}")))?;

        let mut ledger = BTreeMap::new();
        for row in rows {
            let (date, count) = row.map_err(|e| BreatheError::Database(e.to_string()))?;
            ledger.insert(date, count);
        }

        Ok(ledger)
    }

    fn add_daily_check_in(
        &self,
        challenge_id: &str,
        date: &str,
        count: i64,
    ) -> Result<(), BreatheError> {
        let parsed = NaiveDate::parse_from_str(date, "%Y-%m-%d")
            .map_err(|e| BreatheError::Parse(format!("Invalid check-in date {date:?}: {e}")))?;

        self.db.execute(
            r"INSERT INTO daily_check_ins (challenge_id, date, count)
              VALUES (?1, ?2, ?3)
              ON CONFLICT(challenge_id, date) DO UPDATE SET count = excluded.count",
            &[&challenge_id, &date_key(parsed), &count],
        )?;

        Ok(())
    }
}

// Add optional() extension for rusqlite
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error>;
}

impl<T> OptionalExt<T> for Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>, rusqlite::Error> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e),
        }
    }
}
