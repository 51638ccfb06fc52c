//! Database migrations for breathe.
//!
//! Each migration upgrades the schema by one version and runs when the
//! database is opened. The version lives in `PRAGMA user_version`.

use rusqlite::Connection;

use crate::error::BreatheError;

/// Current schema version.
const CURRENT_VERSION: i32 = 1;

/// Get the current schema version from the database.
///
/// Returns 0 for a new database.
pub fn get_version(conn: &Connection) -> Result<i32, BreatheError> {
    conn.query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| BreatheError::Database(format!("Failed to get schema version: {e}")))
}

fn set_version(conn: &Connection, version: i32) -> Result<(), BreatheError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| BreatheError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), BreatheError> {
    let current = get_version(conn)?;

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::info!(version, "Running database migration");
        match version {
            1 => migrate_v1(conn)?,
            _ => {
                return Err(BreatheError::Database(format!(
                    "Unknown migration version: {version}"
                )))
            }
        }
        set_version(conn, version)?;
    }

    Ok(())
}

/// Migration v1: challenge counters and the daily ledger.
fn migrate_v1(conn: &Connection) -> Result<(), BreatheError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS challenge_progress (
            challenge_id TEXT PRIMARY KEY,
            check_ins INTEGER NOT NULL DEFAULT 0,
            streak INTEGER NOT NULL DEFAULT 0,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS daily_check_ins (
            challenge_id TEXT NOT NULL,
            date TEXT NOT NULL,
            count INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (challenge_id, date)
        );

        CREATE INDEX IF NOT EXISTS idx_daily_check_ins_date
        ON daily_check_ins(challenge_id, date DESC);
        ",
    )
    .map_err(|e| BreatheError::Database(format!("Migration v1 failed: {e}")))
}
