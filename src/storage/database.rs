//! `SQLite` database connection and operations.
//!
//! The database lives at `~/.breathe/breathe.db` and holds challenge counters
//! and the daily check-in ledger.

use std::path::Path;

use rusqlite::Connection;

use crate::config::Paths;
use crate::error::BreatheError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the default location.
    ///
    /// # Errors
    ///
    /// Returns an error if the home directory is unknown, the database cannot
    /// be opened, or migrations fail.
    pub fn open() -> Result<Self, BreatheError> {
        Self::open_with_paths(&Paths::new()?)
    }

    /// Open the database under a resolved set of paths, creating directories.
    ///
    /// # Errors
    ///
    /// Returns an error if directories cannot be created, the database cannot
    /// be opened, or migrations fail.
    pub fn open_with_paths(paths: &Paths) -> Result<Self, BreatheError> {
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &Path) -> Result<Self, BreatheError> {
        let conn = Connection::open(path).map_err(|e| {
            BreatheError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;
        tracing::debug!(path = %path.display(), "Opened database");
        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, BreatheError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            BreatheError::Database(format!("Failed to open in-memory database: {e}"))
        })?;
        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, BreatheError> {
        conn.busy_timeout(std::time::Duration::from_secs(2))
            .map_err(|e| BreatheError::Database(format!("Failed to set busy timeout: {e}")))?;

        migrations::run(&conn)?;
        Ok(Self { conn })
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, BreatheError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Execute a statement that returns no rows.
    ///
    /// # Errors
    ///
    /// Returns an error if the statement fails.
    pub fn execute(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<usize, BreatheError> {
        self.conn
            .execute(sql, params)
            .map_err(|e| BreatheError::Database(format!("Query failed: {e}")))
    }
}
