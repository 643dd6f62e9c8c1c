//! # Database State
//!
//! Wraps the `Database` handle shared by every command.
//!
//! ## Thread Safety
//! `Database` holds a `SqlitePool`, so commands can run concurrently
//! without explicit locking. Each repository call is its own transaction.

use kedai_db::Database;

/// Wrapper around `Database` for command handlers.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    ///
    /// ## Usage
    /// ```rust,ignore
    /// let tables = state.db.inner().tables().list().await?;
    /// ```
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
