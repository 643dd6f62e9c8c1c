//! # State Module
//!
//! What command handlers receive.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │  AppState                                                       │   │
//! │  │  ┌──────────────────────────┐ ┌──────────────────────────────┐  │   │
//! │  │  │ DbState                  │ │ AppConfig                    │  │   │
//! │  │  │ Database (SQLite pool)   │ │ db path, store name,         │  │   │
//! │  │  │                          │ │ utc offset, log filter       │  │   │
//! │  │  └──────────────────────────┘ └──────────────────────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • AppConfig: Read-only after initialization                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::{AppConfig, ConfigError, CONFIG_FILE_NAME, DEFAULT_LOG_FILTER};
pub use db::DbState;

use kedai_db::Database;

/// Everything a command may touch.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DbState,
    pub config: AppConfig,
}

impl AppState {
    pub fn new(db: Database, config: AppConfig) -> Self {
        AppState {
            db: DbState::new(db),
            config,
        }
    }

    /// Shorthand for `self.db.inner()`.
    pub fn database(&self) -> &Database {
        self.db.inner()
    }
}
