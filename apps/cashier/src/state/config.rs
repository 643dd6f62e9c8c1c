//! # Application Configuration
//!
//! Process-level settings loaded once at startup.
//!
//! ## Configuration Sources (Priority Order)
//! 1. Environment variables (`KEDAI_*`)
//! 2. Config file (`kedai.toml`)
//! 3. Defaults (this file)
//!
//! Business settings (tax rate, café name, receipt footer) live in the
//! database `settings` table instead; `store_name` here only overrides the
//! name printed on receipts.
//!
//! ## Thread Safety
//! Configuration is read-only after initialization, so no mutex needed.

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use kedai_db::DbConfig;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Config file name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "kedai.toml";

/// Default tracing filter when neither `RUST_LOG` nor the config sets one.
pub const DEFAULT_LOG_FILTER: &str = "info,kedai=debug,sqlx=warn";

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Invalid value for {key}: {value}")]
    InvalidEnv { key: &'static str, value: String },
}

/// Application configuration.
///
/// ## Example `kedai.toml`
/// ```toml
/// database_path = "/var/lib/kedai/kedai.db"
/// store_name = "Kedai Kopi SEHATI - Cabang 2"
/// utc_offset_minutes = 420   # WIB
/// log_filter = "info,kedai=debug"
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// SQLite database file.
    pub database_path: PathBuf,

    /// Overrides the `cafe_name` setting on receipts.
    pub store_name: Option<String>,

    /// Offset from UTC used to derive the business date.
    pub utc_offset_minutes: i32,

    /// Tracing filter; `RUST_LOG` still wins when set.
    pub log_filter: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            database_path: default_database_path(),
            store_name: None,
            utc_offset_minutes: 0,
            log_filter: None,
        }
    }
}

impl AppConfig {
    /// Loads the layered configuration for this process.
    ///
    /// ## Lookup
    /// ```text
    /// KEDAI_CONFIG set?      ──yes──► read that file (must exist)
    ///        │ no
    ///        ▼
    /// <config dir>/kedai.toml exists? ──yes──► read it
    ///        │ no
    ///        ▼
    /// defaults
    ///
    /// then KEDAI_DB_PATH, KEDAI_STORE_NAME, KEDAI_UTC_OFFSET_MINUTES, KEDAI_LOG
    /// ```
    pub fn load() -> Result<Self, ConfigError> {
        let mut config = match std::env::var("KEDAI_CONFIG") {
            Ok(path) => AppConfig::from_file(Path::new(&path))?,
            Err(_) => match default_config_path() {
                Some(path) if path.is_file() => AppConfig::from_file(&path)?,
                _ => AppConfig::default(),
            },
        };

        config.apply_env(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Reads a TOML config file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Applies `KEDAI_*` overrides using `lookup` to read variables.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("KEDAI_DB_PATH") {
            self.database_path = PathBuf::from(path);
        }

        if let Some(name) = lookup("KEDAI_STORE_NAME") {
            self.store_name = Some(name);
        }

        if let Some(raw) = lookup("KEDAI_UTC_OFFSET_MINUTES") {
            self.utc_offset_minutes = raw.trim().parse().map_err(|_| ConfigError::InvalidEnv {
                key: "KEDAI_UTC_OFFSET_MINUTES",
                value: raw.clone(),
            })?;
        }

        if let Some(filter) = lookup("KEDAI_LOG") {
            self.log_filter = Some(filter);
        }

        Ok(())
    }

    /// Tracing filter to use when `RUST_LOG` is unset.
    pub fn log_filter(&self) -> &str {
        self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER)
    }

    /// Database settings derived from this configuration.
    pub fn db_config(&self) -> DbConfig {
        DbConfig::new(&self.database_path).utc_offset_minutes(self.utc_offset_minutes)
    }
}

/// `<data dir>/kedai.db`, or `kedai.db` in the working directory when the
/// platform has no data directory.
///
/// - **Linux**: `~/.local/share/kedai/kedai.db`
/// - **macOS**: `~/Library/Application Support/id.kedai.kedai/kedai.db`
/// - **Windows**: `%APPDATA%\kedai\kedai\data\kedai.db`
fn default_database_path() -> PathBuf {
    ProjectDirs::from("id", "kedai", "kedai")
        .map(|dirs| dirs.data_dir().join("kedai.db"))
        .unwrap_or_else(|| PathBuf::from("kedai.db"))
}

fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("id", "kedai", "kedai").map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
}
