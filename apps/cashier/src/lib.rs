//! # Kedai Cashier Library
//!
//! Command adapter between the cashier/kitchen screens and the order engine.
//!
//! ## Module Organization
//! ```text
//! kedai_cashier_lib/
//! ├── lib.rs          ◄─── You are here (startup & request loop)
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Layered process configuration
//! ├── commands/
//! │   ├── mod.rs      ◄─── Request parsing & dispatch
//! │   ├── table.rs    ◄─── Floor overview & table admin
//! │   ├── menu.rs     ◄─── Menu listing
//! │   ├── order.rs    ◄─── Order lifecycle & line editing
//! │   ├── kitchen.rs  ◄─── Kitchen queue
//! │   ├── payment.rs  ◄─── Settlement & receipt
//! │   ├── report.rs   ◄─── Daily sales report
//! │   └── config.rs   ◄─── Configuration retrieval
//! └── error.rs        ◄─── API error type for commands
//! ```
//!
//! The transport is line-delimited JSON on stdin/stdout; logs go to stderr
//! so they never interleave with responses.

pub mod commands;
pub mod error;
pub mod state;

use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use kedai_db::Database;
use state::{AppConfig, AppState};

/// Written when a response cannot be encoded, so the caller still gets a line.
const SERIALIZATION_FAILED: &str =
    r#"{"ok":false,"error":{"code":"INTERNAL","message":"Response serialization failed"}}"#;

/// Runs the cashier adapter until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Load Configuration ───────────────────────────────────────────────► │
/// │     • defaults < kedai.toml < KEDAI_* environment                       │
/// │                                                                         │
/// │  2. Initialize Logging ───────────────────────────────────────────────► │
/// │     • RUST_LOG, else config log_filter, else info,kedai=debug,sqlx=warn │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode, pending migrations applied                  │
/// │                                                                         │
/// │  4. Serve ────────────────────────────────────────────────────────────► │
/// │     • one request per stdin line, one response per stdout line          │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config);

    info!(db_path = ?config.database_path, "Starting Kedai cashier");

    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    let db = Database::new(config.db_config()).await?;
    info!("Database connected and migrations applied");

    let state = AppState::new(db, config);
    serve(&state).await?;

    state.database().close().await;
    info!("Stdin closed, shutting down");
    Ok(())
}

/// Reads requests from stdin until EOF.
async fn serve(state: &AppState) -> std::io::Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let response = commands::handle_line(state, &line).await;
        let mut out = match serde_json::to_string(&response) {
            Ok(out) => out,
            Err(e) => {
                error!("Response serialization failed: {}", e);
                SERIALIZATION_FAILED.to_string()
            }
        };
        out.push('\n');

        stdout.write_all(out.as_bytes()).await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=kedai=trace` - Show trace for kedai crates only
/// - Default: `log_filter` from config, else `info,kedai=debug,sqlx=warn`
fn init_tracing(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config.log_filter()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
