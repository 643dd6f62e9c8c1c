//! # Kedai Cashier Entry Point
//!
//! ```text
//! screen ──(JSON line)──► stdin ─► kedai-cashier ─► stdout ──(JSON line)──► screen
//!                                        │
//!                                        ▼
//!                                  kedai.db (SQLite)
//! ```
//!
//! The actual setup is in lib.rs for better testability.

#[tokio::main]
async fn main() {
    if let Err(e) = kedai_cashier_lib::run().await {
        eprintln!("kedai-cashier: {e}");
        std::process::exit(1);
    }
}
