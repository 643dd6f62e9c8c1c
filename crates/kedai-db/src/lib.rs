//! # kedai-db: Database Layer for Kedai POS
//!
//! This crate runs the order engine against SQLite: every lifecycle,
//! line editing and settlement operation is one database transaction with
//! all `kedai-core` guards evaluated before the first write.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kedai POS Data Flow                              │
//! │                                                                         │
//! │  Cashier command (add_item, pay, ...)                                  │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     kedai-db (THIS CRATE)                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │               │    │  (embedded)  │  │   │
//! │  │   │               │    │ TableRepo     │    │ 001_schema   │  │   │
//! │  │   │ SqlitePool    │◄───│ OrderRepo     │    │ 002_settings │  │   │
//! │  │   │ UTC offset    │    │ PaymentRepo   │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite (WAL)                                                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use kedai_db::{Database, DbConfig};
//! use kedai_core::PaymentMethod;
//!
//! let db = Database::new(DbConfig::new("kedai.db").utc_offset_minutes(420)).await?;
//!
//! let order = db.orders().open_order(&table_id, "kasir-1", None).await?;
//! db.orders().add_item(&order.id, &menu_id, 2, Some("less sugar")).await?;
//! db.orders().send_to_kitchen(&order.id).await?;
//! let paid = db.payments().pay(&order.id, PaymentMethod::Cash, 5_000_000, None).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::menu::{MenuRepository, NewMenuItem};
pub use repository::order::OrderRepository;
pub use repository::payment::PaymentRepository;
pub use repository::report::ReportRepository;
pub use repository::settings::{SettingsRepository, StoreProfile};
pub use repository::table::TableRepository;
