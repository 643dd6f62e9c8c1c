//! # Repository Module
//!
//! Database repository implementations for Kedai POS.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Cashier command                                                       │
//! │       │  db.orders().add_item(order_id, menu_item_id, 2, None)         │
//! │       ▼                                                                 │
//! │  OrderRepository                                                       │
//! │  ├── guards from kedai_core (lifecycle, line_items, settlement)        │
//! │  ├── SQL on one transaction                                            │
//! │  └── shared helpers: fetch_order, fetch_table, next_number, tax_rate   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`table::TableRepository`] - Table administration and current-order view
//! - [`menu::MenuRepository`] - Catalog lookup
//! - [`order::OrderRepository`] - Order lifecycle and line editing
//! - [`payment::PaymentRepository`] - Settlement
//! - [`settings::SettingsRepository`] - Key/value configuration store
//! - [`report::ReportRepository`] - Daily sales report
//! - [`sequence`] - Date-scoped document numbers
//!
//! ## Write Transactions
//! Every mutating operation opens its transaction with [`begin_write`],
//! which issues `BEGIN IMMEDIATE`. The write lock is taken before the first
//! read, so two writers queue on `busy_timeout` instead of one of them
//! failing with `SQLITE_BUSY` when it upgrades a read snapshot that the
//! other has already invalidated.

pub mod menu;
pub mod order;
pub mod payment;
pub mod report;
pub mod sequence;
pub mod settings;
pub mod table;

use sqlx::{Sqlite, SqlitePool, Transaction};

use crate::error::DbResult;

/// Starts a transaction that holds the database write lock from the start.
pub(crate) async fn begin_write(pool: &SqlitePool) -> DbResult<Transaction<'static, Sqlite>> {
    Ok(pool.begin_with("BEGIN IMMEDIATE").await?)
}
