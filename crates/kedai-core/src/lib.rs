//! # kedai-core: Pure Business Logic for Kedai POS
//!
//! This crate is the **heart** of Kedai POS. It holds the order lifecycle,
//! the totals engine and payment settlement as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Kedai POS Architecture                           │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Cashier / Kitchen screens                       │   │
//! │  │    Tables ──► Order ──► Kitchen ──► Payment ──► Receipt         │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON commands                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    kedai-db (transactions)                      │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ kedai-core (THIS CRATE) ★                       │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │  totals   │  │ lifecycle │  │settlement │  │   │
//! │  │   │   Order   │  │ subtotal  │  │  status   │  │  change   │  │   │
//! │  │   │ OrderItem │  │ tax/total │  │  guards   │  │  snapshot │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (DiningTable, Order, OrderItem, Transaction, ...)
//! - [`money`] - Money and TaxRate with integer arithmetic (no floating point!)
//! - [`error`] - Domain error types and the [`ErrorKind`] taxonomy
//! - [`validation`] - Input validation
//! - [`totals`] - Subtotal / tax / total recomputation
//! - [`line_items`] - Merge-on-duplicate line editing rules
//! - [`lifecycle`] - Order status transition table and guards
//! - [`settlement`] - Payment validation and change computation
//! - [`numbering`] - Date-scoped document numbers (`ORD-YYYYMMDD-NNNN`)
//! - [`report`] - Daily sales aggregation
//!
//! ## Example Usage
//!
//! ```rust
//! use kedai_core::money::{Money, TaxRate};
//! use kedai_core::totals::Totals;
//!
//! let rate = TaxRate::parse_decimal("0.10").unwrap();
//! let totals = Totals::from_line_totals([Money::from_cents(100_000)], rate).unwrap();
//!
//! assert_eq!(totals.tax.cents(), 10_000);
//! assert_eq!(totals.total.cents(), 110_000);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod lifecycle;
pub mod line_items;
pub mod money;
pub mod numbering;
pub mod report;
pub mod settlement;
pub mod totals;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ErrorKind, ValidationError};
pub use money::{Money, TaxRate};
pub use totals::Totals;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum quantity of a single line item.
///
/// Guards against typing 1000 instead of 10 on the cashier screen.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Number of entries in the "popular items" section of the daily report.
pub const POPULAR_ITEMS_LIMIT: usize = 10;
