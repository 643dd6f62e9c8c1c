//! # Error Types
//!
//! Domain-specific error types for kedai-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  kedai-core errors (this file)                                         │
//! │  ├── CoreError        - Lifecycle / settlement rule violations         │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── ErrorKind        - NotFound | InvalidArgument | InvalidState      │
//! │                         | Conflict | Internal                          │
//! │                                                                         │
//! │  kedai-db errors (separate crate)                                      │
//! │  └── DbError          - Database failures, wraps CoreError             │
//! │                                                                         │
//! │  Cashier app errors                                                    │
//! │  └── ApiError         - What the screen sees (serialized)              │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → DbError → ApiError → Frontend     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every guard runs before any write, so a returned error always means
//! nothing was persisted.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use crate::money::Money;
use crate::types::OrderStatus;

// =============================================================================
// Error Kind
// =============================================================================

/// The failure category a caller branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A referenced table, order, line item or menu entry does not exist.
    NotFound,
    /// Malformed input: quantity < 1, negative tender, short cash payment.
    InvalidArgument,
    /// The operation is illegal for the order's current status.
    InvalidState,
    /// Occupancy or settlement uniqueness would be violated.
    Conflict,
    /// Infrastructure failure (database, configuration).
    Internal,
}

// =============================================================================
// Core Error
// =============================================================================

/// Business rule violations raised by the lifecycle, line editor and
/// settlement logic.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Referenced entity does not exist.
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// The status transition is not in the transition table.
    ///
    /// ## When This Occurs
    /// - Cancelling an order that already left `pending`
    /// - Skipping a kitchen step (`sent_to_kitchen` → `ready`)
    /// - Any transition out of `paid` or `cancelled`
    #[error("Order {order_id} cannot move from {from} to {to}")]
    InvalidTransition {
        order_id: String,
        from: OrderStatus,
        to: OrderStatus,
    },

    /// An order without line items was sent to the kitchen.
    #[error("Order {order_id} has no items and cannot be sent to the kitchen")]
    EmptyOrder { order_id: String },

    /// The order is `paid` or `cancelled` and can no longer be edited or moved.
    #[error("Order {order_id} is {status} and can no longer be changed")]
    OrderClosed {
        order_id: String,
        status: OrderStatus,
    },

    /// The menu item exists but is switched off in the catalog.
    #[error("Menu item {menu_item_id} is not available")]
    MenuItemUnavailable { menu_item_id: String },

    /// The table already hosts a different active order.
    #[error("Table {table_id} already has an active order ({order_id})")]
    TableOccupied { table_id: String, order_id: String },

    /// The order already has a settled transaction.
    #[error("Order {order_id} is already paid")]
    AlreadyPaid { order_id: String },

    /// Cash tendered does not cover the order total.
    #[error("Insufficient payment: total {required}, tendered {tendered}")]
    InsufficientPayment { required: Money, tendered: Money },

    /// A line total or order total does not fit in the money type.
    #[error("{what} is too large")]
    AmountOverflow { what: &'static str },

    /// Someone else changed the row between our read and our write.
    #[error("{entity} {id} was modified concurrently")]
    ConcurrentModification { entity: &'static str, id: String },

    /// Validation error (wraps ValidationError).
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),
}

impl CoreError {
    /// Creates a NotFound error for a given entity type and ID.
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Maps the error to its caller-facing category.
    pub fn kind(&self) -> ErrorKind {
        match self {
            CoreError::NotFound { .. } => ErrorKind::NotFound,
            CoreError::Validation(_)
            | CoreError::InsufficientPayment { .. }
            | CoreError::AmountOverflow { .. } => ErrorKind::InvalidArgument,
            CoreError::InvalidTransition { .. }
            | CoreError::EmptyOrder { .. }
            | CoreError::OrderClosed { .. }
            | CoreError::MenuItemUnavailable { .. } => ErrorKind::InvalidState,
            CoreError::TableOccupied { .. }
            | CoreError::AlreadyPaid { .. }
            | CoreError::ConcurrentModification { .. } => ErrorKind::Conflict,
        }
    }
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Used for early validation before any business logic runs.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Value must be positive.
    #[error("{field} must be positive")]
    MustBePositive { field: String },

    /// Value must not be negative.
    #[error("{field} must not be negative")]
    MustNotBeNegative { field: String },

    /// Invalid format (e.g., invalid UUID, invalid decimal).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {allowed:?}")]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
