//! # Payment Settlement
//!
//! Validates a payment against an order and computes what gets recorded.
//!
//! ## Rules
//! ```text
//! ┌──────────┬──────────────────────────┬──────────────────────────────────┐
//! │ method   │ tendered                 │ recorded                         │
//! ├──────────┼──────────────────────────┼──────────────────────────────────┤
//! │ cash     │ must be ≥ order total    │ amount = total                   │
//! │          │                          │ change = tendered − total        │
//! │ qris     │ any non-negative value   │ amount = total, change = 0       │
//! │ card     │ any non-negative value   │ amount = total, change = 0       │
//! └──────────┴──────────────────────────┴──────────────────────────────────┘
//! ```
//!
//! The amount is a snapshot of the order total at settlement time; the
//! transaction row is never rewritten afterwards.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{Order, OrderStatus, PaymentMethod, Transaction};
use crate::validation::validate_tendered_cents;

/// The money side of a settlement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Settlement {
    pub method: PaymentMethod,
    pub amount: Money,
    pub tendered: Money,
    pub change: Money,
}

/// Checks that `order` can be paid with `method` and `tendered`.
///
/// ## Errors
/// - [`CoreError::AlreadyPaid`] (Conflict) if the order is `paid`
/// - [`CoreError::InvalidTransition`] (InvalidState) if it is `cancelled`
/// - [`CoreError::Validation`] if `tendered` is negative
/// - [`CoreError::InsufficientPayment`] for short cash
pub fn settle(order: &Order, method: PaymentMethod, tendered: Money) -> CoreResult<Settlement> {
    match order.status {
        OrderStatus::Paid => {
            return Err(CoreError::AlreadyPaid {
                order_id: order.id.clone(),
            })
        }
        OrderStatus::Cancelled => {
            return Err(CoreError::InvalidTransition {
                order_id: order.id.clone(),
                from: order.status,
                to: OrderStatus::Paid,
            })
        }
        _ => {}
    }

    validate_tendered_cents(tendered.cents())?;

    let amount = order.total();
    let change = match method {
        PaymentMethod::Cash => {
            if tendered < amount {
                return Err(CoreError::InsufficientPayment {
                    required: amount,
                    tendered,
                });
            }
            (tendered - amount).clamp_zero()
        }
        PaymentMethod::Qris | PaymentMethod::Card => Money::zero(),
    };

    Ok(Settlement {
        method,
        amount,
        tendered,
        change,
    })
}

/// Builds the transaction record for a validated settlement.
pub fn new_transaction(
    transaction_number: String,
    order_id: &str,
    settlement: &Settlement,
    notes: Option<String>,
    business_date: NaiveDate,
    now: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id: Uuid::new_v4().to_string(),
        transaction_number,
        order_id: order_id.to_string(),
        payment_method: settlement.method,
        amount_cents: settlement.amount.cents(),
        tendered_cents: settlement.tendered.cents(),
        change_cents: settlement.change.cents(),
        notes,
        business_date,
        paid_at: now,
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
