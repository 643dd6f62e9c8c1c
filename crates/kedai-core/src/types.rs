//! # Domain Types
//!
//! Core domain types used throughout Kedai POS.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  DiningTable    │   │      Order      │   │   Transaction   │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │◄──│  table_id       │◄──│  order_id (1:1) │       │
//! │  │  number (uniq)  │   │  order_number   │   │  txn_number     │       │
//! │  │  is_available   │   │  status         │   │  method         │       │
//! │  └─────────────────┘   │  subtotal/tax/  │   │  amount/change  │       │
//! │                        │  total (derived)│   └─────────────────┘       │
//! │  ┌─────────────────┐   └────────▲────────┘                             │
//! │  │    MenuItem     │            │ owns                                 │
//! │  │  ─────────────  │   ┌────────┴────────┐                             │
//! │  │  price_cents    │──►│    OrderItem    │  unit price frozen at add   │
//! │  │  is_available   │   │  quantity ≥ 1   │  one row per menu item      │
//! │  └─────────────────┘   └─────────────────┘                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Every entity has:
//! - `id`: UUID v4 - immutable, used for database relations
//! - Business ID: (table number, order number, transaction number) - human-readable

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::ValidationError;
use crate::money::Money;
use crate::totals::Totals;

// =============================================================================
// Order Status
// =============================================================================

/// The status of an order.
///
/// ```text
/// pending ──► sent_to_kitchen ──► preparing ──► ready ──► served
///    │               │                │           │          │
///    ▼               └────────────────┴─────┬─────┴──────────┘
/// cancelled                                 ▼
///                                          paid
/// ```
/// `paid` is also reachable straight from `pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Order is open at the table, items being added.
    Pending,
    /// Ticket handed to the kitchen.
    SentToKitchen,
    /// Kitchen is working on it.
    Preparing,
    /// Food is ready for pickup.
    Ready,
    /// Delivered to the table, awaiting payment.
    Served,
    /// Settled. Terminal.
    Paid,
    /// Abandoned before the kitchen saw it. Terminal.
    Cancelled,
}

impl OrderStatus {
    /// Statuses in which an order occupies its table.
    pub const ACTIVE: [OrderStatus; 4] = [
        OrderStatus::Pending,
        OrderStatus::SentToKitchen,
        OrderStatus::Preparing,
        OrderStatus::Ready,
    ];

    /// Every status, in lifecycle order.
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::SentToKitchen,
        OrderStatus::Preparing,
        OrderStatus::Ready,
        OrderStatus::Served,
        OrderStatus::Paid,
        OrderStatus::Cancelled,
    ];

    /// Database / wire representation.
    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::SentToKitchen => "sent_to_kitchen",
            OrderStatus::Preparing => "preparing",
            OrderStatus::Ready => "ready",
            OrderStatus::Served => "served",
            OrderStatus::Paid => "paid",
            OrderStatus::Cancelled => "cancelled",
        }
    }

    /// True for {pending, sent_to_kitchen, preparing, ready}.
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }

    /// True for `paid` and `cancelled`.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, OrderStatus::Paid | OrderStatus::Cancelled)
    }
}

impl Default for OrderStatus {
    fn default() -> Self {
        OrderStatus::Pending
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Payment Method
// =============================================================================

#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    /// Physical cash; the only method with change.
    Cash,
    /// QRIS scan-to-pay.
    Qris,
    /// Card on an external terminal.
    Card,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] =
        [PaymentMethod::Cash, PaymentMethod::Qris, PaymentMethod::Card];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Cash => "cash",
            PaymentMethod::Qris => "qris",
            PaymentMethod::Card => "card",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMethod::ALL
            .into_iter()
            .find(|method| method.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "payment_method".to_string(),
                allowed: PaymentMethod::ALL
                    .iter()
                    .map(|m| m.as_str().to_string())
                    .collect(),
            })
    }
}

// =============================================================================
// Dining Table
// =============================================================================

/// A physical seating unit.
///
/// `is_available` mirrors occupancy and is flipped only by order lifecycle
/// transitions while an order is active. The authoritative "current order"
/// is always derived by querying active orders, never stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct DiningTable {
    pub id: String,
    /// Display number, unique across the café.
    pub number: i64,
    pub name: String,
    pub capacity: i64,
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Menu Item
// =============================================================================

/// A catalog entry as seen by the order engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct MenuItem {
    pub id: String,
    pub category: String,
    pub name: String,
    pub description: Option<String>,
    /// Current price in minor units. Only read at add-time.
    pub price_cents: i64,
    pub is_available: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl MenuItem {
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_cents(self.price_cents)
    }
}

// =============================================================================
// Order
// =============================================================================

/// One customer visit at a table.
///
/// `subtotal_cents`, `tax_cents` and `total_cents` are derived values,
/// rewritten by the totals calculator after every line item mutation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// `ORD-YYYYMMDD-NNNN`
    pub order_number: String,
    pub table_id: String,
    /// Staff member who opened the order.
    pub staff_id: String,
    pub status: OrderStatus,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub notes: Option<String>,
    /// Café-local date the order number was drawn for.
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    #[ts(as = "Option<String>")]
    pub sent_to_kitchen_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub completed_at: Option<DateTime<Utc>>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// Returns the stored totals as a [`Totals`] value.
    pub fn totals(&self) -> Totals {
        Totals {
            subtotal: Money::from_cents(self.subtotal_cents),
            tax: Money::from_cents(self.tax_cents),
            total: Money::from_cents(self.total_cents),
        }
    }

    /// Overwrites the derived money columns.
    pub fn apply_totals(&mut self, totals: Totals) {
        self.subtotal_cents = totals.subtotal.cents();
        self.tax_cents = totals.tax.cents();
        self.total_cents = totals.total.cents();
    }

    #[inline]
    pub fn total(&self) -> Money {
        Money::from_cents(self.total_cents)
    }
}

// =============================================================================
// Order Item
// =============================================================================

/// A line within an order.
///
/// Uses the snapshot pattern: `unit_price_cents` is frozen when the menu
/// item is first added and never re-read from the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct OrderItem {
    pub id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    /// quantity × unit price
    pub line_total_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl OrderItem {
    #[inline]
    pub fn unit_price(&self) -> Money {
        Money::from_cents(self.unit_price_cents)
    }

    #[inline]
    pub fn line_total(&self) -> Money {
        Money::from_cents(self.line_total_cents)
    }
}

// =============================================================================
// Transaction
// =============================================================================

/// The payment record closing an order. Written once, never updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Transaction {
    pub id: String,
    /// `TXN-YYYYMMDD-NNNN`
    pub transaction_number: String,
    pub order_id: String,
    pub payment_method: PaymentMethod,
    /// Order total at settlement time.
    pub amount_cents: i64,
    /// What the customer handed over.
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub business_date: NaiveDate,
    #[ts(as = "String")]
    pub paid_at: DateTime<Utc>,
}

impl Transaction {
    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_cents(self.amount_cents)
    }
}

// =============================================================================
// Aggregates
// =============================================================================

/// An order together with its line items.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderDetail {
    pub order: Order,
    pub items: Vec<OrderItem>,
}

impl OrderDetail {
    /// Finds the line for a menu item, if present.
    pub fn item_for(&self, menu_item_id: &str) -> Option<&OrderItem> {
        self.items.iter().find(|i| i.menu_item_id == menu_item_id)
    }
}

/// A table with its derived current (latest active) order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TableOverview {
    pub table: DiningTable,
    pub current_order: Option<Order>,
}

/// A line on a kitchen ticket, with the menu name resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct TicketLine {
    pub item_id: String,
    pub order_id: String,
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub notes: Option<String>,
}

/// An order on the kitchen board.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct KitchenTicket {
    pub order: Order,
    pub table_number: i64,
    pub table_name: String,
    pub lines: Vec<TicketLine>,
}

/// Result of a successful settlement.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PaidOrder {
    pub detail: OrderDetail,
    pub transaction: Transaction,
    pub table: DiningTable,
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in OrderStatus::ALL {
            assert_eq!(status.as_str().parse::<OrderStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_is_rejected() {
        let err = "on_hold".parse::<OrderStatus>().unwrap_err();
        assert!(matches!(err, ValidationError::NotAllowed { .. }));
    }

    #[test]
    fn test_active_and_terminal_sets() {
        assert!(OrderStatus::Pending.is_active());
        assert!(OrderStatus::Ready.is_active());
        assert!(!OrderStatus::Served.is_active());
        assert!(!OrderStatus::Served.is_terminal());
        assert!(OrderStatus::Paid.is_terminal());
        assert!(OrderStatus::Cancelled.is_terminal());
        assert!(!OrderStatus::Paid.is_active());
    }

    #[test]
    fn test_status_serializes_snake_case() {
        let json = serde_json::to_string(&OrderStatus::SentToKitchen).unwrap();
        assert_eq!(json, "\"sent_to_kitchen\"");
    }

    #[test]
    fn test_payment_method_parse() {
        assert_eq!("qris".parse::<PaymentMethod>().unwrap(), PaymentMethod::Qris);
        assert!("voucher".parse::<PaymentMethod>().is_err());
    }
}
