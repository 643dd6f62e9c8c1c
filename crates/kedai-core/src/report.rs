//! # Daily Sales Report
//!
//! Aggregates one business day's settled transactions.
//!
//! The database supplies the raw rows (transactions for the date, and the
//! line items of the orders they settled); everything else is computed
//! here.

use std::collections::HashMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::types::{PaymentMethod, Transaction};
use crate::POPULAR_ITEMS_LIMIT;

/// One sold line as read for reporting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SoldLine {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub line_total_cents: i64,
}

/// A menu item's performance for the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct PopularItem {
    pub menu_item_id: String,
    pub name: String,
    pub quantity: i64,
    pub revenue_cents: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DailyReport {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub total_sales_cents: i64,
    pub total_orders: i64,
    pub cash_sales_cents: i64,
    pub qris_sales_cents: i64,
    pub card_sales_cents: i64,
    /// Integer division of total sales by order count; 0 on an empty day.
    pub average_order_cents: i64,
    pub popular_items: Vec<PopularItem>,
    /// Newest first.
    pub transactions: Vec<Transaction>,
}

/// Builds the report for `date`.
///
/// `transactions` may arrive in any order; they are sorted newest first.
/// Popular items are ranked by quantity, ties broken by name.
pub fn summarize(
    date: NaiveDate,
    mut transactions: Vec<Transaction>,
    lines: &[SoldLine],
) -> DailyReport {
    let mut by_method: HashMap<PaymentMethod, i64> = HashMap::new();
    let mut total_sales_cents = 0;
    for txn in &transactions {
        total_sales_cents += txn.amount_cents;
        *by_method.entry(txn.payment_method).or_default() += txn.amount_cents;
    }

    let total_orders = transactions.len() as i64;
    let average_order_cents = if total_orders == 0 {
        0
    } else {
        total_sales_cents / total_orders
    };

    let mut popular: HashMap<&str, PopularItem> = HashMap::new();
    for line in lines {
        let entry = popular
            .entry(line.menu_item_id.as_str())
            .or_insert_with(|| PopularItem {
                menu_item_id: line.menu_item_id.clone(),
                name: line.name.clone(),
                quantity: 0,
                revenue_cents: 0,
            });
        entry.quantity += line.quantity;
        entry.revenue_cents += line.line_total_cents;
    }
    let mut popular_items: Vec<PopularItem> = popular.into_values().collect();
    popular_items.sort_by(|a, b| {
        b.quantity
            .cmp(&a.quantity)
            .then_with(|| a.name.cmp(&b.name))
            .then_with(|| a.menu_item_id.cmp(&b.menu_item_id))
    });
    popular_items.truncate(POPULAR_ITEMS_LIMIT);

    transactions.sort_by(|a, b| {
        b.paid_at
            .cmp(&a.paid_at)
            .then_with(|| b.transaction_number.cmp(&a.transaction_number))
    });

    let method_total = |m: PaymentMethod| by_method.get(&m).copied().unwrap_or(0);

    DailyReport {
        date,
        total_sales_cents,
        total_orders,
        cash_sales_cents: method_total(PaymentMethod::Cash),
        qris_sales_cents: method_total(PaymentMethod::Qris),
        card_sales_cents: method_total(PaymentMethod::Card),
        average_order_cents,
        popular_items,
        transactions,
    }
}
