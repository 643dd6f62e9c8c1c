//! # Payment Commands
//!
//! Settles an order and returns a printable receipt.
//!
//! ## Receipt Assembly
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  payments().pay()      ──► order, lines, transaction, table (1 txn)    │
//! │  settings().store_profile() ──► cafe name, currency, footer            │
//! │  orders().named_lines() ──► line names (one JOIN on menu_items)        │
//! │                                   │                                     │
//! │                                   ▼                                     │
//! │                            ReceiptResponse                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! The receipt lookups run after the payment committed; if one fails the
//! payment still stands and `get_order` shows it as paid.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::{PaidOrder, PaymentMethod};

#[derive(Debug, Clone, Deserialize)]
pub struct PayArgs {
    pub order_id: String,
    pub method: PaymentMethod,
    /// Amount the customer handed over, in cents. Only cash needs it to
    /// cover the total.
    #[serde(default)]
    pub paid_amount: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptResponse {
    pub store_name: String,
    pub currency: String,
    pub footer: Option<String>,
    pub transaction_number: String,
    pub order_number: String,
    pub table_number: i64,
    pub table_name: String,
    pub items: Vec<ReceiptItem>,
    pub subtotal_cents: i64,
    pub tax_cents: i64,
    pub total_cents: i64,
    pub method: PaymentMethod,
    pub tendered_cents: i64,
    pub change_cents: i64,
    pub paid_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReceiptItem {
    pub name: String,
    pub quantity: i64,
    pub unit_price_cents: i64,
    pub line_total_cents: i64,
    pub notes: Option<String>,
}

pub async fn pay(state: &AppState, args: PayArgs) -> Result<ReceiptResponse, ApiError> {
    debug!(
        order_id = %args.order_id,
        method = %args.method,
        paid_amount = args.paid_amount,
        "pay command"
    );

    let db = state.database();
    let paid = db
        .payments()
        .pay(&args.order_id, args.method, args.paid_amount, args.notes.as_deref())
        .await?;

    let profile = db.settings().store_profile().await?;
    let names: HashMap<String, String> = db
        .orders()
        .named_lines(&args.order_id)
        .await?
        .into_iter()
        .map(|line| (line.item_id, line.name))
        .collect();

    let store_name = state
        .config
        .store_name
        .clone()
        .unwrap_or(profile.cafe_name);

    info!(
        order_id = %args.order_id,
        transaction_number = %paid.transaction.transaction_number,
        "Receipt issued"
    );

    Ok(build_receipt(
        paid,
        store_name,
        profile.currency,
        profile.receipt_footer,
        &names,
    ))
}

/// `names` maps order item ids to menu names.
fn build_receipt(
    paid: PaidOrder,
    store_name: String,
    currency: String,
    footer: Option<String>,
    names: &HashMap<String, String>,
) -> ReceiptResponse {
    let PaidOrder {
        detail,
        transaction,
        table,
    } = paid;

    let items = detail
        .items
        .into_iter()
        .map(|item| ReceiptItem {
            name: names
                .get(&item.id)
                .cloned()
                .unwrap_or_else(|| item.menu_item_id.clone()),
            quantity: item.quantity,
            unit_price_cents: item.unit_price_cents,
            line_total_cents: item.line_total_cents,
            notes: item.notes,
        })
        .collect();

    ReceiptResponse {
        store_name,
        currency,
        footer,
        transaction_number: transaction.transaction_number,
        order_number: detail.order.order_number,
        table_number: table.number,
        table_name: table.name,
        items,
        subtotal_cents: detail.order.subtotal_cents,
        tax_cents: detail.order.tax_cents,
        total_cents: detail.order.total_cents,
        method: transaction.payment_method,
        tendered_cents: transaction.tendered_cents,
        change_cents: transaction.change_cents,
        paid_at: transaction.paid_at,
    }
}
