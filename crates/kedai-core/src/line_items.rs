//! # Order Line Editor Rules
//!
//! Pure rules for adding and editing line items. The persistence layer
//! loads the order's lines, asks these functions what should change, writes
//! the result and then recomputes totals.
//!
//! ## Merge-on-Duplicate
//! ```text
//! add(Es Kopi Susu × 2)   →  [Es Kopi Susu  qty 2  @ 18.000]
//! add(Es Kopi Susu × 3)   →  [Es Kopi Susu  qty 5  @ 18.000]   (one row)
//!                                                ▲
//!                          unit price frozen at the first add,
//!                          never re-read from the menu
//! ```

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{MenuItem, OrderItem};
use crate::validation::validate_quantity;

/// What [`add_item`] decided to do.
#[derive(Debug, Clone, PartialEq)]
pub enum LineChange {
    /// A new row for a menu item not yet on the order.
    Inserted(OrderItem),
    /// The existing row for that menu item, with its quantity increased.
    Merged(OrderItem),
}

impl LineChange {
    pub fn item(&self) -> &OrderItem {
        match self {
            LineChange::Inserted(item) | LineChange::Merged(item) => item,
        }
    }

    pub fn into_item(self) -> OrderItem {
        match self {
            LineChange::Inserted(item) | LineChange::Merged(item) => item,
        }
    }
}

fn line_total(unit_price_cents: i64, quantity: i64) -> CoreResult<Money> {
    Money::from_cents(unit_price_cents)
        .checked_mul_quantity(quantity)
        .ok_or(CoreError::AmountOverflow { what: "Line total" })
}

/// Adds `quantity` of `menu` to an order whose current lines are `existing`.
///
/// ## Rules
/// - `quantity` must be 1..=999, and so must the merged quantity
/// - the menu item must be available
/// - a repeat add merges into the existing row, keeping its captured price;
///   notes are replaced only when new notes are supplied
/// - the line total must fit in [`Money`]
pub fn add_item(
    existing: &[OrderItem],
    order_id: &str,
    menu: &MenuItem,
    quantity: i64,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<LineChange> {
    validate_quantity(quantity)?;

    if !menu.is_available {
        return Err(CoreError::MenuItemUnavailable {
            menu_item_id: menu.id.clone(),
        });
    }

    if let Some(current) = existing.iter().find(|i| i.menu_item_id == menu.id) {
        let merged_quantity = current.quantity + quantity;
        validate_quantity(merged_quantity)?;

        let mut item = current.clone();
        item.quantity = merged_quantity;
        item.line_total_cents = line_total(item.unit_price_cents, merged_quantity)?.cents();
        if notes.is_some() {
            item.notes = notes;
        }
        item.updated_at = now;
        return Ok(LineChange::Merged(item));
    }

    let total = line_total(menu.price_cents, quantity)?;
    Ok(LineChange::Inserted(OrderItem {
        id: Uuid::new_v4().to_string(),
        order_id: order_id.to_string(),
        menu_item_id: menu.id.clone(),
        quantity,
        unit_price_cents: menu.price_cents,
        line_total_cents: total.cents(),
        notes,
        created_at: now,
        updated_at: now,
    }))
}

/// Sets an explicit quantity on a line and replaces its notes.
///
/// The line total is recomputed from the stored unit price.
pub fn update_item(
    item: &mut OrderItem,
    quantity: i64,
    notes: Option<String>,
    now: DateTime<Utc>,
) -> CoreResult<()> {
    validate_quantity(quantity)?;
    let total = line_total(item.unit_price_cents, quantity)?;

    item.quantity = quantity;
    item.line_total_cents = total.cents();
    item.notes = notes;
    item.updated_at = now;
    Ok(())
}
