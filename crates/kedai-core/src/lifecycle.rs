//! # Order Lifecycle
//!
//! The order status state machine and its guards.
//!
//! ## Transition Table
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  from              to                 route                             │
//! │  ───────────────   ────────────────   ───────────────────────────────   │
//! │  pending           sent_to_kitchen    send_to_kitchen (needs ≥1 item)   │
//! │  sent_to_kitchen   preparing          advance (kitchen)                 │
//! │  preparing         ready              advance (stamps completed_at)     │
//! │  ready             served             advance                           │
//! │  pending           cancelled          cancel (frees table)              │
//! │  any non-terminal  paid               settlement only (frees table)     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every function here mutates an in-memory [`Order`] and returns the status
//! it had before, so the persistence layer can write the change as a
//! compare-and-set on that previous status. Nothing is mutated when a guard
//! fails.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::error::{CoreError, CoreResult};
use crate::types::{Order, OrderStatus};

// =============================================================================
// Transition Table
// =============================================================================

/// Every legal `(from, to)` pair.
pub const TRANSITIONS: [(OrderStatus, OrderStatus); 10] = [
    (OrderStatus::Pending, OrderStatus::SentToKitchen),
    (OrderStatus::SentToKitchen, OrderStatus::Preparing),
    (OrderStatus::Preparing, OrderStatus::Ready),
    (OrderStatus::Ready, OrderStatus::Served),
    (OrderStatus::Pending, OrderStatus::Cancelled),
    (OrderStatus::Pending, OrderStatus::Paid),
    (OrderStatus::SentToKitchen, OrderStatus::Paid),
    (OrderStatus::Preparing, OrderStatus::Paid),
    (OrderStatus::Ready, OrderStatus::Paid),
    (OrderStatus::Served, OrderStatus::Paid),
];

/// Steps the kitchen may drive through `advance`.
const KITCHEN_STEPS: [(OrderStatus, OrderStatus); 3] = [
    (OrderStatus::SentToKitchen, OrderStatus::Preparing),
    (OrderStatus::Preparing, OrderStatus::Ready),
    (OrderStatus::Ready, OrderStatus::Served),
];

/// Returns true if `(from, to)` is in the transition table.
pub fn can_transition(from: OrderStatus, to: OrderStatus) -> bool {
    TRANSITIONS.contains(&(from, to))
}

/// The next kitchen step from `status`, if the kitchen owns one.
pub fn next_kitchen_step(status: OrderStatus) -> Option<OrderStatus> {
    KITCHEN_STEPS
        .iter()
        .find(|(from, _)| *from == status)
        .map(|(_, to)| *to)
}

fn transition(order: &mut Order, to: OrderStatus, now: DateTime<Utc>) -> CoreResult<OrderStatus> {
    let from = order.status;
    if !can_transition(from, to) {
        return Err(CoreError::InvalidTransition {
            order_id: order.id.clone(),
            from,
            to,
        });
    }
    order.status = to;
    order.updated_at = now;
    Ok(from)
}

// =============================================================================
// Creation
// =============================================================================

/// Ensures a table has no active order before a new one is opened on it.
///
/// `active` is the table's current order as found by the derived lookup.
pub fn ensure_table_free(table_id: &str, active: Option<&Order>) -> CoreResult<()> {
    match active {
        Some(order) if order.status.is_active() => Err(CoreError::TableOccupied {
            table_id: table_id.to_string(),
            order_id: order.id.clone(),
        }),
        _ => Ok(()),
    }
}

/// Builds a fresh `pending` order with zero totals.
pub fn new_order(
    order_number: String,
    table_id: &str,
    staff_id: &str,
    notes: Option<String>,
    business_date: NaiveDate,
    now: DateTime<Utc>,
) -> Order {
    Order {
        id: Uuid::new_v4().to_string(),
        order_number,
        table_id: table_id.to_string(),
        staff_id: staff_id.to_string(),
        status: OrderStatus::Pending,
        subtotal_cents: 0,
        tax_cents: 0,
        total_cents: 0,
        notes,
        business_date,
        sent_to_kitchen_at: None,
        completed_at: None,
        created_at: now,
        updated_at: now,
    }
}

// =============================================================================
// Kitchen Flow
// =============================================================================

/// `pending → sent_to_kitchen`. Refuses an order without line items.
pub fn send_to_kitchen(
    order: &mut Order,
    item_count: usize,
    now: DateTime<Utc>,
) -> CoreResult<OrderStatus> {
    if order.status == OrderStatus::Pending && item_count == 0 {
        return Err(CoreError::EmptyOrder {
            order_id: order.id.clone(),
        });
    }
    let from = transition(order, OrderStatus::SentToKitchen, now)?;
    order.sent_to_kitchen_at = Some(now);
    Ok(from)
}

/// One kitchen step: `sent_to_kitchen → preparing → ready → served`.
///
/// Reaching `ready` stamps `completed_at`; `served` leaves it alone.
pub fn advance(order: &mut Order, to: OrderStatus, now: DateTime<Utc>) -> CoreResult<OrderStatus> {
    if next_kitchen_step(order.status) != Some(to) {
        return Err(CoreError::InvalidTransition {
            order_id: order.id.clone(),
            from: order.status,
            to,
        });
    }
    let from = transition(order, to, now)?;
    if to == OrderStatus::Ready {
        order.completed_at = Some(now);
    }
    Ok(from)
}

// =============================================================================
// Closing
// =============================================================================

/// `pending → cancelled`. Any other status is refused.
pub fn cancel(order: &mut Order, now: DateTime<Utc>) -> CoreResult<OrderStatus> {
    transition(order, OrderStatus::Cancelled, now)
}

/// `* → paid`. Callers run [`crate::settlement::settle`] first.
pub fn mark_paid(order: &mut Order, now: DateTime<Utc>) -> CoreResult<OrderStatus> {
    if order.status == OrderStatus::Paid {
        return Err(CoreError::AlreadyPaid {
            order_id: order.id.clone(),
        });
    }
    let from = transition(order, OrderStatus::Paid, now)?;
    order.completed_at = Some(now);
    Ok(from)
}

// =============================================================================
// Guards
// =============================================================================

/// Line items may be changed on any non-terminal order, `served` included.
pub fn ensure_editable(order: &Order) -> CoreResult<()> {
    if order.status.is_terminal() {
        return Err(CoreError::OrderClosed {
            order_id: order.id.clone(),
            status: order.status,
        });
    }
    Ok(())
}

/// Checks a table transfer.
///
/// `target_active` is the target table's current order, if any. Moving an
/// order onto the table it already sits on is a no-op and passes.
pub fn ensure_can_move(
    order: &Order,
    target_table_id: &str,
    target_active: Option<&Order>,
) -> CoreResult<()> {
    ensure_editable(order)?;
    match target_active {
        Some(other) if other.id != order.id && other.status.is_active() => {
            Err(CoreError::TableOccupied {
                table_id: target_table_id.to_string(),
                order_id: other.id.clone(),
            })
        }
        _ => Ok(()),
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn order_in(status: OrderStatus) -> Order {
        let now = Utc::now();
        let mut order = new_order(
            "ORD-20260101-0001".to_string(),
            "table-1",
            "kasir",
            None,
            now.date_naive(),
            now,
        );
        order.status = status;
        order
    }

    #[test]
    fn test_new_order_is_pending_with_zero_totals() {
        let order = order_in(OrderStatus::Pending);
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_cents, 0);
        assert!(order.sent_to_kitchen_at.is_none());
    }

    #[test]
    fn test_terminal_states_have_no_exits() {
        for to in OrderStatus::ALL {
            assert!(!can_transition(OrderStatus::Paid, to));
            assert!(!can_transition(OrderStatus::Cancelled, to));
        }
    }

    #[test]
    fn test_send_to_kitchen_requires_items() {
        let mut order = order_in(OrderStatus::Pending);
        let err = send_to_kitchen(&mut order, 0, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
        assert_eq!(order.status, OrderStatus::Pending);

        let from = send_to_kitchen(&mut order, 2, Utc::now()).unwrap();
        assert_eq!(from, OrderStatus::Pending);
        assert_eq!(order.status, OrderStatus::SentToKitchen);
        assert!(order.sent_to_kitchen_at.is_some());
    }

    #[test]
    fn test_send_to_kitchen_twice_is_invalid() {
        let mut order = order_in(OrderStatus::SentToKitchen);
        let err = send_to_kitchen(&mut order, 1, Utc::now()).unwrap_err();
        assert!(matches!(err, CoreError::InvalidTransition { .. }));
    }

    #[test]
    fn test_advance_walks_kitchen_steps() {
        let mut order = order_in(OrderStatus::SentToKitchen);
        advance(&mut order, OrderStatus::Preparing, Utc::now()).unwrap();
        assert!(order.completed_at.is_none());
        advance(&mut order, OrderStatus::Ready, Utc::now()).unwrap();
        assert!(order.completed_at.is_some());
        let stamped = order.completed_at;
        advance(&mut order, OrderStatus::Served, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Served);
        assert_eq!(order.completed_at, stamped);
    }

    #[test]
    fn test_advance_rejects_skips_and_reverses() {
        let mut order = order_in(OrderStatus::SentToKitchen);
        assert!(advance(&mut order, OrderStatus::Ready, Utc::now()).is_err());

        let mut order = order_in(OrderStatus::Ready);
        assert!(advance(&mut order, OrderStatus::Preparing, Utc::now()).is_err());

        let mut order = order_in(OrderStatus::Pending);
        assert!(advance(&mut order, OrderStatus::SentToKitchen, Utc::now()).is_err());

        let mut order = order_in(OrderStatus::Served);
        assert!(advance(&mut order, OrderStatus::Paid, Utc::now()).is_err());
    }

    #[test]
    fn test_cancel_only_from_pending() {
        let mut order = order_in(OrderStatus::Pending);
        assert_eq!(cancel(&mut order, Utc::now()).unwrap(), OrderStatus::Pending);
        assert_eq!(order.status, OrderStatus::Cancelled);

        for status in [
            OrderStatus::SentToKitchen,
            OrderStatus::Preparing,
            OrderStatus::Ready,
            OrderStatus::Served,
            OrderStatus::Paid,
            OrderStatus::Cancelled,
        ] {
            let mut order = order_in(status);
            let err = cancel(&mut order, Utc::now()).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidState, "from {status}");
            assert_eq!(order.status, status);
        }
    }

    #[test]
    fn test_mark_paid() {
        let mut order = order_in(OrderStatus::Served);
        mark_paid(&mut order, Utc::now()).unwrap();
        assert_eq!(order.status, OrderStatus::Paid);
        assert!(order.completed_at.is_some());

        let err = mark_paid(&mut order, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let mut cancelled = order_in(OrderStatus::Cancelled);
        let err = mark_paid(&mut cancelled, Utc::now()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[test]
    fn test_table_guards() {
        let active = order_in(OrderStatus::Preparing);
        let err = ensure_table_free("table-1", Some(&active)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let paid = order_in(OrderStatus::Paid);
        assert!(ensure_table_free("table-1", Some(&paid)).is_ok());
        assert!(ensure_table_free("table-1", None).is_ok());
    }

    #[test]
    fn test_move_guards() {
        let order = order_in(OrderStatus::Served);
        let other = order_in(OrderStatus::Pending);
        assert!(ensure_can_move(&order, "table-2", None).is_ok());
        assert_eq!(
            ensure_can_move(&order, "table-2", Some(&other))
                .unwrap_err()
                .kind(),
            ErrorKind::Conflict
        );
        assert!(ensure_can_move(&order, "table-1", Some(&order)).is_ok());

        let closed = order_in(OrderStatus::Cancelled);
        assert_eq!(
            ensure_can_move(&closed, "table-2", None).unwrap_err().kind(),
            ErrorKind::InvalidState
        );
    }
}
