//! # Order Commands
//!
//! Everything between sitting a guest down and taking payment.
//!
//! ## Flow
//! ```text
//! open_order ──► add_item / update_item / remove_item ──► send_to_kitchen
//!     │                                                        │
//!     └──► cancel_order (pending only)          advance_order ◄┘
//!                                      (preparing → ready → served)
//! ```
//! Each command is one database transaction; a failed command changed
//! nothing.

use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::{Order, OrderDetail, OrderStatus};

#[derive(Debug, Clone, Deserialize)]
pub struct OpenOrderArgs {
    pub table_id: String,
    pub staff_id: String,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OrderIdArgs {
    pub order_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddItemArgs {
    pub order_id: String,
    pub menu_item_id: String,
    pub quantity: i64,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpdateItemArgs {
    pub item_id: String,
    pub quantity: i64,
    /// Replaces the line's notes; omit to clear them.
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ItemIdArgs {
    pub item_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AdvanceOrderArgs {
    pub order_id: String,
    pub status: OrderStatus,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MoveTableArgs {
    pub order_id: String,
    pub table_id: String,
}

/// Opens a `pending` order on a table without an active order.
pub async fn open_order(state: &AppState, args: OpenOrderArgs) -> Result<Order, ApiError> {
    debug!(table_id = %args.table_id, staff_id = %args.staff_id, "open_order command");
    Ok(state
        .database()
        .orders()
        .open_order(&args.table_id, &args.staff_id, args.notes.as_deref())
        .await?)
}

pub async fn get_order(state: &AppState, args: OrderIdArgs) -> Result<OrderDetail, ApiError> {
    debug!(order_id = %args.order_id, "get_order command");
    Ok(state.database().orders().get(&args.order_id).await?)
}

/// Adds a menu item; a second add of the same item grows the existing line.
pub async fn add_item(state: &AppState, args: AddItemArgs) -> Result<OrderDetail, ApiError> {
    debug!(
        order_id = %args.order_id,
        menu_item_id = %args.menu_item_id,
        quantity = args.quantity,
        "add_item command"
    );
    Ok(state
        .database()
        .orders()
        .add_item(
            &args.order_id,
            &args.menu_item_id,
            args.quantity,
            args.notes.as_deref(),
        )
        .await?)
}

pub async fn update_item(state: &AppState, args: UpdateItemArgs) -> Result<OrderDetail, ApiError> {
    debug!(item_id = %args.item_id, quantity = args.quantity, "update_item command");
    Ok(state
        .database()
        .orders()
        .update_item(&args.item_id, args.quantity, args.notes.as_deref())
        .await?)
}

pub async fn remove_item(state: &AppState, args: ItemIdArgs) -> Result<OrderDetail, ApiError> {
    debug!(item_id = %args.item_id, "remove_item command");
    Ok(state.database().orders().remove_item(&args.item_id).await?)
}

pub async fn send_to_kitchen(state: &AppState, args: OrderIdArgs) -> Result<OrderDetail, ApiError> {
    debug!(order_id = %args.order_id, "send_to_kitchen command");
    Ok(state.database().orders().send_to_kitchen(&args.order_id).await?)
}

/// Kitchen progress: `preparing`, `ready`, `served`, one step at a time.
pub async fn advance_order(state: &AppState, args: AdvanceOrderArgs) -> Result<Order, ApiError> {
    debug!(order_id = %args.order_id, to = %args.status, "advance_order command");
    Ok(state
        .database()
        .orders()
        .advance(&args.order_id, args.status)
        .await?)
}

pub async fn cancel_order(state: &AppState, args: OrderIdArgs) -> Result<Order, ApiError> {
    debug!(order_id = %args.order_id, "cancel_order command");
    Ok(state.database().orders().cancel(&args.order_id).await?)
}

pub async fn move_table(state: &AppState, args: MoveTableArgs) -> Result<Order, ApiError> {
    debug!(order_id = %args.order_id, table_id = %args.table_id, "move_table command");
    Ok(state
        .database()
        .orders()
        .move_table(&args.order_id, &args.table_id)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::cafe;
    use crate::error::ErrorCode;

    async fn opened(state: &AppState, table_id: &str) -> Order {
        open_order(
            state,
            OpenOrderArgs {
                table_id: table_id.to_string(),
                staff_id: "kasir".into(),
                notes: None,
            },
        )
        .await
        .unwrap()
    }

    #[tokio::test]
    async fn test_edit_lines() {
        let (state, table_id, kopi_id) = cafe().await;
        let order = opened(&state, &table_id).await;

        let detail = add_item(
            &state,
            AddItemArgs {
                order_id: order.id.clone(),
                menu_item_id: kopi_id.clone(),
                quantity: 1,
                notes: Some("less sugar".into()),
            },
        )
        .await
        .unwrap();
        let item_id = detail.items[0].id.clone();

        let detail = update_item(
            &state,
            UpdateItemArgs {
                item_id: item_id.clone(),
                quantity: 3,
                notes: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(detail.items[0].quantity, 3);
        assert_eq!(detail.items[0].notes, None);
        assert_eq!(detail.order.total_cents, 75_000);

        let err = update_item(
            &state,
            UpdateItemArgs {
                item_id: item_id.clone(),
                quantity: 0,
                notes: None,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidArgument);

        let detail = remove_item(&state, ItemIdArgs { item_id }).await.unwrap();
        assert!(detail.items.is_empty());
        assert_eq!(detail.order.total_cents, 0);
    }

    #[tokio::test]
    async fn test_kitchen_steps_cannot_be_skipped() {
        let (state, table_id, kopi_id) = cafe().await;
        let order = opened(&state, &table_id).await;

        let err = send_to_kitchen(&state, OrderIdArgs { order_id: order.id.clone() })
            .await
            .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        add_item(
            &state,
            AddItemArgs {
                order_id: order.id.clone(),
                menu_item_id: kopi_id,
                quantity: 1,
                notes: None,
            },
        )
        .await
        .unwrap();
        send_to_kitchen(&state, OrderIdArgs { order_id: order.id.clone() })
            .await
            .unwrap();

        let err = advance_order(
            &state,
            AdvanceOrderArgs {
                order_id: order.id.clone(),
                status: OrderStatus::Ready,
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidState);

        let order = advance_order(
            &state,
            AdvanceOrderArgs {
                order_id: order.id.clone(),
                status: OrderStatus::Preparing,
            },
        )
        .await
        .unwrap();
        assert_eq!(order.status, OrderStatus::Preparing);
    }

    #[tokio::test]
    async fn test_move_and_cancel() {
        let (state, table_id, _) = cafe().await;
        let other = state.database().tables().create(2, "Meja 2", 2).await.unwrap();
        let order = opened(&state, &table_id).await;

        let moved = move_table(
            &state,
            MoveTableArgs {
                order_id: order.id.clone(),
                table_id: other.id.clone(),
            },
        )
        .await
        .unwrap();
        assert_eq!(moved.table_id, other.id);
        assert!(state.database().tables().get(&table_id).await.unwrap().is_available);

        let cancelled = cancel_order(&state, OrderIdArgs { order_id: order.id }).await.unwrap();
        assert_eq!(cancelled.status, OrderStatus::Cancelled);
        assert!(state.database().tables().get(&other.id).await.unwrap().is_available);
    }
}
