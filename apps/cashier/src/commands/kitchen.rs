//! # Kitchen Commands
//!
//! The kitchen screen polls `kitchen_queue` and moves tickets along with
//! `advance_order` (see `order.rs`).

use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::KitchenTicket;

/// Orders sent to the kitchen or being prepared, oldest submission first.
pub async fn kitchen_queue(state: &AppState) -> Result<Vec<KitchenTicket>, ApiError> {
    debug!("kitchen_queue command");
    Ok(state.database().orders().kitchen_queue().await?)
}
