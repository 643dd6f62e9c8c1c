//! # Menu Commands

use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::MenuItem;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ListMenuArgs {
    /// Hide items switched off in the catalog.
    pub only_available: bool,
}

/// Lists the menu by category and name.
pub async fn list_menu(state: &AppState, args: ListMenuArgs) -> Result<Vec<MenuItem>, ApiError> {
    debug!(only_available = args.only_available, "list_menu command");
    Ok(state.database().menu().list(args.only_available).await?)
}
