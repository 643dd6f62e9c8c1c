//! # Config Commands
//!
//! What the screens need to label themselves and format money.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigResponse {
    /// `store_name` from the process config, else the `cafe_name` setting.
    pub store_name: String,
    pub currency: String,
    /// Decimal string, e.g. `"0.1"`.
    pub tax_rate: String,
    pub receipt_footer: Option<String>,
    pub utc_offset_minutes: i32,
}

/// Gets the current configuration.
///
/// ## When Used
/// - Screen startup (store name, currency)
/// - Showing the tax rate next to totals
pub async fn get_config(state: &AppState) -> Result<ConfigResponse, ApiError> {
    debug!("get_config command");
    let profile = state.database().settings().store_profile().await?;

    Ok(ConfigResponse {
        store_name: state
            .config
            .store_name
            .clone()
            .unwrap_or(profile.cafe_name),
        currency: profile.currency,
        tax_rate: profile.tax_rate,
        receipt_footer: profile.receipt_footer,
        utc_offset_minutes: state.config.utc_offset_minutes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::cafe;

    #[tokio::test]
    async fn test_defaults_come_from_settings() {
        let (state, _, _) = cafe().await;
        let config = get_config(&state).await.unwrap();
        assert_eq!(config.store_name, "Kedai Kopi SEHATI");
        assert_eq!(config.currency, "IDR");
        assert_eq!(config.tax_rate, "0");
    }
}
