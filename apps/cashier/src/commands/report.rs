//! # Report Commands

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use tracing::debug;

use crate::error::ApiError;
use crate::state::AppState;
use kedai_core::numbering::business_date;
use kedai_core::report::DailyReport;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DailyReportArgs {
    /// `YYYY-MM-DD`; defaults to today's business date.
    pub date: Option<NaiveDate>,
}

/// Sales summary for one business day.
pub async fn daily_report(
    state: &AppState,
    args: DailyReportArgs,
) -> Result<DailyReport, ApiError> {
    let db = state.database();
    let date = args
        .date
        .unwrap_or_else(|| business_date(Utc::now(), db.utc_offset()));
    debug!(%date, "daily_report command");
    Ok(db.reports().daily(date).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::cafe;
    use kedai_core::PaymentMethod;

    #[tokio::test]
    async fn test_today_includes_fresh_payment() {
        let (state, table_id, kopi_id) = cafe().await;
        let db = state.database();
        let order = db.orders().open_order(&table_id, "kasir", None).await.unwrap();
        db.orders().add_item(&order.id, &kopi_id, 3, None).await.unwrap();
        db.payments()
            .pay(&order.id, PaymentMethod::Qris, 0, None)
            .await
            .unwrap();

        let report = daily_report(&state, DailyReportArgs::default()).await.unwrap();
        assert_eq!(report.total_orders, 1);
        assert_eq!(report.total_sales_cents, 75_000);
        assert_eq!(report.qris_sales_cents, 75_000);
        assert_eq!(report.popular_items[0].name, "Kopi Tubruk");
        assert_eq!(report.popular_items[0].quantity, 3);

        let empty = daily_report(
            &state,
            DailyReportArgs {
                date: NaiveDate::from_ymd_opt(2001, 1, 1),
            },
        )
        .await
        .unwrap();
        assert_eq!(empty.total_orders, 0);
    }
}
