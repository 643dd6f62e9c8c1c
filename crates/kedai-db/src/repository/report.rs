//! # Report Repository
//!
//! Reads one business day's settled transactions and the lines they paid
//! for; aggregation happens in `kedai_core::report`.

use chrono::NaiveDate;
use kedai_core::report::{summarize, DailyReport, SoldLine};
use kedai_core::Transaction;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::payment::TRANSACTION_COLUMNS;

/// Repository for sales reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: SqlitePool,
}

impl ReportRepository {
    /// Creates a new ReportRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository { pool }
    }

    /// Sales report for transactions whose business date is `date`.
    pub async fn daily(&self, date: NaiveDate) -> DbResult<DailyReport> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions \
             WHERE business_date = ?1 ORDER BY paid_at DESC"
        );
        let transactions = sqlx::query_as::<_, Transaction>(&sql)
            .bind(date)
            .fetch_all(&mut *conn)
            .await?;

        let lines = sqlx::query_as::<_, SoldLine>(
            r#"
            SELECT
                oi.menu_item_id,
                m.name,
                oi.quantity,
                oi.line_total_cents
            FROM transactions t
            JOIN order_items oi ON oi.order_id = t.order_id
            JOIN menu_items m ON m.id = oi.menu_item_id
            WHERE t.business_date = ?1
            "#,
        )
        .bind(date)
        .fetch_all(&mut *conn)
        .await?;

        debug!(
            %date,
            transactions = transactions.len(),
            lines = lines.len(),
            "Building daily report"
        );

        Ok(summarize(date, transactions, &lines))
    }
}
