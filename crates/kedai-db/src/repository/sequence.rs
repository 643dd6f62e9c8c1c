//! # Sequence Service
//!
//! Date-scoped counters behind `ORD-YYYYMMDD-NNNN` and `TXN-YYYYMMDD-NNNN`.
//!
//! ## Concurrency Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  INSERT INTO daily_sequences ... VALUES (scope, date, 1)               │
//! │  ON CONFLICT (scope, business_date)                                    │
//! │      DO UPDATE SET last_value = last_value + 1                         │
//! │  RETURNING last_value                                                  │
//! │                                                                         │
//! │  • one statement: read-increment-write cannot interleave               │
//! │  • runs on the caller's transaction: the increment commits or rolls    │
//! │    back together with the order / transaction row that uses it         │
//! │  • SQLite's single writer lock serializes concurrent callers           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! A rolled-back operation gives its number back, so numbers stay gapless
//! for committed documents.

use chrono::NaiveDate;
use kedai_core::numbering::{format_number, DocumentKind};
use sqlx::SqliteConnection;
use tracing::debug;

use crate::error::DbResult;

/// Draws the next value for `scope` on `date`, starting at 1.
pub async fn next_value(
    conn: &mut SqliteConnection,
    scope: &str,
    date: NaiveDate,
) -> DbResult<i64> {
    let value: i64 = sqlx::query_scalar(
        r#"
        INSERT INTO daily_sequences (scope, business_date, last_value)
        VALUES (?1, ?2, 1)
        ON CONFLICT (scope, business_date)
            DO UPDATE SET last_value = daily_sequences.last_value + 1
        RETURNING last_value
        "#,
    )
    .bind(scope)
    .bind(date)
    .fetch_one(&mut *conn)
    .await?;

    Ok(value)
}

/// Draws and formats the next document number of `kind` for `date`.
pub async fn next_number(
    conn: &mut SqliteConnection,
    kind: DocumentKind,
    date: NaiveDate,
) -> DbResult<String> {
    let value = next_value(conn, kind.scope(), date).await?;
    let number = format_number(kind, date, value);
    debug!(%number, "Drew document number");
    Ok(number)
}
