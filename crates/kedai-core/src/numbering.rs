//! # Document Numbering
//!
//! Formatting for date-scoped sequential numbers.
//!
//! ```text
//! ORD-20261017-0042
//! ─┬─ ───┬──── ──┬─
//!  │     │       └── per-day sequence, zero padded to 4 (grows past 9999)
//!  │     └────────── café-local business date
//!  └──────────────── document kind
//! ```
//!
//! Drawing the next sequence value is the database's job (see
//! `kedai_db::repository::sequence`); this module only knows the format
//! and how to turn "now" into a business date.

use chrono::{DateTime, FixedOffset, NaiveDate, Utc};

/// Kinds of numbered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    Order,
    Transaction,
}

impl DocumentKind {
    /// Printed prefix.
    pub const fn prefix(&self) -> &'static str {
        match self {
            DocumentKind::Order => "ORD",
            DocumentKind::Transaction => "TXN",
        }
    }

    /// Counter scope key in `daily_sequences`.
    pub const fn scope(&self) -> &'static str {
        match self {
            DocumentKind::Order => "order",
            DocumentKind::Transaction => "transaction",
        }
    }
}

/// Formats `PREFIX-YYYYMMDD-NNNN`.
pub fn format_number(kind: DocumentKind, date: NaiveDate, sequence: i64) -> String {
    format!("{}-{}-{:04}", kind.prefix(), date.format("%Y%m%d"), sequence)
}

/// The café-local calendar date for a UTC instant.
pub fn business_date(now: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    now.with_timezone(&offset).date_naive()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_number() {
        let date = NaiveDate::from_ymd_opt(2026, 10, 17).unwrap();
        assert_eq!(format_number(DocumentKind::Order, date, 1), "ORD-20261017-0001");
        assert_eq!(
            format_number(DocumentKind::Transaction, date, 42),
            "TXN-20261017-0042"
        );
        assert_eq!(
            format_number(DocumentKind::Order, date, 12_345),
            "ORD-20261017-12345"
        );
    }

    #[test]
    fn test_business_date_follows_offset() {
        // 18:30 UTC is already the next day in Jakarta (UTC+7).
        let now = Utc.with_ymd_and_hms(2026, 10, 17, 18, 30, 0).unwrap();
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        assert_eq!(
            business_date(now, jakarta),
            NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()
        );

        let utc = FixedOffset::east_opt(0).unwrap();
        assert_eq!(
            business_date(now, utc),
            NaiveDate::from_ymd_opt(2026, 10, 17).unwrap()
        );
    }
}
