//! # Payment Repository
//!
//! Settlement: the only route to `paid`.
//!
//! ## Atomic Unit
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                       │
//! │   ├── load order + lines                                   NotFound    │
//! │   ├── settlement::settle (status, tender, change)          guards      │
//! │   ├── draw TXN-YYYYMMDD-NNNN                                           │
//! │   ├── INSERT transactions         UNIQUE(order_id) backstop            │
//! │   ├── UPDATE orders → paid        WHERE status = <previous>            │
//! │   └── re-derive table availability from its active orders              │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two cashiers paying the same order: the second waits for the write lock,
//! then sees `paid` (AlreadyPaid, `Conflict`). The status compare-and-set
//! and the unique index stay as backstops. Payments on different orders
//! queue on the lock and all succeed.

use chrono::{FixedOffset, Utc};
use kedai_core::numbering::{business_date, DocumentKind};
use kedai_core::settlement::{self, Settlement};
use kedai_core::validation::validate_notes;
use kedai_core::{
    lifecycle, CoreError, Money, OrderDetail, PaidOrder, PaymentMethod, Transaction,
};
use sqlx::SqlitePool;
use tracing::{info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use crate::repository::order::{fetch_items, fetch_order, write_status};
use crate::repository::sequence::next_number;
use crate::repository::table::{fetch_table, sync_availability};

pub(crate) const TRANSACTION_COLUMNS: &str = "id, transaction_number, order_id, payment_method, \
     amount_cents, tendered_cents, change_cents, notes, business_date, paid_at";

/// Repository for settlement and transaction records.
#[derive(Debug, Clone)]
pub struct PaymentRepository {
    pool: SqlitePool,
    utc_offset: FixedOffset,
}

impl PaymentRepository {
    /// Creates a new PaymentRepository.
    pub fn new(pool: SqlitePool, utc_offset: FixedOffset) -> Self {
        PaymentRepository { pool, utc_offset }
    }

    /// Settles an order.
    ///
    /// ## Arguments
    /// * `order_id` - The order to close
    /// * `method` - cash, qris or card
    /// * `tendered_cents` - What the customer handed over (≥ 0)
    /// * `notes` - Optional note on the transaction
    ///
    /// ## Errors
    /// * `NotFound` - unknown order
    /// * `InvalidArgument` - negative tender, or cash short of the total
    /// * `InvalidState` - order is cancelled
    /// * `Conflict` - order is already paid (or a concurrent payment won)
    pub async fn pay(
        &self,
        order_id: &str,
        method: PaymentMethod,
        tendered_cents: i64,
        notes: Option<&str>,
    ) -> DbResult<PaidOrder> {
        let notes = validate_notes(notes).map_err(CoreError::from)?;
        let tendered = Money::from_cents(tendered_cents);

        let mut tx = begin_write(&self.pool).await?;

        let mut order = fetch_order(&mut tx, order_id).await?;
        let items = fetch_items(&mut tx, order_id).await?;

        let settled: Settlement = match settlement::settle(&order, method, tendered) {
            Ok(settled) => settled,
            Err(err) => {
                warn!(
                    order_id,
                    %method,
                    tendered = tendered_cents,
                    error = %err,
                    "Payment rejected"
                );
                return Err(err.into());
            }
        };

        let now = Utc::now();
        let from = lifecycle::mark_paid(&mut order, now)?;

        let date = business_date(now, self.utc_offset);
        let number = next_number(&mut tx, DocumentKind::Transaction, date).await?;
        let transaction = settlement::new_transaction(number, order_id, &settled, notes, date, now);

        sqlx::query(
            r#"
            INSERT INTO transactions (
                id, transaction_number, order_id, payment_method,
                amount_cents, tendered_cents, change_cents,
                notes, business_date, paid_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&transaction.id)
        .bind(&transaction.transaction_number)
        .bind(&transaction.order_id)
        .bind(transaction.payment_method)
        .bind(transaction.amount_cents)
        .bind(transaction.tendered_cents)
        .bind(transaction.change_cents)
        .bind(&transaction.notes)
        .bind(transaction.business_date)
        .bind(transaction.paid_at)
        .execute(&mut *tx)
        .await?;

        write_status(&mut tx, &order, from).await?;
        sync_availability(&mut tx, &order.table_id, now).await?;
        let table = fetch_table(&mut tx, &order.table_id).await?;

        tx.commit().await?;

        info!(
            order_id,
            transaction_number = %transaction.transaction_number,
            %method,
            amount = transaction.amount_cents,
            change = transaction.change_cents,
            "Order paid"
        );

        Ok(PaidOrder {
            detail: OrderDetail { order, items },
            transaction,
            table,
        })
    }

    /// The transaction that settled an order, if any.
    pub async fn get_by_order(&self, order_id: &str) -> DbResult<Option<Transaction>> {
        let sql = format!("SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE order_id = ?1");
        let txn = sqlx::query_as::<_, Transaction>(&sql)
            .bind(order_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(txn)
    }

    /// Gets a transaction by its number.
    pub async fn get_by_number(&self, transaction_number: &str) -> DbResult<Transaction> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE transaction_number = ?1"
        );
        sqlx::query_as::<_, Transaction>(&sql)
            .bind(transaction_number)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Transaction", transaction_number))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::menu::NewMenuItem;
    use crate::{Database, DbConfig};
    use kedai_core::{ErrorKind, OrderStatus};

    async fn order_worth_50k() -> (Database, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.settings().set("tax_rate", "0").await.unwrap();
        let table = db.tables().create(1, "Meja 1", 4).await.unwrap();
        let nasi = db
            .menu()
            .insert(NewMenuItem {
                category: "food",
                name: "Nasi Goreng",
                description: None,
                price_cents: 25_000,
                is_available: true,
            })
            .await
            .unwrap();
        let order = db.orders().open_order(&table.id, "kasir", None).await.unwrap();
        let detail = db.orders().add_item(&order.id, &nasi.id, 2, None).await.unwrap();
        assert_eq!(detail.order.total_cents, 50_000);
        (db, table.id, order.id)
    }

    #[tokio::test]
    async fn test_cash_payment_records_change_and_frees_table() {
        let (db, table_id, order_id) = order_worth_50k().await;

        let paid = db
            .payments()
            .pay(&order_id, PaymentMethod::Cash, 60_000, None)
            .await
            .unwrap();
        assert_eq!(paid.transaction.amount_cents, 50_000);
        assert_eq!(paid.transaction.tendered_cents, 60_000);
        assert_eq!(paid.transaction.change_cents, 10_000);
        assert!(paid.transaction.transaction_number.starts_with("TXN-"));
        assert_eq!(paid.detail.order.status, OrderStatus::Paid);
        assert!(paid.table.is_available);

        let stored = db.orders().get(&order_id).await.unwrap();
        assert_eq!(stored.order.status, OrderStatus::Paid);
        assert!(stored.order.completed_at.is_some());
        assert!(db.tables().get(&table_id).await.unwrap().is_available);

        let found = db.payments().get_by_order(&order_id).await.unwrap().unwrap();
        assert_eq!(found.id, paid.transaction.id);
    }

    #[tokio::test]
    async fn test_second_payment_is_conflict() {
        let (db, _, order_id) = order_worth_50k().await;
        db.payments()
            .pay(&order_id, PaymentMethod::Qris, 0, None)
            .await
            .unwrap();
        let err = db
            .payments()
            .pay(&order_id, PaymentMethod::Cash, 100_000, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_short_cash_writes_nothing() {
        let (db, table_id, order_id) = order_worth_50k().await;
        let err = db
            .payments()
            .pay(&order_id, PaymentMethod::Cash, 40_000, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        assert!(db.payments().get_by_order(&order_id).await.unwrap().is_none());
        assert_eq!(
            db.orders().get(&order_id).await.unwrap().order.status,
            OrderStatus::Pending
        );
        assert!(!db.tables().get(&table_id).await.unwrap().is_available);
    }

    #[tokio::test]
    async fn test_card_charges_total_regardless_of_tender() {
        let (db, _, order_id) = order_worth_50k().await;
        let paid = db
            .payments()
            .pay(&order_id, PaymentMethod::Card, 70_000, Some("BCA"))
            .await
            .unwrap();
        assert_eq!(paid.transaction.amount_cents, 50_000);
        assert_eq!(paid.transaction.change_cents, 0);
        assert_eq!(paid.transaction.notes.as_deref(), Some("BCA"));
    }

    #[tokio::test]
    async fn test_cancelled_order_cannot_be_paid() {
        let (db, _, order_id) = order_worth_50k().await;
        db.orders().cancel(&order_id).await.unwrap();
        let err = db
            .payments()
            .pay(&order_id, PaymentMethod::Cash, 50_000, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_paying_served_order_keeps_table_held_by_newer_order() {
        let (db, table_id, first_id) = order_worth_50k().await;
        db.orders().send_to_kitchen(&first_id).await.unwrap();
        for step in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            db.orders().advance(&first_id, step).await.unwrap();
        }
        // Served is outside the active set, so the table is open again.
        assert!(db.tables().get(&table_id).await.unwrap().is_available);

        let second = db.orders().open_order(&table_id, "kasir", None).await.unwrap();
        let paid = db
            .payments()
            .pay(&first_id, PaymentMethod::Qris, 0, None)
            .await
            .unwrap();
        assert!(!paid.table.is_available);

        let overview = db.tables().overview(&table_id).await.unwrap();
        assert!(!overview.table.is_available);
        let current = overview.current_order.unwrap();
        assert_eq!(current.id, second.id);
        assert_eq!(current.status, OrderStatus::Pending);
    }

    #[tokio::test]
    async fn test_unknown_order_is_not_found() {
        let (db, _, _) = order_worth_50k().await;
        let err = db
            .payments()
            .pay("missing", PaymentMethod::Cash, 1, None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
