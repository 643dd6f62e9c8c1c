//! # Order Repository
//!
//! Transactional execution of the order lifecycle and line editing.
//!
//! ## Operation Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN IMMEDIATE                                                       │
//! │   ├── load order / table / menu item           (NotFound)              │
//! │   ├── kedai_core guard + in-memory mutation    (InvalidState, ...)     │
//! │   ├── write rows                                                       │
//! │   │     status writes:  ... WHERE id = ? AND status = <previous>       │
//! │   │     0 rows → ConcurrentModification (Conflict)                     │
//! │   ├── recompute totals at the configured tax rate (line edits)         │
//! │   └── re-derive table availability from the    (open / advance /       │
//! │       active orders on each touched table       cancel / move)         │
//! │  COMMIT            ← any `?` before this drops the tx = ROLLBACK       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, FixedOffset, Utc};
use kedai_core::line_items::{self, LineChange};
use kedai_core::numbering::{business_date, DocumentKind};
use kedai_core::validation::{
    validate_id, validate_notes, validate_quantity, validate_staff_id,
};
use kedai_core::{
    lifecycle, CoreError, KitchenTicket, Order, OrderDetail, OrderItem, OrderStatus, TicketLine,
    Totals,
};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use crate::repository::menu::fetch_menu_item;
use crate::repository::sequence::next_number;
use crate::repository::settings;
use crate::repository::table::{fetch_table, sync_availability};

pub(crate) const ORDER_COLUMNS: &str = "id, order_number, table_id, staff_id, status, \
     subtotal_cents, tax_cents, total_cents, notes, business_date, \
     sent_to_kitchen_at, completed_at, created_at, updated_at";

const ITEM_COLUMNS: &str = "id, order_id, menu_item_id, quantity, unit_price_cents, \
     line_total_cents, notes, created_at, updated_at";

// =============================================================================
// Connection-level helpers
// =============================================================================

/// Loads an order or fails with `NotFound`.
pub(crate) async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?1");
    sqlx::query_as::<_, Order>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order", id))
}

/// Loads an order's lines in the order they were first added.
pub(crate) async fn fetch_items(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<Vec<OrderItem>> {
    let sql = format!(
        "SELECT {ITEM_COLUMNS} FROM order_items WHERE order_id = ?1 ORDER BY created_at, id"
    );
    let items = sqlx::query_as::<_, OrderItem>(&sql)
        .bind(order_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(items)
}

/// An order's lines joined with their menu names.
async fn fetch_ticket_lines(
    conn: &mut SqliteConnection,
    order_id: &str,
) -> DbResult<Vec<TicketLine>> {
    let lines = sqlx::query_as::<_, TicketLine>(
        r#"
        SELECT
            oi.id AS item_id,
            oi.order_id,
            oi.menu_item_id,
            m.name,
            oi.quantity,
            oi.notes
        FROM order_items oi
        JOIN menu_items m ON m.id = oi.menu_item_id
        WHERE oi.order_id = ?1
        ORDER BY oi.created_at, oi.id
        "#,
    )
    .bind(order_id)
    .fetch_all(&mut *conn)
    .await?;
    Ok(lines)
}

async fn fetch_item(conn: &mut SqliteConnection, id: &str) -> DbResult<OrderItem> {
    let sql = format!("SELECT {ITEM_COLUMNS} FROM order_items WHERE id = ?1");
    sqlx::query_as::<_, OrderItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Order item", id))
}

/// The table's current order: its latest order in the active set.
pub(crate) async fn active_order_for_table(
    conn: &mut SqliteConnection,
    table_id: &str,
) -> DbResult<Option<Order>> {
    let sql = format!(
        "SELECT {ORDER_COLUMNS} FROM orders \
         WHERE table_id = ?1 AND status IN ('pending', 'sent_to_kitchen', 'preparing', 'ready') \
         ORDER BY created_at DESC LIMIT 1"
    );
    let order = sqlx::query_as::<_, Order>(&sql)
        .bind(table_id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(order)
}

/// Persists a status change as a compare-and-set on `expected`.
pub(crate) async fn write_status(
    conn: &mut SqliteConnection,
    order: &Order,
    expected: OrderStatus,
) -> DbResult<()> {
    let result = sqlx::query(
        r#"
        UPDATE orders SET
            status = ?2,
            sent_to_kitchen_at = ?3,
            completed_at = ?4,
            updated_at = ?5
        WHERE id = ?1 AND status = ?6
        "#,
    )
    .bind(&order.id)
    .bind(order.status)
    .bind(order.sent_to_kitchen_at)
    .bind(order.completed_at)
    .bind(order.updated_at)
    .bind(expected)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::ConcurrentModification {
            entity: "Order",
            id: order.id.clone(),
        }
        .into());
    }
    Ok(())
}

/// Recomputes and stores the order's totals over `items`.
///
/// Guarded on the status the order was loaded with, so a line edit that
/// races a settlement cannot rewrite a paid order's totals.
async fn write_totals(
    conn: &mut SqliteConnection,
    order: &mut Order,
    items: &[OrderItem],
    now: DateTime<Utc>,
) -> DbResult<Totals> {
    let rate = settings::tax_rate(conn).await?;
    let totals = Totals::compute(items, rate)?;
    order.apply_totals(totals);
    order.updated_at = now;

    let result = sqlx::query(
        r#"
        UPDATE orders SET
            subtotal_cents = ?2,
            tax_cents = ?3,
            total_cents = ?4,
            updated_at = ?5
        WHERE id = ?1 AND status = ?6
        "#,
    )
    .bind(&order.id)
    .bind(order.subtotal_cents)
    .bind(order.tax_cents)
    .bind(order.total_cents)
    .bind(order.updated_at)
    .bind(order.status)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(CoreError::ConcurrentModification {
            entity: "Order",
            id: order.id.clone(),
        }
        .into());
    }

    debug!(
        order_id = %order.id,
        subtotal = totals.subtotal.cents(),
        tax = totals.tax.cents(),
        total = totals.total.cents(),
        "Order totals recomputed"
    );
    Ok(totals)
}

/// Re-reads the lines, recomputes totals and returns the aggregate.
async fn refresh_totals(
    conn: &mut SqliteConnection,
    mut order: Order,
    now: DateTime<Utc>,
) -> DbResult<OrderDetail> {
    let items = fetch_items(conn, &order.id).await?;
    write_totals(conn, &mut order, &items, now).await?;
    Ok(OrderDetail { order, items })
}

fn check<T, E>(order_id: &str, op: &'static str, result: Result<T, E>) -> DbResult<T>
where
    E: Into<CoreError>,
{
    result.map_err(|err| {
        let err = err.into();
        warn!(order_id, op, error = %err, "Order operation rejected");
        DbError::Core(err)
    })
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order lifecycle and line item operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
    utc_offset: FixedOffset,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool, utc_offset: FixedOffset) -> Self {
        OrderRepository { pool, utc_offset }
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Gets an order with its line items.
    pub async fn get(&self, order_id: &str) -> DbResult<OrderDetail> {
        let mut conn = self.pool.acquire().await?;
        let order = fetch_order(&mut conn, order_id).await?;
        let items = fetch_items(&mut conn, order_id).await?;
        Ok(OrderDetail { order, items })
    }

    /// The table's current order, if any. Fails with `NotFound` for an
    /// unknown table.
    pub async fn current_for_table(&self, table_id: &str) -> DbResult<Option<Order>> {
        let mut conn = self.pool.acquire().await?;
        fetch_table(&mut conn, table_id).await?;
        active_order_for_table(&mut conn, table_id).await
    }

    /// An order's lines with their menu names, in the order they were added.
    ///
    /// Works for any status, so receipts can name the lines of a paid order.
    pub async fn named_lines(&self, order_id: &str) -> DbResult<Vec<TicketLine>> {
        let mut conn = self.pool.acquire().await?;
        fetch_order(&mut conn, order_id).await?;
        fetch_ticket_lines(&mut conn, order_id).await
    }

    /// Orders the kitchen is working on, oldest submission first.
    pub async fn kitchen_queue(&self) -> DbResult<Vec<KitchenTicket>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE status IN ('sent_to_kitchen', 'preparing') \
             ORDER BY sent_to_kitchen_at, created_at"
        );
        let orders = sqlx::query_as::<_, Order>(&sql).fetch_all(&mut *conn).await?;

        let mut tickets = Vec::with_capacity(orders.len());
        for order in orders {
            let table = fetch_table(&mut conn, &order.table_id).await?;
            let lines = fetch_ticket_lines(&mut conn, &order.id).await?;

            tickets.push(KitchenTicket {
                order,
                table_number: table.number,
                table_name: table.name,
                lines,
            });
        }

        Ok(tickets)
    }

    // -------------------------------------------------------------------------
    // Lifecycle
    // -------------------------------------------------------------------------

    /// Opens a `pending` order on a table with no active order.
    ///
    /// ## Concurrency
    /// Writers queue on the `BEGIN IMMEDIATE` lock, so the second cashier
    /// opening the same table sees the first one's order and gets
    /// `Conflict`. The `idx_orders_one_active_per_table` partial unique
    /// index backs this up. Opens on different tables all succeed.
    pub async fn open_order(
        &self,
        table_id: &str,
        staff_id: &str,
        notes: Option<&str>,
    ) -> DbResult<Order> {
        validate_id("table_id", table_id).map_err(CoreError::from)?;
        let staff_id = validate_staff_id(staff_id).map_err(CoreError::from)?;
        let notes = validate_notes(notes).map_err(CoreError::from)?;

        debug!(table_id, staff_id = %staff_id, "Opening order");

        let mut tx = begin_write(&self.pool).await?;

        fetch_table(&mut tx, table_id).await?;
        let active = active_order_for_table(&mut tx, table_id).await?;
        if let Err(err) = lifecycle::ensure_table_free(table_id, active.as_ref()) {
            warn!(table_id, "Table already has an active order");
            return Err(err.into());
        }

        let now = Utc::now();
        let date = business_date(now, self.utc_offset);
        let order_number = next_number(&mut tx, DocumentKind::Order, date).await?;
        let order = lifecycle::new_order(order_number, table_id, &staff_id, notes, date, now);

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number, table_id, staff_id, status,
                subtotal_cents, tax_cents, total_cents, notes, business_date,
                sent_to_kitchen_at, completed_at, created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14
            )
            "#,
        )
        .bind(&order.id)
        .bind(&order.order_number)
        .bind(&order.table_id)
        .bind(&order.staff_id)
        .bind(order.status)
        .bind(order.subtotal_cents)
        .bind(order.tax_cents)
        .bind(order.total_cents)
        .bind(&order.notes)
        .bind(order.business_date)
        .bind(order.sent_to_kitchen_at)
        .bind(order.completed_at)
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&mut *tx)
        .await?;

        sync_availability(&mut tx, table_id, now).await?;

        tx.commit().await?;

        info!(
            order_id = %order.id,
            order_number = %order.order_number,
            table_id,
            "Order opened"
        );
        Ok(order)
    }

    /// `pending → sent_to_kitchen`. Empty orders are refused.
    pub async fn send_to_kitchen(&self, order_id: &str) -> DbResult<OrderDetail> {
        let mut tx = begin_write(&self.pool).await?;

        let mut order = fetch_order(&mut tx, order_id).await?;
        let items = fetch_items(&mut tx, order_id).await?;

        let now = Utc::now();
        let from = check(
            order_id,
            "send_to_kitchen",
            lifecycle::send_to_kitchen(&mut order, items.len(), now),
        )?;
        write_status(&mut tx, &order, from).await?;

        tx.commit().await?;

        info!(order_id, items = items.len(), "Order sent to kitchen");
        Ok(OrderDetail { order, items })
    }

    /// One kitchen step towards `to` (`preparing`, `ready` or `served`).
    ///
    /// Reaching `served` leaves the active set, so the table is released.
    pub async fn advance(&self, order_id: &str, to: OrderStatus) -> DbResult<Order> {
        let mut tx = begin_write(&self.pool).await?;

        let mut order = fetch_order(&mut tx, order_id).await?;
        let now = Utc::now();
        let from = check(order_id, "advance", lifecycle::advance(&mut order, to, now))?;
        write_status(&mut tx, &order, from).await?;
        sync_availability(&mut tx, &order.table_id, now).await?;

        tx.commit().await?;

        info!(order_id, %from, to = %order.status, "Order advanced");
        Ok(order)
    }

    /// `pending → cancelled`, freeing the table.
    pub async fn cancel(&self, order_id: &str) -> DbResult<Order> {
        let mut tx = begin_write(&self.pool).await?;

        let mut order = fetch_order(&mut tx, order_id).await?;
        let now = Utc::now();
        let from = check(order_id, "cancel", lifecycle::cancel(&mut order, now))?;
        write_status(&mut tx, &order, from).await?;
        sync_availability(&mut tx, &order.table_id, now).await?;

        tx.commit().await?;

        info!(order_id, table_id = %order.table_id, "Order cancelled");
        Ok(order)
    }

    /// Moves a non-terminal order to another table.
    ///
    /// Both tables' availability is re-derived afterwards: the old one is
    /// freed unless another active order sits on it, and the new one is
    /// occupied only if the moved order is still active. Fails with
    /// `Conflict` if the target hosts a different active order.
    pub async fn move_table(&self, order_id: &str, new_table_id: &str) -> DbResult<Order> {
        validate_id("table_id", new_table_id).map_err(CoreError::from)?;

        let mut tx = begin_write(&self.pool).await?;

        let mut order = fetch_order(&mut tx, order_id).await?;
        fetch_table(&mut tx, new_table_id).await?;
        let target_active = active_order_for_table(&mut tx, new_table_id).await?;
        check(
            order_id,
            "move_table",
            lifecycle::ensure_can_move(&order, new_table_id, target_active.as_ref()),
        )?;

        if order.table_id == new_table_id {
            return Ok(order);
        }

        let old_table_id = std::mem::replace(&mut order.table_id, new_table_id.to_string());
        let now = Utc::now();
        order.updated_at = now;

        let result = sqlx::query(
            "UPDATE orders SET table_id = ?2, updated_at = ?3 WHERE id = ?1 AND status = ?4",
        )
        .bind(&order.id)
        .bind(&order.table_id)
        .bind(order.updated_at)
        .bind(order.status)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(CoreError::ConcurrentModification {
                entity: "Order",
                id: order.id.clone(),
            }
            .into());
        }

        sync_availability(&mut tx, &old_table_id, now).await?;
        sync_availability(&mut tx, new_table_id, now).await?;

        tx.commit().await?;

        info!(order_id, from = %old_table_id, to = new_table_id, "Order moved");
        Ok(order)
    }

    // -------------------------------------------------------------------------
    // Line editing
    // -------------------------------------------------------------------------

    /// Adds a menu item, merging into an existing line for the same item.
    pub async fn add_item(
        &self,
        order_id: &str,
        menu_item_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<OrderDetail> {
        validate_quantity(quantity).map_err(CoreError::from)?;
        let notes = validate_notes(notes).map_err(CoreError::from)?;

        debug!(order_id, menu_item_id, quantity, "Adding item");

        let mut tx = begin_write(&self.pool).await?;

        let order = fetch_order(&mut tx, order_id).await?;
        let menu = fetch_menu_item(&mut tx, menu_item_id).await?;
        check(order_id, "add_item", lifecycle::ensure_editable(&order))?;

        let existing = fetch_items(&mut tx, order_id).await?;
        let now = Utc::now();
        let change = check(
            order_id,
            "add_item",
            line_items::add_item(&existing, order_id, &menu, quantity, notes, now),
        )?;

        match &change {
            LineChange::Inserted(item) => {
                sqlx::query(
                    r#"
                    INSERT INTO order_items (
                        id, order_id, menu_item_id, quantity,
                        unit_price_cents, line_total_cents, notes,
                        created_at, updated_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    "#,
                )
                .bind(&item.id)
                .bind(&item.order_id)
                .bind(&item.menu_item_id)
                .bind(item.quantity)
                .bind(item.unit_price_cents)
                .bind(item.line_total_cents)
                .bind(&item.notes)
                .bind(item.created_at)
                .bind(item.updated_at)
                .execute(&mut *tx)
                .await?;
            }
            LineChange::Merged(item) => {
                update_line(&mut tx, item).await?;
            }
        }

        let detail = refresh_totals(&mut tx, order, now).await?;
        tx.commit().await?;

        info!(
            order_id,
            menu_item_id,
            quantity = change.item().quantity,
            merged = matches!(change, LineChange::Merged(_)),
            "Item added"
        );
        Ok(detail)
    }

    /// Sets a line's quantity and notes. The captured unit price is kept.
    pub async fn update_item(
        &self,
        item_id: &str,
        quantity: i64,
        notes: Option<&str>,
    ) -> DbResult<OrderDetail> {
        validate_quantity(quantity).map_err(CoreError::from)?;
        let notes = validate_notes(notes).map_err(CoreError::from)?;

        let mut tx = begin_write(&self.pool).await?;

        let mut item = fetch_item(&mut tx, item_id).await?;
        let order = fetch_order(&mut tx, &item.order_id).await?;
        check(&order.id, "update_item", lifecycle::ensure_editable(&order))?;

        let now = Utc::now();
        check(
            &order.id,
            "update_item",
            line_items::update_item(&mut item, quantity, notes, now),
        )?;
        update_line(&mut tx, &item).await?;

        let detail = refresh_totals(&mut tx, order, now).await?;
        tx.commit().await?;

        info!(item_id, order_id = %item.order_id, quantity, "Item updated");
        Ok(detail)
    }

    /// Removes a line from a non-terminal order.
    pub async fn remove_item(&self, item_id: &str) -> DbResult<OrderDetail> {
        let mut tx = begin_write(&self.pool).await?;

        let item = fetch_item(&mut tx, item_id).await?;
        let order = fetch_order(&mut tx, &item.order_id).await?;
        check(&order.id, "remove_item", lifecycle::ensure_editable(&order))?;

        sqlx::query("DELETE FROM order_items WHERE id = ?1")
            .bind(item_id)
            .execute(&mut *tx)
            .await?;

        let detail = refresh_totals(&mut tx, order, Utc::now()).await?;
        tx.commit().await?;

        info!(item_id, order_id = %item.order_id, "Item removed");
        Ok(detail)
    }
}

async fn update_line(conn: &mut SqliteConnection, item: &OrderItem) -> DbResult<()> {
    sqlx::query(
        r#"
        UPDATE order_items SET
            quantity = ?2,
            line_total_cents = ?3,
            notes = ?4,
            updated_at = ?5
        WHERE id = ?1
        "#,
    )
    .bind(&item.id)
    .bind(item.quantity)
    .bind(item.line_total_cents)
    .bind(&item.notes)
    .bind(item.updated_at)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::menu::NewMenuItem;
    use crate::{Database, DbConfig};
    use kedai_core::ErrorKind;

    struct Fixture {
        db: Database,
        table_id: String,
        kopi_id: String,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let table = db.tables().create(1, "Meja 1", 4).await.unwrap();
        let kopi = db
            .menu()
            .insert(NewMenuItem {
                category: "coffee",
                name: "Es Kopi Susu",
                description: None,
                price_cents: 20_000,
                is_available: true,
            })
            .await
            .unwrap();
        Fixture {
            db,
            table_id: table.id,
            kopi_id: kopi.id,
        }
    }

    #[tokio::test]
    async fn test_open_order_occupies_table() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert!(order.order_number.starts_with("ORD-"));
        assert!(order.order_number.ends_with("-0001"));

        let table = f.db.tables().get(&f.table_id).await.unwrap();
        assert!(!table.is_available);

        let current = f.db.orders().current_for_table(&f.table_id).await.unwrap();
        assert_eq!(current.map(|o| o.id), Some(order.id));
    }

    #[tokio::test]
    async fn test_open_on_unknown_table_is_not_found() {
        let f = fixture().await;
        let err = f.db.orders().open_order("nope", "kasir", None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_add_item_recomputes_totals() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();

        let detail = f.db.orders().add_item(&order.id, &f.kopi_id, 5, None).await.unwrap();
        assert_eq!(detail.items.len(), 1);
        assert_eq!(detail.order.subtotal_cents, 100_000);
        assert_eq!(detail.order.tax_cents, 10_000);
        assert_eq!(detail.order.total_cents, 110_000);

        // Stored totals match what was returned.
        let stored = f.db.orders().get(&order.id).await.unwrap();
        assert_eq!(stored.order.total_cents, 110_000);
    }

    #[tokio::test]
    async fn test_totals_follow_configured_tax_rate() {
        let f = fixture().await;
        f.db.settings().set("tax_rate", "0.11").await.unwrap();
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();

        let detail = f.db.orders().add_item(&order.id, &f.kopi_id, 1, None).await.unwrap();
        assert_eq!(detail.order.tax_cents, 2_200);
        assert_eq!(detail.order.total_cents, 22_200);
    }

    #[tokio::test]
    async fn test_add_unknown_menu_item_is_not_found() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        let err = f.db.orders().add_item(&order.id, "ghost", 1, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err = f.db.orders().add_item("ghost", &f.kopi_id, 1, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_update_and_remove_item() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        let detail = f
            .db
            .orders()
            .add_item(&order.id, &f.kopi_id, 1, Some("less sugar"))
            .await
            .unwrap();
        let item_id = detail.items[0].id.clone();

        let detail = f.db.orders().update_item(&item_id, 3, None).await.unwrap();
        assert_eq!(detail.items[0].quantity, 3);
        assert_eq!(detail.items[0].notes, None);
        assert_eq!(detail.order.subtotal_cents, 60_000);

        let err = f.db.orders().update_item(&item_id, 0, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let detail = f.db.orders().remove_item(&item_id).await.unwrap();
        assert!(detail.items.is_empty());
        assert_eq!(detail.order.total_cents, 0);

        let err = f.db.orders().remove_item(&item_id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_kitchen_flow_and_queue() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        f.db.orders()
            .add_item(&order.id, &f.kopi_id, 2, Some("no ice"))
            .await
            .unwrap();

        let detail = f.db.orders().send_to_kitchen(&order.id).await.unwrap();
        assert_eq!(detail.order.status, OrderStatus::SentToKitchen);

        let queue = f.db.orders().kitchen_queue().await.unwrap();
        assert_eq!(queue.len(), 1);
        assert_eq!(queue[0].table_number, 1);
        assert_eq!(queue[0].lines[0].name, "Es Kopi Susu");
        assert_eq!(queue[0].lines[0].notes.as_deref(), Some("no ice"));

        f.db.orders().advance(&order.id, OrderStatus::Preparing).await.unwrap();
        assert_eq!(f.db.orders().kitchen_queue().await.unwrap().len(), 1);

        let ready = f.db.orders().advance(&order.id, OrderStatus::Ready).await.unwrap();
        assert!(ready.completed_at.is_some());
        assert!(f.db.orders().kitchen_queue().await.unwrap().is_empty());

        let err = f
            .db
            .orders()
            .advance(&order.id, OrderStatus::Preparing)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let served = f.db.orders().advance(&order.id, OrderStatus::Served).await.unwrap();
        assert_eq!(served.status, OrderStatus::Served);
        assert_eq!(served.completed_at, ready.completed_at);
    }

    #[tokio::test]
    async fn test_named_lines_survive_payment() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        let detail = f
            .db
            .orders()
            .add_item(&order.id, &f.kopi_id, 3, Some("less sugar"))
            .await
            .unwrap();
        f.db.payments()
            .pay(&order.id, kedai_core::PaymentMethod::Card, 0, None)
            .await
            .unwrap();

        let lines = f.db.orders().named_lines(&order.id).await.unwrap();
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].item_id, detail.items[0].id);
        assert_eq!(lines[0].name, "Es Kopi Susu");
        assert_eq!(lines[0].quantity, 3);
        assert_eq!(lines[0].notes.as_deref(), Some("less sugar"));

        let err = f.db.orders().named_lines("missing").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_cancel_frees_table_and_locks_order() {
        let f = fixture().await;
        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        f.db.orders().cancel(&order.id).await.unwrap();

        assert!(f.db.tables().get(&f.table_id).await.unwrap().is_available);
        assert!(f
            .db
            .orders()
            .current_for_table(&f.table_id)
            .await
            .unwrap()
            .is_none());

        let err = f.db.orders().add_item(&order.id, &f.kopi_id, 1, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);

        let err = f.db.orders().cancel(&order.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidState);
    }

    #[tokio::test]
    async fn test_move_table() {
        let f = fixture().await;
        let second = f.db.tables().create(2, "Meja 2", 2).await.unwrap();
        let third = f.db.tables().create(3, "Meja 3", 2).await.unwrap();

        let order = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        let moved = f.db.orders().move_table(&order.id, &second.id).await.unwrap();
        assert_eq!(moved.table_id, second.id);
        assert!(f.db.tables().get(&f.table_id).await.unwrap().is_available);
        assert!(!f.db.tables().get(&second.id).await.unwrap().is_available);

        let blocker = f.db.orders().open_order(&third.id, "kasir", None).await.unwrap();
        let err = f.db.orders().move_table(&order.id, &third.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        // The rejected move left both orders where they were.
        let current = f.db.orders().current_for_table(&third.id).await.unwrap();
        assert_eq!(current.map(|o| o.id), Some(blocker.id));
        assert_eq!(f.db.orders().get(&order.id).await.unwrap().order.table_id, second.id);
    }

    #[tokio::test]
    async fn test_moving_served_order_follows_active_orders() {
        let f = fixture().await;
        let second = f.db.tables().create(2, "Meja 2", 2).await.unwrap();
        let third = f.db.tables().create(3, "Meja 3", 2).await.unwrap();

        let served = f.db.orders().open_order(&f.table_id, "kasir", None).await.unwrap();
        f.db.orders().add_item(&served.id, &f.kopi_id, 1, None).await.unwrap();
        f.db.orders().send_to_kitchen(&served.id).await.unwrap();
        for step in [OrderStatus::Preparing, OrderStatus::Ready, OrderStatus::Served] {
            f.db.orders().advance(&served.id, step).await.unwrap();
        }
        assert!(f.db.tables().get(&f.table_id).await.unwrap().is_available);

        // A served order does not occupy the table it moves to.
        f.db.orders().move_table(&served.id, &second.id).await.unwrap();
        assert!(f.db.tables().get(&f.table_id).await.unwrap().is_available);
        assert!(f.db.tables().get(&second.id).await.unwrap().is_available);

        // Nor does moving it away free a table that a newer order holds.
        let newer = f.db.orders().open_order(&second.id, "kasir", None).await.unwrap();
        f.db.orders().move_table(&served.id, &third.id).await.unwrap();
        assert!(!f.db.tables().get(&second.id).await.unwrap().is_available);
        assert!(f.db.tables().get(&third.id).await.unwrap().is_available);
        let current = f.db.orders().current_for_table(&second.id).await.unwrap();
        assert_eq!(current.map(|o| o.id), Some(newer.id));
    }
}
