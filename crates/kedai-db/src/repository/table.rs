//! # Table Repository
//!
//! Administration of dining tables and the derived "current order" view.
//!
//! ## Occupancy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  dining_tables.is_available    mirror, re-derived by order lifecycle   │
//! │  orders (status ∈ active set)  source of truth for "current order"     │
//! │                                                                         │
//! │  Every order write that can change a table's active order ends with    │
//! │  sync_availability on each table it touched. Admin changes and         │
//! │  deletions are refused while the table has an active order.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use kedai_core::validation::{
    validate_capacity, validate_table_name, validate_table_number,
};
use kedai_core::{lifecycle, CoreError, DiningTable, Order, TableOverview};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::begin_write;
use crate::repository::order::{active_order_for_table, ORDER_COLUMNS};

const TABLE_COLUMNS: &str = "id, number, name, capacity, is_available, created_at, updated_at";

// =============================================================================
// Connection-level helpers (shared with the order and payment repositories)
// =============================================================================

/// Loads a table or fails with `NotFound`.
pub(crate) async fn fetch_table(conn: &mut SqliteConnection, id: &str) -> DbResult<DiningTable> {
    let sql = format!("SELECT {TABLE_COLUMNS} FROM dining_tables WHERE id = ?1");
    sqlx::query_as::<_, DiningTable>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Table", id))
}

/// Flips the availability mirror.
pub(crate) async fn set_available(
    conn: &mut SqliteConnection,
    id: &str,
    available: bool,
    now: DateTime<Utc>,
) -> DbResult<()> {
    let result = sqlx::query(
        "UPDATE dining_tables SET is_available = ?2, updated_at = ?3 WHERE id = ?1",
    )
    .bind(id)
    .bind(available)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DbError::not_found("Table", id));
    }
    Ok(())
}

/// Re-derives the mirror from the orders table: available exactly when no
/// active order sits on the table.
///
/// Call after the order write, inside the same transaction.
pub(crate) async fn sync_availability(
    conn: &mut SqliteConnection,
    id: &str,
    now: DateTime<Utc>,
) -> DbResult<bool> {
    let available = active_order_for_table(conn, id).await?.is_none();
    set_available(conn, id, available, now).await?;
    Ok(available)
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for dining table operations.
#[derive(Debug, Clone)]
pub struct TableRepository {
    pool: SqlitePool,
}

impl TableRepository {
    /// Creates a new TableRepository.
    pub fn new(pool: SqlitePool) -> Self {
        TableRepository { pool }
    }

    /// Creates an available table.
    ///
    /// A duplicate `number` fails with a unique violation (`Conflict`).
    pub async fn create(&self, number: i64, name: &str, capacity: i64) -> DbResult<DiningTable> {
        validate_table_number(number).map_err(CoreError::from)?;
        validate_capacity(capacity).map_err(CoreError::from)?;
        let name = validate_table_name(name).map_err(CoreError::from)?;

        let now = Utc::now();
        let table = DiningTable {
            id: Uuid::new_v4().to_string(),
            number,
            name,
            capacity,
            is_available: true,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %table.id, number, "Creating table");

        sqlx::query(
            r#"
            INSERT INTO dining_tables
                (id, number, name, capacity, is_available, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
        )
        .bind(&table.id)
        .bind(table.number)
        .bind(&table.name)
        .bind(table.capacity)
        .bind(table.is_available)
        .bind(table.created_at)
        .bind(table.updated_at)
        .execute(&self.pool)
        .await?;

        info!(id = %table.id, number, "Table created");
        Ok(table)
    }

    /// Edits number, name and capacity. Availability is left alone.
    pub async fn update(
        &self,
        id: &str,
        number: i64,
        name: &str,
        capacity: i64,
    ) -> DbResult<DiningTable> {
        validate_table_number(number).map_err(CoreError::from)?;
        validate_capacity(capacity).map_err(CoreError::from)?;
        let name = validate_table_name(name).map_err(CoreError::from)?;

        let mut tx = begin_write(&self.pool).await?;
        let mut table = fetch_table(&mut tx, id).await?;

        table.number = number;
        table.name = name;
        table.capacity = capacity;
        table.updated_at = Utc::now();

        sqlx::query(
            r#"
            UPDATE dining_tables SET number = ?2, name = ?3, capacity = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(&table.id)
        .bind(table.number)
        .bind(&table.name)
        .bind(table.capacity)
        .bind(table.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        info!(id, number, "Table updated");
        Ok(table)
    }

    /// Administrative availability flip (e.g. taking a table out of service).
    ///
    /// Refused with `Conflict` while the table has an active order.
    pub async fn set_availability(&self, id: &str, available: bool) -> DbResult<DiningTable> {
        let mut tx = begin_write(&self.pool).await?;
        let mut table = fetch_table(&mut tx, id).await?;

        let active = active_order_for_table(&mut tx, id).await?;
        if let Err(err) = lifecycle::ensure_table_free(id, active.as_ref()) {
            warn!(id, "Refusing availability change on occupied table");
            return Err(err.into());
        }

        let now = Utc::now();
        set_available(&mut tx, id, available, now).await?;
        tx.commit().await?;

        table.is_available = available;
        table.updated_at = now;
        info!(id, available, "Table availability changed");
        Ok(table)
    }

    /// Deletes a table with its order history.
    ///
    /// Refused with `Conflict` while the table has an active order. Past
    /// orders, their items and transactions go with it (FK cascade).
    pub async fn delete(&self, id: &str) -> DbResult<()> {
        let mut tx = begin_write(&self.pool).await?;
        fetch_table(&mut tx, id).await?;

        let active = active_order_for_table(&mut tx, id).await?;
        if let Err(err) = lifecycle::ensure_table_free(id, active.as_ref()) {
            warn!(id, "Refusing to delete occupied table");
            return Err(err.into());
        }

        sqlx::query("DELETE FROM dining_tables WHERE id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id, "Table deleted");
        Ok(())
    }

    /// Gets a table by ID.
    pub async fn get(&self, id: &str) -> DbResult<DiningTable> {
        let mut conn = self.pool.acquire().await?;
        fetch_table(&mut conn, id).await
    }

    /// Gets a table with its current order.
    pub async fn overview(&self, id: &str) -> DbResult<TableOverview> {
        let mut conn = self.pool.acquire().await?;
        let table = fetch_table(&mut conn, id).await?;
        let current_order = active_order_for_table(&mut conn, id).await?;
        Ok(TableOverview { table, current_order })
    }

    /// Lists every table, by number, with its current order.
    pub async fn list(&self) -> DbResult<Vec<TableOverview>> {
        let mut conn = self.pool.acquire().await?;

        let sql = format!("SELECT {TABLE_COLUMNS} FROM dining_tables ORDER BY number");
        let tables = sqlx::query_as::<_, DiningTable>(&sql)
            .fetch_all(&mut *conn)
            .await?;

        let sql = format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE status IN ('pending', 'sent_to_kitchen', 'preparing', 'ready') \
             ORDER BY created_at DESC"
        );
        let active = sqlx::query_as::<_, Order>(&sql).fetch_all(&mut *conn).await?;

        // Newest first, so the first order seen per table wins.
        let mut current: HashMap<String, Order> = HashMap::new();
        for order in active {
            current.entry(order.table_id.clone()).or_insert(order);
        }

        Ok(tables
            .into_iter()
            .map(|table| {
                let current_order = current.remove(&table.id);
                TableOverview { table, current_order }
            })
            .collect())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kedai_core::ErrorKind;

    async fn db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    #[tokio::test]
    async fn test_create_and_list() {
        let db = db().await;
        db.tables().create(2, "Meja 2", 4).await.unwrap();
        db.tables().create(1, "Meja 1", 2).await.unwrap();

        let tables = db.tables().list().await.unwrap();
        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].table.number, 1);
        assert!(tables[0].table.is_available);
        assert!(tables[0].current_order.is_none());
    }

    #[tokio::test]
    async fn test_duplicate_number_is_conflict() {
        let db = db().await;
        db.tables().create(1, "Meja 1", 2).await.unwrap();
        let err = db.tables().create(1, "Lagi", 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_create_validates_input() {
        let db = db().await;
        let err = db.tables().create(1, "  ", 2).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        let err = db.tables().create(1, "Meja", 0).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[tokio::test]
    async fn test_update_keeps_availability() {
        let db = db().await;
        let table = db.tables().create(1, "Meja 1", 2).await.unwrap();
        db.tables().set_availability(&table.id, false).await.unwrap();

        let updated = db.tables().update(&table.id, 10, "Teras", 6).await.unwrap();
        assert_eq!(updated.number, 10);
        assert_eq!(updated.name, "Teras");
        assert!(!updated.is_available);
    }

    #[tokio::test]
    async fn test_occupied_table_cannot_be_flipped_or_deleted() {
        let db = db().await;
        let table = db.tables().create(1, "Meja 1", 2).await.unwrap();
        db.orders().open_order(&table.id, "kasir", None).await.unwrap();

        let err = db.tables().set_availability(&table.id, true).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);

        let err = db.tables().delete(&table.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert!(db.tables().get(&table.id).await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_cascades_history() {
        let db = db().await;
        let table = db.tables().create(1, "Meja 1", 2).await.unwrap();
        let order = db.orders().open_order(&table.id, "kasir", None).await.unwrap();
        db.orders().cancel(&order.id).await.unwrap();

        db.tables().delete(&table.id).await.unwrap();

        let err = db.orders().get(&order.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
        let err = db.tables().get(&table.id).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
