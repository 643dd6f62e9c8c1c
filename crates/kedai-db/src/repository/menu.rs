//! # Menu Repository
//!
//! The catalog lookup the order engine consumes. The engine only reads a
//! menu item's price and availability at add-time; everything after that
//! works from the price captured on the line item.

use chrono::Utc;
use kedai_core::validation::{
    validate_category, validate_menu_name, validate_notes, validate_price_cents,
};
use kedai_core::{CoreError, MenuItem};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

const MENU_COLUMNS: &str =
    "id, category, name, description, price_cents, is_available, created_at, updated_at";

/// Resolves a menu item or fails with `NotFound`.
pub(crate) async fn fetch_menu_item(conn: &mut SqliteConnection, id: &str) -> DbResult<MenuItem> {
    let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items WHERE id = ?1");
    sqlx::query_as::<_, MenuItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Menu item", id))
}

/// Fields for a new catalog entry.
#[derive(Debug, Clone)]
pub struct NewMenuItem<'a> {
    pub category: &'a str,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub price_cents: i64,
    pub is_available: bool,
}

/// Repository for the menu catalog.
#[derive(Debug, Clone)]
pub struct MenuRepository {
    pool: SqlitePool,
}

impl MenuRepository {
    /// Creates a new MenuRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MenuRepository { pool }
    }

    /// Gets a menu item by ID.
    pub async fn get(&self, id: &str) -> DbResult<MenuItem> {
        let mut conn = self.pool.acquire().await?;
        fetch_menu_item(&mut conn, id).await
    }

    /// Inserts a catalog entry.
    pub async fn insert(&self, new: NewMenuItem<'_>) -> DbResult<MenuItem> {
        let category = validate_category(new.category).map_err(CoreError::from)?;
        let name = validate_menu_name(new.name).map_err(CoreError::from)?;
        validate_price_cents(new.price_cents).map_err(CoreError::from)?;
        let description = validate_notes(new.description).map_err(CoreError::from)?;

        let now = Utc::now();
        let item = MenuItem {
            id: Uuid::new_v4().to_string(),
            category,
            name,
            description,
            price_cents: new.price_cents,
            is_available: new.is_available,
            created_at: now,
            updated_at: now,
        };

        debug!(id = %item.id, name = %item.name, "Inserting menu item");

        sqlx::query(
            r#"
            INSERT INTO menu_items (
                id, category, name, description, price_cents, is_available, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&item.id)
        .bind(&item.category)
        .bind(&item.name)
        .bind(&item.description)
        .bind(item.price_cents)
        .bind(item.is_available)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    /// Switches a menu item on or off (sold out).
    pub async fn set_availability(&self, id: &str, available: bool) -> DbResult<MenuItem> {
        let result = sqlx::query(
            "UPDATE menu_items SET is_available = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(available)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Menu item", id));
        }

        info!(id, available, "Menu item availability changed");
        self.get(id).await
    }

    /// Lists the catalog by category and name.
    ///
    /// With `only_available`, sold-out items are left out.
    pub async fn list(&self, only_available: bool) -> DbResult<Vec<MenuItem>> {
        let filter = if only_available { "WHERE is_available = 1" } else { "" };
        let sql = format!("SELECT {MENU_COLUMNS} FROM menu_items {filter} ORDER BY category, name");
        let items = sqlx::query_as::<_, MenuItem>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(items)
    }

    /// Number of catalog entries.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM menu_items")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
