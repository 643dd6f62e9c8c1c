//! # Settings Repository
//!
//! The key/value configuration store in the `settings` table.
//!
//! | key              | default                  | read by              |
//! |------------------|--------------------------|----------------------|
//! | `tax_rate`       | `0.10`                   | every totals rewrite |
//! | `cafe_name`      | `Kedai Kopi SEHATI`      | receipts             |
//! | `currency`       | `IDR`                    | receipts             |
//! | `receipt_footer` | thank-you line           | receipts             |

use chrono::Utc;
use kedai_core::money::TaxRate;
use kedai_core::validation::validate_tax_rate_bps;
use serde::{Deserialize, Serialize};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use crate::error::{DbError, DbResult};

pub const TAX_RATE: &str = "tax_rate";
pub const CAFE_NAME: &str = "cafe_name";
pub const CURRENCY: &str = "currency";
pub const RECEIPT_FOOTER: &str = "receipt_footer";

/// One row of the settings table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}

/// The store identity printed on receipts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreProfile {
    pub cafe_name: String,
    pub currency: String,
    pub receipt_footer: Option<String>,
    /// Decimal string, e.g. `"0.1"`.
    pub tax_rate: String,
}

/// Reads one setting on an existing connection.
pub(crate) async fn get_value(conn: &mut SqliteConnection, key: &str) -> DbResult<Option<String>> {
    let value: Option<String> = sqlx::query_scalar("SELECT value FROM settings WHERE key = ?1")
        .bind(key)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(value)
}

/// Reads the tax rate on an existing connection (usually the operation's
/// transaction). Absent ⇒ 0.10.
pub(crate) async fn tax_rate(conn: &mut SqliteConnection) -> DbResult<TaxRate> {
    parse_tax_rate(get_value(conn, TAX_RATE).await?)
}

fn parse_tax_rate(raw: Option<String>) -> DbResult<TaxRate> {
    let Some(raw) = raw else {
        return Ok(TaxRate::DEFAULT);
    };

    let invalid = |reason: String| DbError::InvalidSetting {
        key: TAX_RATE.to_string(),
        reason,
    };

    let rate = TaxRate::parse_decimal(&raw).map_err(|e| invalid(e.to_string()))?;
    validate_tax_rate_bps(rate.bps()).map_err(|e| invalid(e.to_string()))?;
    Ok(rate)
}

/// Repository for the settings table.
#[derive(Debug, Clone)]
pub struct SettingsRepository {
    pool: SqlitePool,
}

impl SettingsRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SettingsRepository { pool }
    }

    /// Gets a setting value.
    pub async fn get(&self, key: &str) -> DbResult<Option<String>> {
        let mut conn = self.pool.acquire().await?;
        get_value(&mut conn, key).await
    }

    /// Inserts or replaces a setting.
    ///
    /// `tax_rate` is validated before it is stored, so a bad value can never
    /// reach the totals calculator through this path.
    pub async fn set(&self, key: &str, value: &str) -> DbResult<()> {
        if key == TAX_RATE {
            parse_tax_rate(Some(value.to_string()))?;
        }

        debug!(key, value, "Updating setting");

        sqlx::query(
            r#"
            INSERT INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT (key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(key, "Setting updated");
        Ok(())
    }

    /// Lists every setting, by key.
    pub async fn all(&self) -> DbResult<Vec<Setting>> {
        let settings = sqlx::query_as::<_, Setting>("SELECT key, value FROM settings ORDER BY key")
            .fetch_all(&self.pool)
            .await?;
        Ok(settings)
    }

    /// The configured tax rate (0.10 when unset).
    pub async fn tax_rate(&self) -> DbResult<TaxRate> {
        let mut conn = self.pool.acquire().await?;
        tax_rate(&mut conn).await
    }

    /// Store identity for receipts.
    pub async fn store_profile(&self) -> DbResult<StoreProfile> {
        let mut conn = self.pool.acquire().await?;
        let rate = tax_rate(&mut conn).await?;
        let cafe_name = get_value(&mut conn, CAFE_NAME)
            .await?
            .unwrap_or_else(|| "Kedai".to_string());
        let currency = get_value(&mut conn, CURRENCY)
            .await?
            .unwrap_or_else(|| "IDR".to_string());
        let receipt_footer = get_value(&mut conn, RECEIPT_FOOTER).await?;

        Ok(StoreProfile {
            cafe_name,
            currency,
            receipt_footer,
            tax_rate: rate.to_decimal_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use kedai_core::ErrorKind;

    #[test]
    fn test_parse_tax_rate() {
        assert_eq!(parse_tax_rate(None).unwrap(), TaxRate::DEFAULT);
        assert_eq!(parse_tax_rate(Some("0.11".into())).unwrap().bps(), 1100);
        assert!(parse_tax_rate(Some("abc".into())).is_err());
        assert!(parse_tax_rate(Some("-0.1".into())).is_err());
        assert!(parse_tax_rate(Some("1.5".into())).is_err());
    }

    #[tokio::test]
    async fn test_defaults_and_update() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let settings = db.settings();

        assert_eq!(settings.get(CURRENCY).await.unwrap().as_deref(), Some("IDR"));

        settings.set(TAX_RATE, "0.11").await.unwrap();
        assert_eq!(settings.tax_rate().await.unwrap().bps(), 1100);

        let err = settings.set(TAX_RATE, "eleven").await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert_eq!(settings.tax_rate().await.unwrap().bps(), 1100);

        let profile = settings.store_profile().await.unwrap();
        assert_eq!(profile.cafe_name, "Kedai Kopi SEHATI");
        assert_eq!(profile.tax_rate, "0.11");
    }

    #[tokio::test]
    async fn test_missing_tax_rate_defaults_to_ten_percent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sqlx::query("DELETE FROM settings WHERE key = 'tax_rate'")
            .execute(db.pool())
            .await
            .unwrap();
        assert_eq!(db.settings().tax_rate().await.unwrap().bps(), 1000);
    }
}
