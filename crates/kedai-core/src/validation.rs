//! # Validation Module
//!
//! Input validation utilities for Kedai POS.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Cashier command (JSON)                                       │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── Unknown payment methods / statuses rejected                       │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: THIS MODULE                                                  │
//! │  ├── Quantities, tendered amounts, names, notes                        │
//! │  └── Runs before any read or write                                     │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── CHECK constraints (quantity ≥ 1, amounts ≥ 0)                     │
//! │  ├── UNIQUE constraints (one active order per table, one txn/order)    │
//! │  └── Foreign key constraints                                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kedai_core::validation::{validate_quantity, validate_notes};
//!
//! validate_quantity(2).unwrap();
//! assert_eq!(validate_notes(Some("  less sugar ")).unwrap().as_deref(), Some("less sugar"));
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest note accepted on an order or line item.
pub const MAX_NOTES_LEN: usize = 255;

/// Largest table a café realistically seats.
pub const MAX_TABLE_CAPACITY: i64 = 50;

/// Highest menu price in minor units (one billion in major units).
pub const MAX_PRICE_CENTS: i64 = 100_000_000_000;

// =============================================================================
// String Validators
// =============================================================================

fn validate_label(field: &str, value: &str, max: usize) -> ValidationResult<String> {
    let value = value.trim();

    if value.is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }

    if value.chars().count() > max {
        return Err(ValidationError::TooLong {
            field: field.to_string(),
            max,
        });
    }

    Ok(value.to_string())
}

/// Validates a table display name (`"Meja 1"`). Returns it trimmed.
pub fn validate_table_name(name: &str) -> ValidationResult<String> {
    validate_label("name", name, 50)
}

/// Validates a menu item name. Returns it trimmed.
pub fn validate_menu_name(name: &str) -> ValidationResult<String> {
    validate_label("name", name, 100)
}

/// Validates a menu category (`"coffee"`, `"food"`). Returns it trimmed.
pub fn validate_category(category: &str) -> ValidationResult<String> {
    validate_label("category", category, 50)
}

/// Validates the identifier of the staff member opening an order.
pub fn validate_staff_id(staff_id: &str) -> ValidationResult<String> {
    validate_label("staff_id", staff_id, 64)
}

/// Validates an entity identifier passed in from outside.
///
/// Unknown identifiers are reported as not found by the lookup itself,
/// so this only rejects blanks.
pub fn validate_id(field: &str, id: &str) -> ValidationResult<()> {
    if id.trim().is_empty() {
        return Err(ValidationError::Required {
            field: field.to_string(),
        });
    }
    Ok(())
}

/// Normalizes free-text notes.
///
/// Blank notes collapse to `None`. Anything longer than [`MAX_NOTES_LEN`]
/// characters is rejected.
pub fn validate_notes(notes: Option<&str>) -> ValidationResult<Option<String>> {
    let Some(notes) = notes.map(str::trim) else {
        return Ok(None);
    };

    if notes.is_empty() {
        return Ok(None);
    }

    if notes.chars().count() > MAX_NOTES_LEN {
        return Err(ValidationError::TooLong {
            field: "notes".to_string(),
            max: MAX_NOTES_LEN,
        });
    }

    Ok(Some(notes.to_string()))
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## User Workflow
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │  Order screen: tap "Es Kopi Susu" × 2                                   │
/// │       │                                                                 │
/// │       ▼                                                                 │
/// │  validate_quantity(2) ← THIS FUNCTION                                   │
/// │       │                                                                 │
/// │       ├── qty <= 0?  → Error: "quantity must be positive"               │
/// │       ├── qty > 999? → Error: "quantity must be between 1 and 999"      │
/// │       └── OK → add_item                                                 │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a menu price in minor units. Zero is allowed.
///
/// Capped at [`MAX_PRICE_CENTS`] so a full line of 999 still fits in `i64`.
pub fn validate_price_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "price".to_string(),
        });
    }

    if cents > MAX_PRICE_CENTS {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE_CENTS,
        });
    }

    Ok(())
}

/// Validates the amount a customer hands over.
///
/// Zero is accepted here: for non-cash methods the tendered amount is
/// informational only.
pub fn validate_tendered_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::MustNotBeNegative {
            field: "paid_amount".to_string(),
        });
    }

    Ok(())
}

/// Validates a table display number (must be ≥ 1).
pub fn validate_table_number(number: i64) -> ValidationResult<()> {
    if number < 1 {
        return Err(ValidationError::MustBePositive {
            field: "number".to_string(),
        });
    }

    Ok(())
}

/// Validates seating capacity.
pub fn validate_capacity(capacity: i64) -> ValidationResult<()> {
    if !(1..=MAX_TABLE_CAPACITY).contains(&capacity) {
        return Err(ValidationError::OutOfRange {
            field: "capacity".to_string(),
            min: 1,
            max: MAX_TABLE_CAPACITY,
        });
    }

    Ok(())
}

/// Validates a tax rate in basis points.
///
/// ## Rules
/// - Must be between 0 and 10000 (0% to 100%)
pub fn validate_tax_rate_bps(bps: u32) -> ValidationResult<()> {
    if bps > 10_000 {
        return Err(ValidationError::OutOfRange {
            field: "tax_rate".to_string(),
            min: 0,
            max: 10_000,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(999).is_ok());

        assert!(matches!(
            validate_quantity(0),
            Err(ValidationError::MustBePositive { .. })
        ));
        assert!(validate_quantity(-3).is_err());
        assert!(matches!(
            validate_quantity(1000),
            Err(ValidationError::OutOfRange { .. })
        ));
    }

    #[test]
    fn test_validate_notes() {
        assert_eq!(validate_notes(None).unwrap(), None);
        assert_eq!(validate_notes(Some("   ")).unwrap(), None);
        assert_eq!(
            validate_notes(Some(" no ice ")).unwrap(),
            Some("no ice".to_string())
        );
        assert!(validate_notes(Some(&"x".repeat(MAX_NOTES_LEN + 1))).is_err());
    }

    #[test]
    fn test_validate_table_fields() {
        assert_eq!(validate_table_name("  Meja 4 ").unwrap(), "Meja 4");
        assert!(validate_table_name("").is_err());
        assert!(validate_table_number(1).is_ok());
        assert!(validate_table_number(0).is_err());
        assert!(validate_capacity(4).is_ok());
        assert!(validate_capacity(0).is_err());
        assert!(validate_capacity(MAX_TABLE_CAPACITY + 1).is_err());
    }

    #[test]
    fn test_validate_money_inputs() {
        assert!(validate_price_cents(0).is_ok());
        assert!(validate_price_cents(-1).is_err());
        assert!(validate_price_cents(MAX_PRICE_CENTS).is_ok());
        assert!(matches!(
            validate_price_cents(MAX_PRICE_CENTS + 1),
            Err(ValidationError::OutOfRange { .. })
        ));
        assert!(validate_tendered_cents(0).is_ok());
        assert!(matches!(
            validate_tendered_cents(-100),
            Err(ValidationError::MustNotBeNegative { .. })
        ));
    }

    #[test]
    fn test_validate_id_and_staff() {
        assert!(validate_id("order_id", "abc").is_ok());
        assert!(validate_id("order_id", "  ").is_err());
        assert_eq!(validate_staff_id(" kasir-1 ").unwrap(), "kasir-1");
    }

    #[test]
    fn test_validate_tax_rate_bps() {
        assert!(validate_tax_rate_bps(0).is_ok());
        assert!(validate_tax_rate_bps(1000).is_ok());
        assert!(validate_tax_rate_bps(10_001).is_err());
    }
}
