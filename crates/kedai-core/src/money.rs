//! # Money Module
//!
//! Provides the `Money` and `TaxRate` types for currency math.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌                                  │
//! │                                                                         │
//! │  A café ticket recomputed after every line edit would drift by a       │
//! │  fraction of a cent each time. Integer minor units never drift:        │
//! │                                                                         │
//! │    subtotal 100000 × 10% → tax 10000 → total 110000   ✅               │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use kedai_core::money::{Money, TaxRate};
//!
//! let latte = Money::from_cents(28_000);
//! let line_total = latte.checked_mul_quantity(2).unwrap_or_default();
//! let tax = line_total.calculate_tax(TaxRate::from_bps(1000));
//!
//! assert_eq!(line_total.cents(), 56_000);
//! assert_eq!(tax.cents(), 5_600);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

use crate::error::ValidationError;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit.
///
/// ## Design Decisions
/// - **i64 (signed)**: differences (tendered − total) may go negative before
///   they are clamped
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Serialized as a bare integer** so the UI receives minor units
///
/// ## Where Money Flows
/// ```text
/// MenuItem.price ──► OrderItem.unit_price (frozen) ──► OrderItem.line_total
///                                                             │
///                         Order.subtotal ◄────────────────────┘
///                               │
///                               ├──► Order.tax ──► Order.total
///                               │                      │
///                               └──────────────────────┴──► Transaction.amount
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ## Example
    /// ```rust
    /// use kedai_core::money::Money;
    ///
    /// let price = Money::from_cents(2_500_000); // 25,000.00
    /// assert_eq!(price.cents(), 2_500_000);
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    ///
    /// ## Example
    /// ```rust
    /// use kedai_core::money::Money;
    ///
    /// let short = Money::from_cents(-500);
    /// assert_eq!(short.clamp_zero(), Money::zero());
    /// ```
    #[inline]
    pub fn clamp_zero(self) -> Self {
        Money(self.0.max(0))
    }

    /// Calculates tax at the given rate, rounding half up.
    ///
    /// ## Implementation
    /// Integer math: `(amount × bps + 5000) / 10000`.
    /// i128 keeps large tickets from overflowing the intermediate product.
    ///
    /// ## Example
    /// ```rust
    /// use kedai_core::money::{Money, TaxRate};
    ///
    /// let subtotal = Money::from_cents(1000);
    /// let tax = subtotal.calculate_tax(TaxRate::from_bps(825));
    /// // 1000 × 8.25% = 82.5 → 83
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        let tax_cents = (self.0 as i128 * rate.bps() as i128 + 5000) / 10000;
        Money::from_cents(tax_cents as i64)
    }

    /// Multiplies money by a quantity, `None` on overflow.
    ///
    /// ```rust
    /// use kedai_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(18_000);
    /// assert_eq!(unit_price.checked_mul_quantity(3), Some(Money::from_cents(54_000)));
    /// assert_eq!(Money::from_cents(i64::MAX).checked_mul_quantity(2), None);
    /// ```
    #[inline]
    pub const fn checked_mul_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Adds two amounts, `None` on overflow.
    #[inline]
    pub const fn checked_add(&self, other: Money) -> Option<Self> {
        match self.0.checked_add(other.0) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Plain `major.minor` rendering for logs. Currency symbols are the
/// presentation layer's job.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}{}.{:02}", sign, self.major().abs(), self.minor())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Tax Rate
// =============================================================================

/// Tax rate represented in basis points (bps).
///
/// ## Why Basis Points?
/// 1 basis point = 0.01% = 1/10000, so the café's default `0.10`
/// is exactly `1000` bps with no float in sight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct TaxRate(u32);

impl TaxRate {
    /// The rate applied when the settings store has no `tax_rate` entry (10%).
    pub const DEFAULT: TaxRate = TaxRate(1000);

    /// Creates a tax rate from basis points.
    #[inline]
    pub const fn from_bps(bps: u32) -> Self {
        TaxRate(bps)
    }

    /// Returns the rate in basis points.
    #[inline]
    pub const fn bps(&self) -> u32 {
        self.0
    }

    /// Zero tax rate.
    #[inline]
    pub const fn zero() -> Self {
        TaxRate(0)
    }

    /// Parses a decimal fraction such as `"0.10"` or `"0.0825"` exactly.
    ///
    /// ## Rules
    /// - Non-negative
    /// - At most 4 fractional digits (the bps resolution)
    /// - Digits and a single optional `.` only
    ///
    /// ## Example
    /// ```rust
    /// use kedai_core::money::TaxRate;
    ///
    /// assert_eq!(TaxRate::parse_decimal("0.10").unwrap().bps(), 1000);
    /// assert_eq!(TaxRate::parse_decimal("0.0825").unwrap().bps(), 825);
    /// assert!(TaxRate::parse_decimal("-0.1").is_err());
    /// ```
    pub fn parse_decimal(raw: &str) -> Result<Self, ValidationError> {
        let invalid = |reason: &str| ValidationError::InvalidFormat {
            field: "tax_rate".to_string(),
            reason: reason.to_string(),
        };

        let raw = raw.trim();
        if raw.is_empty() {
            return Err(ValidationError::Required {
                field: "tax_rate".to_string(),
            });
        }
        if raw.starts_with('-') {
            return Err(invalid("must not be negative"));
        }

        let (whole, frac) = match raw.split_once('.') {
            Some((whole, frac)) => (whole, frac),
            None => (raw, ""),
        };

        let all_digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
        if !all_digits(whole) || !all_digits(frac) || (whole.is_empty() && frac.is_empty()) {
            return Err(invalid("must be a decimal number such as 0.10"));
        }

        let significant = frac.trim_end_matches('0');
        if significant.len() > 4 {
            return Err(invalid("supports at most 4 decimal places"));
        }

        let whole: u32 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| invalid("is too large"))?
        };
        let frac_bps: u32 = if significant.is_empty() {
            0
        } else {
            format!("{:0<4}", significant)
                .parse()
                .map_err(|_| invalid("is not a number"))?
        };

        whole
            .checked_mul(10_000)
            .and_then(|w| w.checked_add(frac_bps))
            .map(TaxRate)
            .ok_or_else(|| invalid("is too large"))
    }

    /// Renders the rate back as a decimal fraction (`1000` → `"0.1"`).
    pub fn to_decimal_string(&self) -> String {
        let whole = self.0 / 10_000;
        let frac = self.0 % 10_000;
        if frac == 0 {
            return whole.to_string();
        }
        let frac = format!("{:04}", frac);
        format!("{}.{}", whole, frac.trim_end_matches('0'))
    }
}

impl Default for TaxRate {
    fn default() -> Self {
        TaxRate::DEFAULT
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
