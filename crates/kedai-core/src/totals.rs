//! # Totals Calculator
//!
//! Pure recomputation of an order's money columns from its line items.
//!
//! ```text
//! subtotal = Σ line_total
//! tax      = round_half_up(subtotal × rate)
//! total    = subtotal + tax
//! ```
//!
//! Called after every line item mutation, inside the same database
//! transaction, so stored totals are never stale.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::types::OrderItem;

/// Subtotal, tax and total of one order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Totals {
    pub subtotal: Money,
    pub tax: Money,
    pub total: Money,
}

impl Totals {
    /// Computes totals over precomputed line totals.
    ///
    /// Fails with [`CoreError::AmountOverflow`] when the sum does not fit.
    pub fn from_line_totals<I>(line_totals: I, rate: TaxRate) -> CoreResult<Self>
    where
        I: IntoIterator<Item = Money>,
    {
        let subtotal = line_totals
            .into_iter()
            .try_fold(Money::zero(), |acc, line| acc.checked_add(line))
            .ok_or(CoreError::AmountOverflow { what: "Subtotal" })?;
        let tax = subtotal.calculate_tax(rate);
        let total = subtotal
            .checked_add(tax)
            .ok_or(CoreError::AmountOverflow { what: "Total" })?;
        Ok(Totals {
            subtotal,
            tax,
            total,
        })
    }

    /// Computes totals over an order's line items.
    pub fn compute(items: &[OrderItem], rate: TaxRate) -> CoreResult<Self> {
        Self::from_line_totals(items.iter().map(OrderItem::line_total), rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn line(quantity: i64, unit_price_cents: i64) -> OrderItem {
        let now = Utc::now();
        OrderItem {
            id: format!("item-{}-{}", quantity, unit_price_cents),
            order_id: "order-1".to_string(),
            menu_item_id: format!("menu-{}", unit_price_cents),
            quantity,
            unit_price_cents,
            line_total_cents: quantity * unit_price_cents,
            notes: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_empty_order_has_zero_totals() {
        let totals = Totals::compute(&[], TaxRate::DEFAULT).unwrap();
        assert_eq!(totals, Totals::default());
    }

    #[test]
    fn test_ten_percent_on_round_subtotal() {
        let items = vec![line(2, 25_000), line(1, 50_000)];
        let totals = Totals::compute(&items, TaxRate::from_bps(1000)).unwrap();

        assert_eq!(totals.subtotal.cents(), 100_000);
        assert_eq!(totals.tax.cents(), 10_000);
        assert_eq!(totals.total.cents(), 110_000);
    }

    #[test]
    fn test_total_is_always_subtotal_plus_tax() {
        let rates = [0, 825, 1000, 1100, 2500];
        let baskets: [&[(i64, i64)]; 4] = [
            &[(1, 1)],
            &[(3, 333), (7, 1_999)],
            &[(999, 123_457)],
            &[(1, 15_500), (2, 18_000), (5, 9_000)],
        ];

        for bps in rates {
            let rate = TaxRate::from_bps(bps);
            for basket in baskets {
                let items: Vec<OrderItem> = basket.iter().map(|(q, p)| line(*q, *p)).collect();
                let totals = Totals::compute(&items, rate).unwrap();
                assert_eq!(totals.total, totals.subtotal + totals.tax);
                assert_eq!(totals.tax, totals.subtotal.calculate_tax(rate));
            }
        }
    }

    #[test]
    fn test_order_of_items_does_not_matter() {
        let a = vec![line(1, 12_345), line(4, 6_789)];
        let b: Vec<OrderItem> = a.iter().rev().cloned().collect();
        assert_eq!(
            Totals::compute(&a, TaxRate::from_bps(1100)).unwrap(),
            Totals::compute(&b, TaxRate::from_bps(1100)).unwrap()
        );
    }

    #[test]
    fn test_overflowing_subtotal_is_an_error() {
        let near_max = Money::from_cents(i64::MAX - 10);
        let err = Totals::from_line_totals([near_max, Money::from_cents(11)], TaxRate::zero())
            .unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { what: "Subtotal" }));

        let err = Totals::from_line_totals([near_max], TaxRate::from_bps(1000)).unwrap_err();
        assert!(matches!(err, CoreError::AmountOverflow { what: "Total" }));
    }
}
