//! Invoice line items

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use core_kernel::{round_money, LineItemId};

/// Unit used when none is given
pub const DEFAULT_UNIT: &str = "each";

/// A line on an invoice: `quantity` units of work billed at `rate`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub id: LineItemId,
    pub description: String,
    pub quantity: Decimal,
    pub rate: Decimal,
    pub unit: String,
}

impl LineItem {
    /// Creates a line item billed per `each`
    pub fn new(description: impl Into<String>, quantity: Decimal, rate: Decimal) -> Self {
        Self {
            id: LineItemId::new_v7(),
            description: description.into(),
            quantity,
            rate,
            unit: DEFAULT_UNIT.to_string(),
        }
    }

    /// Sets the unit of measure; blank units fall back to `each`
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        let unit = unit.into();
        let unit = unit.trim();
        self.unit = if unit.is_empty() {
            DEFAULT_UNIT.to_string()
        } else {
            unit.to_string()
        };
        self
    }

    /// `round(quantity × rate, 2)`
    pub fn total(&self) -> Decimal {
        round_money(self.quantity * self.rate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_total_rounds_half_even() {
        // 3 × 0.125 = 0.375 → 0.38; 1 × 0.125 → 0.12
        assert_eq!(LineItem::new("Bolts", dec!(3), dec!(0.125)).total(), dec!(0.38));
        assert_eq!(LineItem::new("Bolt", dec!(1), dec!(0.125)).total(), dec!(0.12));
    }

    #[test]
    fn test_blank_unit_defaults_to_each() {
        let item = LineItem::new("Widget", dec!(1), dec!(5)).with_unit("   ");
        assert_eq!(item.unit, "each");
        let item = LineItem::new("Design", dec!(1), dec!(5)).with_unit(" hours ");
        assert_eq!(item.unit, "hours");
    }

    proptest! {
        #[test]
        fn total_is_rounded_product(qty in 0i64..100_000i64, rate in 0i64..10_000_000i64) {
            let quantity = Decimal::new(qty, 2);
            let rate = Decimal::new(rate, 2);
            let item = LineItem::new("Work", quantity, rate);
            prop_assert_eq!(item.total(), (quantity * rate).round_dp(2));
            prop_assert!(item.total().scale() <= 2);
        }
    }
}
