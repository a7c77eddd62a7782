//! Property-Based Test Generators
//!
//! Proptest strategies for invoice inputs that respect the domain's
//! invariants: positive quantities, non-negative rates and percentages
//! within 0-100.

use domain_invoicing::LineItem;
use proptest::prelude::*;
use rust_decimal::Decimal;

/// Quantities from 0.01 to 10,000.00
pub fn quantity_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..1_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Rates from 0.00 to 100,000.00
pub fn rate_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Percentages from 0.00 to 100.00
pub fn percentage_strategy() -> impl Strategy<Value = Decimal> {
    (0i64..=10_000i64).prop_map(|n| Decimal::new(n, 2))
}

pub fn unit_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("each".to_string()),
        Just("hours".to_string()),
        Just("pieces".to_string()),
        Just("kg".to_string()),
        "[a-z]{1,8}",
    ]
}

pub fn line_item_strategy() -> impl Strategy<Value = LineItem> {
    ("[A-Za-z ]{1,40}", quantity_strategy(), rate_strategy(), unit_strategy())
        .prop_map(|(description, quantity, rate, unit)| LineItem::new(description, quantity, rate).with_unit(unit))
}

/// Between one and `max` line items
pub fn line_items_strategy(max: usize) -> impl Strategy<Value = Vec<LineItem>> {
    prop::collection::vec(line_item_strategy(), 1..=max.max(1))
}
