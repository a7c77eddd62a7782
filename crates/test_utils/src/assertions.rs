//! Custom Test Assertions
//!
//! Assertion helpers for invoice amounts that report every figure involved
//! when they fail.

use domain_invoicing::{Invoice, InvoiceTotals};
use rust_decimal::Decimal;

/// Asserts that an amount is rounded to whole cents
pub fn assert_cents(amount: Decimal) {
    assert_eq!(
        amount,
        amount.round_dp(2),
        "Expected an amount rounded to 2 decimal places, got {}",
        amount
    );
}

/// Asserts that the totals chain adds up
///
/// # Panics
///
/// Panics if any step is unrounded or the steps don't reconcile
pub fn assert_totals_consistent(totals: &InvoiceTotals) {
    assert_cents(totals.subtotal);
    assert_cents(totals.discount_amount);
    assert_cents(totals.subtotal_after_discount);
    assert_cents(totals.tax_amount);
    assert_cents(totals.total);

    assert_eq!(
        totals.subtotal - totals.discount_amount,
        totals.subtotal_after_discount,
        "Discount doesn't reconcile: subtotal={}, discount={}, after={}",
        totals.subtotal,
        totals.discount_amount,
        totals.subtotal_after_discount
    );
    assert_eq!(
        totals.subtotal_after_discount + totals.tax_amount,
        totals.total,
        "Tax doesn't reconcile: after_discount={}, tax={}, total={}",
        totals.subtotal_after_discount,
        totals.tax_amount,
        totals.total
    );
}

/// Asserts the invoice's total and its formatted form
pub fn assert_invoice_total(invoice: &Invoice, expected: Decimal, formatted: &str) {
    assert_eq!(
        invoice.total(),
        expected,
        "Invoice {} total mismatch",
        invoice.invoice_number()
    );
    assert_eq!(invoice.format_amount(invoice.total()), formatted);
}

/// Asserts that `text` contains every one of `needles`
pub fn assert_contains_all(text: &str, needles: &[&str]) {
    let missing: Vec<&str> = needles.iter().copied().filter(|n| !text.contains(n)).collect();
    assert!(missing.is_empty(), "Missing {:?} in:\n{}", missing, text);
}
