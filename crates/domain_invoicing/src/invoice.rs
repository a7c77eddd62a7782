//! Invoices and their financial model
//!
//! All derived amounts are pure functions of the line items and the two
//! rates. Each step rounds to two decimal places, half to even.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use core_kernel::{format_amount, round_money, symbol_for_code, InvoiceId, Percentage};

use crate::client::Client;
use crate::error::InvoicingError;
use crate::line_item::LineItem;
use crate::numbering::InvoiceNumber;

/// Invoice status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InvoiceStatus {
    /// Being prepared, not yet sent to the client
    #[default]
    Draft,
    /// Sent to the client, awaiting payment
    Sent,
    /// Fully paid
    Paid,
    /// Past due and still awaiting payment
    Overdue,
    /// Voided
    Cancelled,
}

impl InvoiceStatus {
    pub const ALL: [InvoiceStatus; 5] = [
        InvoiceStatus::Draft,
        InvoiceStatus::Sent,
        InvoiceStatus::Paid,
        InvoiceStatus::Overdue,
        InvoiceStatus::Cancelled,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            InvoiceStatus::Draft => "draft",
            InvoiceStatus::Sent => "sent",
            InvoiceStatus::Paid => "paid",
            InvoiceStatus::Overdue => "overdue",
            InvoiceStatus::Cancelled => "cancelled",
        }
    }

    /// Statuses in which the client still owes the total
    pub fn is_awaiting_payment(&self) -> bool {
        matches!(self, InvoiceStatus::Sent | InvoiceStatus::Overdue)
    }

    /// Returns true if moving from `self` to `next` is allowed
    pub fn can_transition_to(&self, next: InvoiceStatus) -> bool {
        use InvoiceStatus::*;
        matches!(
            (self, next),
            (Draft, Sent)
                | (Draft, Cancelled)
                | (Sent, Paid)
                | (Sent, Overdue)
                | (Sent, Cancelled)
                | (Overdue, Paid)
                | (Overdue, Cancelled)
        )
    }
}

impl fmt::Display for InvoiceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for InvoiceStatus {
    type Err = InvoicingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value = s.trim();
        InvoiceStatus::ALL
            .iter()
            .copied()
            .find(|status| status.as_str().eq_ignore_ascii_case(value))
            .ok_or_else(|| InvoicingError::validation("status", format!("unknown status: {}", s)))
    }
}

/// Every derived amount of an invoice, computed in one pass
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceTotals {
    pub subtotal: Decimal,
    pub discount_amount: Decimal,
    pub subtotal_after_discount: Decimal,
    pub tax_amount: Decimal,
    pub total: Decimal,
}

impl InvoiceTotals {
    /// Applies the discount, then tax, rounding after each step
    pub fn compute(items: &[LineItem], discount: Percentage, tax_rate: Percentage) -> Self {
        let subtotal = round_money(items.iter().map(LineItem::total).sum());
        let discount_amount = discount.portion_of(subtotal);
        let subtotal_after_discount = round_money(subtotal - discount_amount);
        let tax_amount = tax_rate.portion_of(subtotal_after_discount);
        let total = round_money(subtotal_after_discount + tax_amount);

        Self {
            subtotal,
            discount_amount,
            subtotal_after_discount,
            tax_amount,
            total,
        }
    }
}

/// An invoice issued by a tenant to one of its clients
///
/// The number is fixed at creation and the status only changes through
/// [`Invoice::transition_to`]; everything else is plain data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Invoice {
    id: InvoiceId,
    invoice_number: InvoiceNumber,
    status: InvoiceStatus,
    /// Snapshot of the billed client
    pub client: Client,
    /// Line items, in display order
    pub items: Vec<LineItem>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: Percentage,
    pub discount_percentage: Percentage,
    /// ISO 4217 code; unknown codes render with `$`
    pub currency: String,
    pub notes: Option<String>,
    /// Overrides the terms derived from the due date
    pub payment_terms: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invoice {
    /// Creates a draft invoice with no items and zero rates
    ///
    /// # Arguments
    ///
    /// * `invoice_number` - Number reserved from the tenant's counter
    /// * `client` - Client being billed
    /// * `issue_date` - Date printed as the invoice date
    /// * `due_date` - Payment due date
    /// * `currency` - ISO 4217 currency code
    pub fn new(
        invoice_number: InvoiceNumber,
        client: Client,
        issue_date: NaiveDate,
        due_date: NaiveDate,
        currency: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: InvoiceId::new_v7(),
            invoice_number,
            status: InvoiceStatus::Draft,
            client,
            items: Vec::new(),
            issue_date,
            due_date,
            tax_rate: Percentage::zero(),
            discount_percentage: Percentage::zero(),
            currency: currency.into().trim().to_uppercase(),
            notes: None,
            payment_terms: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn with_tax_rate(mut self, rate: Percentage) -> Self {
        self.tax_rate = rate;
        self
    }

    pub fn with_discount(mut self, discount: Percentage) -> Self {
        self.discount_percentage = discount;
        self
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_payment_terms(mut self, terms: impl Into<String>) -> Self {
        self.payment_terms = Some(terms.into());
        self
    }

    pub fn with_items(mut self, items: Vec<LineItem>) -> Self {
        self.items = items;
        self
    }

    pub fn add_item(&mut self, item: LineItem) {
        self.items.push(item);
        self.updated_at = Utc::now();
    }

    pub fn id(&self) -> InvoiceId {
        self.id
    }

    pub fn invoice_number(&self) -> &InvoiceNumber {
        &self.invoice_number
    }

    pub fn status(&self) -> InvoiceStatus {
        self.status
    }

    /// Moves the invoice to `next`
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::InvalidStateTransition` for any move outside
    /// draft→sent/cancelled, sent→paid/overdue/cancelled and
    /// overdue→paid/cancelled.
    pub fn transition_to(&mut self, next: InvoiceStatus) -> Result<(), InvoicingError> {
        if !self.status.can_transition_to(next) {
            return Err(InvoicingError::InvalidStateTransition {
                from: self.status.to_string(),
                to: next.to_string(),
            });
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Marks a sent invoice overdue once its due date has passed
    ///
    /// Returns true if the status changed.
    pub fn refresh_overdue(&mut self, today: NaiveDate) -> bool {
        if self.status == InvoiceStatus::Sent && self.due_date < today {
            self.status = InvoiceStatus::Overdue;
            self.updated_at = Utc::now();
            return true;
        }
        false
    }

    pub fn totals(&self) -> InvoiceTotals {
        InvoiceTotals::compute(&self.items, self.discount_percentage, self.tax_rate)
    }

    pub fn subtotal(&self) -> Decimal {
        self.totals().subtotal
    }

    pub fn discount_amount(&self) -> Decimal {
        self.totals().discount_amount
    }

    pub fn subtotal_after_discount(&self) -> Decimal {
        self.totals().subtotal_after_discount
    }

    pub fn tax_amount(&self) -> Decimal {
        self.totals().tax_amount
    }

    pub fn total(&self) -> Decimal {
        self.totals().total
    }

    /// Past due and still awaiting payment
    ///
    /// Draft, paid and cancelled invoices are never overdue.
    pub fn is_overdue_on(&self, today: NaiveDate) -> bool {
        self.due_date < today && self.status.is_awaiting_payment()
    }

    /// Whole days past due, 0 when not overdue
    pub fn days_overdue(&self, today: NaiveDate) -> i64 {
        if self.is_overdue_on(today) {
            (today - self.due_date).num_days()
        } else {
            0
        }
    }

    /// Days from `today` until the due date, negative once it has passed
    pub fn days_until_due(&self, today: NaiveDate) -> i64 {
        (self.due_date - today).num_days()
    }

    /// Days granted between issue and due date
    pub fn term_days(&self) -> i64 {
        (self.due_date - self.issue_date).num_days()
    }

    /// Explicit payment terms, or terms derived from the term length
    pub fn payment_terms_text(&self) -> String {
        if let Some(terms) = self.payment_terms.as_deref().map(str::trim) {
            if !terms.is_empty() {
                return terms.to_string();
            }
        }
        match self.term_days() {
            days if days <= 0 => "Payment due upon receipt".to_string(),
            days if days <= 15 => format!("Payment due within {} days", days),
            days => format!("Payment due within {} days of invoice date", days),
        }
    }

    pub fn currency_symbol(&self) -> &'static str {
        symbol_for_code(&self.currency)
    }

    /// Formats `amount` in the invoice currency, e.g. `$1,234.50`
    pub fn format_amount(&self, amount: Decimal) -> String {
        format_amount(self.currency_symbol(), amount)
    }
}

/// Summary of a tenant's invoices on a given day
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvoiceStats {
    pub total_count: usize,
    pub draft_count: usize,
    pub awaiting_payment_count: usize,
    pub overdue_count: usize,
    pub paid_count: usize,
    pub cancelled_count: usize,
    /// Totals awaiting payment, per currency code
    pub outstanding: BTreeMap<String, Decimal>,
    /// Totals collected, per currency code
    pub collected: BTreeMap<String, Decimal>,
}

impl InvoiceStats {
    pub fn from_invoices<'a>(invoices: impl IntoIterator<Item = &'a Invoice>, today: NaiveDate) -> Self {
        let mut stats = InvoiceStats::default();
        for invoice in invoices {
            stats.total_count += 1;
            match invoice.status() {
                InvoiceStatus::Draft => stats.draft_count += 1,
                InvoiceStatus::Paid => {
                    stats.paid_count += 1;
                    *stats.collected.entry(invoice.currency.clone()).or_default() += invoice.total();
                }
                InvoiceStatus::Cancelled => stats.cancelled_count += 1,
                InvoiceStatus::Sent | InvoiceStatus::Overdue => {
                    stats.awaiting_payment_count += 1;
                    *stats.outstanding.entry(invoice.currency.clone()).or_default() += invoice.total();
                }
            }
            if invoice.is_overdue_on(today) {
                stats.overdue_count += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::NewClient;
    use rust_decimal_macros::dec;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn invoice(issue: NaiveDate, due: NaiveDate) -> Invoice {
        let client = Client::new(NewClient::new("Acme", "ap@acme.test", "1 Main St")).unwrap();
        Invoice::new(InvoiceNumber::new("INV-0001"), client, issue, due, "usd")
    }

    #[test]
    fn test_discount_then_tax() {
        let mut inv = invoice(date(2024, 1, 1), date(2024, 1, 31))
            .with_discount(Percentage::new(dec!(10)).unwrap())
            .with_tax_rate(Percentage::new(dec!(8)).unwrap());
        inv.add_item(LineItem::new("Work", dec!(1), dec!(100)));

        let totals = inv.totals();
        assert_eq!(totals.subtotal, dec!(100.00));
        assert_eq!(totals.discount_amount, dec!(10.00));
        assert_eq!(totals.subtotal_after_discount, dec!(90.00));
        assert_eq!(totals.tax_amount, dec!(7.20));
        assert_eq!(totals.total, dec!(97.20));
    }

    #[test]
    fn test_currency_code_is_normalized() {
        let inv = invoice(date(2024, 1, 1), date(2024, 1, 31));
        assert_eq!(inv.currency, "USD");
        assert_eq!(inv.format_amount(dec!(1234.5)), "$1,234.50");
    }

    #[test]
    fn test_transitions() {
        let mut inv = invoice(date(2024, 1, 1), date(2024, 1, 31));
        assert!(inv.transition_to(InvoiceStatus::Paid).is_err());
        inv.transition_to(InvoiceStatus::Sent).unwrap();
        inv.transition_to(InvoiceStatus::Overdue).unwrap();
        inv.transition_to(InvoiceStatus::Paid).unwrap();
        let err = inv.transition_to(InvoiceStatus::Draft).unwrap_err();
        assert_eq!(err.to_string(), "Invalid state transition from paid to draft");
    }

    #[test]
    fn test_refresh_overdue_only_moves_sent() {
        let mut inv = invoice(date(2024, 1, 1), date(2024, 1, 31));
        assert!(!inv.refresh_overdue(date(2024, 3, 1)));
        inv.transition_to(InvoiceStatus::Sent).unwrap();
        assert!(!inv.refresh_overdue(date(2024, 1, 31)));
        assert!(inv.refresh_overdue(date(2024, 2, 1)));
        assert_eq!(inv.status(), InvoiceStatus::Overdue);
    }
}
