//! Test Data Builders
//!
//! Builders for invoices and line items with sensible defaults. Tests set
//! only the fields they care about.

use chrono::NaiveDate;
use core_kernel::Percentage;
use domain_invoicing::{Client, Invoice, InvoiceNumber, InvoiceStatus, LineItem};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::fixtures::{ClientFixtures, DateFixtures};

/// Builder for constructing test invoices
pub struct InvoiceBuilder {
    number: String,
    client: Client,
    issue_date: NaiveDate,
    due_date: NaiveDate,
    currency: String,
    items: Vec<LineItem>,
    tax_rate: Decimal,
    discount: Decimal,
    notes: Option<String>,
    payment_terms: Option<String>,
    status: InvoiceStatus,
}

impl Default for InvoiceBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl InvoiceBuilder {
    /// Creates a builder for an empty USD draft billed to Acme
    pub fn new() -> Self {
        Self {
            number: "INV-0001".to_string(),
            client: ClientFixtures::acme(),
            issue_date: DateFixtures::issue_date(),
            due_date: DateFixtures::due_date(),
            currency: "USD".to_string(),
            items: Vec::new(),
            tax_rate: Decimal::ZERO,
            discount: Decimal::ZERO,
            notes: None,
            payment_terms: None,
            status: InvoiceStatus::Draft,
        }
    }

    pub fn with_number(mut self, number: impl Into<String>) -> Self {
        self.number = number.into();
        self
    }

    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Sets issue and due dates
    pub fn with_dates(mut self, issue_date: NaiveDate, due_date: NaiveDate) -> Self {
        self.issue_date = issue_date;
        self.due_date = due_date;
        self
    }

    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into();
        self
    }

    /// Adds a line item with the default unit
    pub fn with_item(mut self, description: &str, quantity: Decimal, rate: Decimal) -> Self {
        self.items.push(LineItem::new(description, quantity, rate));
        self
    }

    pub fn with_line_item(mut self, item: LineItem) -> Self {
        self.items.push(item);
        self
    }

    /// Tax rate in percent
    pub fn with_tax(mut self, rate: Decimal) -> Self {
        self.tax_rate = rate;
        self
    }

    /// Discount in percent
    pub fn with_discount(mut self, discount: Decimal) -> Self {
        self.discount = discount;
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

    /// Sent invoices can become overdue
    pub fn sent(mut self) -> Self {
        self.status = InvoiceStatus::Sent;
        self
    }

    pub fn with_status(mut self, status: InvoiceStatus) -> Self {
        self.status = status;
        self
    }

    /// Builds the invoice
    ///
    /// # Panics
    ///
    /// Panics if a percentage is outside 0-100 or the status is not
    /// reachable from draft.
    pub fn build(self) -> Invoice {
        let mut invoice = Invoice::new(
            InvoiceNumber::new(self.number),
            self.client,
            self.issue_date,
            self.due_date,
            self.currency,
        )
        .with_items(self.items)
        .with_tax_rate(Percentage::new(self.tax_rate).unwrap())
        .with_discount(Percentage::new(self.discount).unwrap());
        invoice.notes = self.notes;
        invoice.payment_terms = self.payment_terms;

        match self.status {
            InvoiceStatus::Draft => {}
            InvoiceStatus::Paid | InvoiceStatus::Overdue => {
                invoice.transition_to(InvoiceStatus::Sent).unwrap();
                invoice.transition_to(self.status).unwrap();
            }
            status => invoice.transition_to(status).unwrap(),
        }
        invoice
    }
}

/// Builder for line items
pub struct LineItemBuilder {
    description: String,
    quantity: Decimal,
    rate: Decimal,
    unit: Option<String>,
}

impl Default for LineItemBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl LineItemBuilder {
    /// One unit of consulting at 100.00
    pub fn new() -> Self {
        Self {
            description: "Consulting".to_string(),
            quantity: dec!(1),
            rate: dec!(100.00),
            unit: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_quantity(mut self, quantity: Decimal) -> Self {
        self.quantity = quantity;
        self
    }

    pub fn with_rate(mut self, rate: Decimal) -> Self {
        self.rate = rate;
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn build(self) -> LineItem {
        let item = LineItem::new(self.description, self.quantity, self.rate);
        match self.unit {
            Some(unit) => item.with_unit(unit),
            None => item,
        }
    }
}
