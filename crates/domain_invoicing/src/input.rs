//! Boundary input for creating invoices
//!
//! Drafts arrive as JSON from outside the core with loosely typed numbers
//! (`"2.5"`, `2.5` or `"abc"`). Everything is checked here, before an
//! invoice number is reserved, so bad input never consumes a number.
//!
//! ```json
//! {
//!   "client": { "name": "Acme", "email": "ap@acme.test", "address": "1 Main St" },
//!   "items": [{ "description": "Design", "quantity": "10", "rate": 50, "unit": "hours" }],
//!   "tax_rate": 5
//! }
//! ```

use chrono::{Days, NaiveDate};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use core_kernel::Percentage;

use crate::client::{Client, NewClient};
use crate::error::InvoicingError;
use crate::invoice::InvoiceStatus;
use crate::line_item::LineItem;
use crate::tenant::Company;

/// Longest accepted item description
pub const MAX_DESCRIPTION_LEN: usize = 500;

/// Largest accepted quantity or rate: ten digits, two of them decimals
pub const MAX_ITEM_VALUE: Decimal = dec!(99999999.99);

/// A number as it arrives in JSON: a literal or a string
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawNumber {
    Number(serde_json::Number),
    Text(String),
}

impl RawNumber {
    /// Parses the value as a decimal
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Validation` naming `field` when the value is
    /// not numeric.
    pub fn parse(&self, field: &str) -> Result<Decimal, InvoicingError> {
        let text = match self {
            RawNumber::Number(n) => n.to_string(),
            RawNumber::Text(s) => s.trim().to_string(),
        };
        Decimal::from_str(&text)
            .or_else(|_| Decimal::from_scientific(&text))
            .map_err(|_| InvoicingError::validation(field, format!("not a number: {:?}", text)))
    }
}

impl From<Decimal> for RawNumber {
    fn from(value: Decimal) -> Self {
        RawNumber::Text(value.to_string())
    }
}

impl From<&str> for RawNumber {
    fn from(value: &str) -> Self {
        RawNumber::Text(value.to_string())
    }
}

/// One requested line item
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineItemInput {
    pub description: String,
    pub quantity: RawNumber,
    pub rate: RawNumber,
    #[serde(default)]
    pub unit: Option<String>,
}

impl LineItemInput {
    pub fn new(description: impl Into<String>, quantity: impl Into<RawNumber>, rate: impl Into<RawNumber>) -> Self {
        Self {
            description: description.into(),
            quantity: quantity.into(),
            rate: rate.into(),
            unit: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    fn validate(&self, index: usize) -> Result<LineItem, InvoicingError> {
        let description = self.description.trim();
        if description.is_empty() {
            return Err(InvoicingError::validation(
                format!("items[{}].description", index),
                "description is required",
            ));
        }
        if description.chars().count() > MAX_DESCRIPTION_LEN {
            return Err(InvoicingError::validation(
                format!("items[{}].description", index),
                format!("description exceeds {} characters", MAX_DESCRIPTION_LEN),
            ));
        }

        let quantity_field = format!("items[{}].quantity", index);
        let quantity = self.quantity.parse(&quantity_field)?;
        if quantity <= Decimal::ZERO {
            return Err(InvoicingError::validation(quantity_field, "quantity must be positive"));
        }
        if quantity > MAX_ITEM_VALUE {
            return Err(InvoicingError::validation(
                quantity_field,
                format!("quantity must not exceed {}", MAX_ITEM_VALUE),
            ));
        }

        let rate_field = format!("items[{}].rate", index);
        let rate = self.rate.parse(&rate_field)?;
        if rate < Decimal::ZERO {
            return Err(InvoicingError::validation(rate_field, "rate must not be negative"));
        }
        if rate > MAX_ITEM_VALUE {
            return Err(InvoicingError::validation(
                rate_field,
                format!("rate must not exceed {}", MAX_ITEM_VALUE),
            ));
        }

        let item = LineItem::new(description, quantity, rate);
        Ok(match &self.unit {
            Some(unit) => item.with_unit(unit.as_str()),
            None => item,
        })
    }
}

/// A requested invoice, before validation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvoiceDraft {
    /// May be left out when the caller fills it from a saved client
    #[serde(default)]
    pub client: Option<NewClient>,
    pub items: Vec<LineItemInput>,
    /// Defaults to the tenant's today
    #[serde(default)]
    pub issue_date: Option<NaiveDate>,
    /// Defaults to issue date plus the tenant's payment terms
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
    /// Percent; defaults to the tenant's default tax rate
    #[serde(default)]
    pub tax_rate: Option<RawNumber>,
    /// Percent; defaults to 0
    #[serde(default)]
    pub discount_percentage: Option<RawNumber>,
    /// Defaults to the tenant's currency
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub payment_terms: Option<String>,
    /// Status to move the new invoice to after creation
    #[serde(default)]
    pub status: Option<InvoiceStatus>,
}

/// A draft that passed validation, ready to receive a number
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedDraft {
    pub client: Client,
    pub items: Vec<LineItem>,
    pub issue_date: NaiveDate,
    pub due_date: NaiveDate,
    pub tax_rate: Percentage,
    pub discount_percentage: Percentage,
    pub currency: String,
    pub notes: Option<String>,
    pub payment_terms: Option<String>,
    pub status: InvoiceStatus,
}

impl InvoiceDraft {
    pub fn new(client: NewClient, items: Vec<LineItemInput>) -> Self {
        Self {
            client: Some(client),
            items,
            issue_date: None,
            due_date: None,
            tax_rate: None,
            discount_percentage: None,
            currency: None,
            notes: None,
            payment_terms: None,
            status: None,
        }
    }

    /// Parses a draft from JSON
    pub fn from_json(data: &str) -> Result<Self, InvoicingError> {
        serde_json::from_str(data).map_err(|e| InvoicingError::validation("draft", e.to_string()))
    }

    /// Validates the draft against the company's defaults
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Validation` for a missing or invalid client,
    /// no items, a non-numeric, negative or oversized quantity or rate, a
    /// rate outside 0-100, a due date before the issue date, or a status a
    /// new invoice cannot move to.
    pub fn validate(&self, company: &Company, today: NaiveDate) -> Result<ValidatedDraft, InvoicingError> {
        let status = self.status.unwrap_or_default();
        if status != InvoiceStatus::Draft && !InvoiceStatus::Draft.can_transition_to(status) {
            return Err(InvoicingError::validation(
                "status",
                format!("a new invoice cannot be {}", status),
            ));
        }

        let input = self
            .client
            .clone()
            .ok_or_else(|| InvoicingError::validation("client", "a client is required"))?;
        let client = Client::new(input)?;

        if self.items.is_empty() {
            return Err(InvoicingError::validation("items", "at least one item is required"));
        }
        let items = self
            .items
            .iter()
            .enumerate()
            .map(|(index, item)| item.validate(index))
            .collect::<Result<Vec<_>, _>>()?;

        let tax_rate = match &self.tax_rate {
            Some(raw) => percentage(raw, "tax_rate")?,
            None => company.default_tax_rate,
        };
        let discount_percentage = match &self.discount_percentage {
            Some(raw) => percentage(raw, "discount_percentage")?,
            None => Percentage::zero(),
        };

        let issue_date = self.issue_date.unwrap_or(today);
        let due_date = match self.due_date {
            Some(due) => due,
            None => issue_date
                .checked_add_days(Days::new(u64::from(company.default_payment_terms)))
                .ok_or_else(|| {
                    InvoicingError::validation("due_date", "payment terms overflow the calendar")
                })?,
        };
        if due_date < issue_date {
            return Err(InvoicingError::validation("due_date", "due date is before the issue date"));
        }

        let currency = self
            .currency
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_uppercase)
            .unwrap_or_else(|| company.currency.code().to_string());

        Ok(ValidatedDraft {
            client,
            items,
            issue_date,
            due_date,
            tax_rate,
            discount_percentage,
            currency,
            notes: non_blank(&self.notes),
            payment_terms: non_blank(&self.payment_terms),
            status,
        })
    }
}

fn percentage(raw: &RawNumber, field: &str) -> Result<Percentage, InvoicingError> {
    let value = raw.parse(field)?;
    Percentage::new(value)
        .map_err(|_| InvoicingError::validation(field, format!("{} must be between 0 and 100", value)))
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
