//! Tenants
//!
//! A company is the tenant that owns clients, invoices and counters. Its
//! profile supplies the issuer block and the footer contact line of every
//! rendered invoice.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Clock, Country, Currency, Percentage, TenantId, Timezone};

use crate::error::InvoicingError;

/// Longest allowed invoice prefix
pub const MAX_PREFIX_LEN: usize = 10;

/// Payment terms used when a company does not set its own
pub const DEFAULT_PAYMENT_TERMS_DAYS: u32 = 30;

/// Prefix of a tenant's invoice numbers, 1-10 ASCII alphanumerics
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InvoicePrefix(String);

impl InvoicePrefix {
    /// Parses a prefix
    ///
    /// # Errors
    ///
    /// Returns `InvoicingError::Validation` for empty, overlong or
    /// non-alphanumeric prefixes.
    pub fn parse(value: &str) -> Result<Self, InvoicingError> {
        let value = value.trim();
        if value.is_empty() || value.len() > MAX_PREFIX_LEN {
            return Err(InvoicingError::validation(
                "invoice_prefix",
                format!("prefix must be 1-{} characters", MAX_PREFIX_LEN),
            ));
        }
        if !value.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(InvoicingError::validation(
                "invoice_prefix",
                format!("prefix must be alphanumeric: {}", value),
            ));
        }
        Ok(Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for InvoicePrefix {
    fn default() -> Self {
        Self("INV".to_string())
    }
}

impl fmt::Display for InvoicePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for InvoicePrefix {
    type Error = InvoicingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        InvoicePrefix::parse(&value)
    }
}

impl From<InvoicePrefix> for String {
    fn from(prefix: InvoicePrefix) -> String {
        prefix.0
    }
}

/// A tenant company
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Company {
    pub id: TenantId,
    pub name: String,
    pub slug: String,
    pub address: String,
    pub email: String,
    pub phone: Option<String>,
    pub website: Option<String>,
    pub country: Country,
    pub currency: Currency,
    pub invoice_prefix: InvoicePrefix,
    pub default_tax_rate: Percentage,
    pub default_payment_terms: u32,
    pub timezone: Timezone,
}

impl Company {
    /// Creates a company in `country`, billing in that country's currency
    ///
    /// The tenant id is derived from the slug, so the same slug always maps
    /// to the same counters.
    pub fn new(name: impl Into<String>, slug: impl Into<String>, country: Country) -> Self {
        let slug = slug.into();
        Self {
            id: TenantId::from_slug(&slug),
            name: name.into(),
            slug,
            address: String::new(),
            email: String::new(),
            phone: None,
            website: None,
            country,
            currency: country.default_currency(),
            invoice_prefix: InvoicePrefix::default(),
            default_tax_rate: Percentage::zero(),
            default_payment_terms: DEFAULT_PAYMENT_TERMS_DAYS,
            timezone: Timezone::default(),
        }
    }

    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = email.into();
        self
    }

    pub fn with_phone(mut self, phone: impl Into<String>) -> Self {
        self.phone = Some(phone.into());
        self
    }

    pub fn with_website(mut self, website: impl Into<String>) -> Self {
        self.website = Some(website.into());
        self
    }

    /// Overrides the country's default currency
    pub fn with_currency(mut self, currency: Currency) -> Self {
        self.currency = currency;
        self
    }

    pub fn with_prefix(mut self, prefix: InvoicePrefix) -> Self {
        self.invoice_prefix = prefix;
        self
    }

    pub fn with_default_tax_rate(mut self, rate: Percentage) -> Self {
        self.default_tax_rate = rate;
        self
    }

    pub fn with_payment_terms(mut self, days: u32) -> Self {
        self.default_payment_terms = days;
        self
    }

    pub fn with_timezone(mut self, timezone: Timezone) -> Self {
        self.timezone = timezone;
        self
    }

    /// Today's date in the company's timezone
    pub fn today(&self, clock: &dyn Clock) -> NaiveDate {
        clock.today(self.timezone)
    }

    /// Checks the fields the invoice header and footer depend on
    pub fn validate(&self) -> Result<(), InvoicingError> {
        if self.name.trim().is_empty() {
            return Err(InvoicingError::validation("company.name", "company name is required"));
        }
        if self.slug.trim().is_empty() {
            return Err(InvoicingError::validation("company.slug", "company slug is required"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefix_rules() {
        assert!(InvoicePrefix::parse("INV").is_ok());
        assert!(InvoicePrefix::parse("ACME2024").is_ok());
        assert!(InvoicePrefix::parse("").is_err());
        assert!(InvoicePrefix::parse("ABCDEFGHIJK").is_err());
        assert!(InvoicePrefix::parse("IN-V").is_err());
        assert!(InvoicePrefix::parse("INV ").is_ok());
    }

    #[test]
    fn test_company_defaults() {
        let company = Company::new("Globex", "globex", Country::GB);
        assert_eq!(company.currency, Currency::GBP);
        assert_eq!(company.invoice_prefix.as_str(), "INV");
        assert_eq!(company.default_payment_terms, 30);
        assert_eq!(company.id, TenantId::from_slug("globex"));
    }

    #[test]
    fn test_prefix_deserialize_validates() {
        assert!(serde_json::from_str::<InvoicePrefix>("\"ACME\"").is_ok());
        assert!(serde_json::from_str::<InvoicePrefix>("\"A/B\"").is_err());
    }
}
