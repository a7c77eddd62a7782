//! CLI configuration
//!
//! Settings come from, in increasing priority: built-in defaults, an
//! optional `invoicer.toml`, and `INVOICER_*` environment variables. Nested
//! keys use a double underscore, so `INVOICER_COMPANY__NAME` sets
//! `company.name`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::Deserialize;

use core_kernel::{Country, Currency, Percentage, Timezone};
use domain_invoicing::tenant::DEFAULT_PAYMENT_TERMS_DAYS;
use domain_invoicing::{Company, InvoicePrefix};

use crate::error::CliError;

/// Tenant profile as written in configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CompanySettings {
    pub name: String,
    pub slug: String,
    /// ISO 3166 alpha-2 code
    pub country: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub website: Option<String>,
    /// Defaults to the country's currency
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub invoice_prefix: Option<String>,
    /// Percent, e.g. `8.25`
    #[serde(default)]
    pub default_tax_rate: Option<String>,
    #[serde(default)]
    pub default_payment_terms: Option<u32>,
    /// IANA name, e.g. `Europe/London`
    #[serde(default)]
    pub timezone: Option<String>,
}

impl CompanySettings {
    /// Builds and validates the tenant these settings describe
    pub fn to_company(&self) -> Result<Company, CliError> {
        let country = Country::from_str(&self.country)?;
        let mut company = Company::new(self.name.trim(), self.slug.trim(), country)
            .with_address(self.address.as_str())
            .with_email(self.email.as_str())
            .with_payment_terms(self.default_payment_terms.unwrap_or(DEFAULT_PAYMENT_TERMS_DAYS));

        if let Some(phone) = non_blank(&self.phone) {
            company = company.with_phone(phone);
        }
        if let Some(website) = non_blank(&self.website) {
            company = company.with_website(website);
        }
        if let Some(code) = non_blank(&self.currency) {
            let currency = Currency::from_str(code)
                .map_err(|e| CliError::Config(format!("company.currency: {}", e)))?;
            company = company.with_currency(currency);
        }
        if let Some(prefix) = non_blank(&self.invoice_prefix) {
            company = company.with_prefix(InvoicePrefix::parse(prefix)?);
        }
        if let Some(rate) = non_blank(&self.default_tax_rate) {
            let value = Decimal::from_str(rate)
                .map_err(|e| CliError::Config(format!("company.default_tax_rate: {}", e)))?;
            let rate = Percentage::new(value)
                .map_err(|e| CliError::Config(format!("company.default_tax_rate: {}", e)))?;
            company = company.with_default_tax_rate(rate);
        }
        if let Some(name) = non_blank(&self.timezone) {
            let timezone = Timezone::parse(name)
                .map_err(|e| CliError::Config(format!("company.timezone: {}", e)))?;
            company = company.with_timezone(timezone);
        }

        company.validate()?;
        Ok(company)
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

/// Configuration of the `invoicer` binary
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Log level used when `RUST_LOG` is not set
    pub log_level: String,
    /// Where generated PDFs are written
    pub output_dir: PathBuf,
    /// Where counters and client directories are kept
    pub data_dir: PathBuf,
    /// PostgreSQL counter store; file store when absent
    #[serde(default)]
    pub database_url: Option<String>,
    pub company: CompanySettings,
}

impl AppConfig {
    /// Loads configuration
    ///
    /// Without `file`, `invoicer.toml` in the working directory is used if
    /// present. An explicit `file` must exist.
    pub fn load(file: Option<&Path>) -> Result<Self, CliError> {
        let file_source = match file {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("invoicer").required(false),
        };

        let config: AppConfig = config::Config::builder()
            .set_default("log_level", "info")?
            .set_default("output_dir", "invoices")?
            .set_default("data_dir", "data")?
            .set_default("company.name", "My Company")?
            .set_default("company.slug", "default")?
            .set_default("company.country", "US")?
            .add_source(file_source)
            .add_source(
                config::Environment::with_prefix("INVOICER")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// File holding the per-tenant counters when no database is configured
    pub fn counters_path(&self) -> PathBuf {
        self.data_dir.join("counters.json")
    }

    /// Database URL, ignoring a blank setting
    pub fn database_url(&self) -> Option<&str> {
        non_blank(&self.database_url)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn settings() -> CompanySettings {
        CompanySettings {
            name: "Initech".to_string(),
            slug: "initech".to_string(),
            country: "gb".to_string(),
            address: "1 Office Park".to_string(),
            email: "billing@initech.test".to_string(),
            phone: Some("  ".to_string()),
            website: None,
            currency: None,
            invoice_prefix: Some("BILL".to_string()),
            default_tax_rate: Some("20".to_string()),
            default_payment_terms: None,
            timezone: Some("Europe/London".to_string()),
        }
    }

    #[test]
    fn test_settings_build_company() {
        let company = settings().to_company().unwrap();
        assert_eq!(company.country, Country::GB);
        assert_eq!(company.currency, Currency::GBP);
        assert_eq!(company.invoice_prefix.as_str(), "BILL");
        assert_eq!(company.default_tax_rate.value(), dec!(20));
        assert_eq!(company.default_payment_terms, DEFAULT_PAYMENT_TERMS_DAYS);
        assert_eq!(company.timezone.name(), "Europe/London");
        assert!(company.phone.is_none());
    }

    #[test]
    fn test_settings_reject_bad_values() {
        let mut bad_country = settings();
        bad_country.country = "XX".to_string();
        assert!(bad_country.to_company().is_err());

        let mut bad_rate = settings();
        bad_rate.default_tax_rate = Some("150".to_string());
        assert!(matches!(bad_rate.to_company(), Err(CliError::Config(_))));

        let mut bad_zone = settings();
        bad_zone.timezone = Some("Mars/Olympus".to_string());
        assert!(matches!(bad_zone.to_company(), Err(CliError::Config(_))));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invoicer.toml");
        std::fs::write(
            &path,
            r#"
log_level = "debug"
output_dir = "out"
data_dir = "state"

[company]
name = "Globex"
slug = "globex"
country = "US"
email = "ar@globex.test"
"#,
        )
        .unwrap();

        let config = AppConfig::load(Some(&path)).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.counters_path(), PathBuf::from("state").join("counters.json"));
        assert!(config.database_url().is_none());
        assert_eq!(config.company.to_company().unwrap().name, "Globex");
    }

    #[test]
    fn test_explicit_file_must_exist() {
        let dir = tempfile::tempdir().unwrap();
        assert!(AppConfig::load(Some(&dir.path().join("missing.toml"))).is_err());
    }
}
