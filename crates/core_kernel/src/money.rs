//! Currency codes, monetary rounding and amount formatting
//!
//! All invoice arithmetic is done on `rust_decimal::Decimal`. Every derived
//! amount is rounded to two decimal places with round-half-to-even, which is
//! the quantization used by the legacy invoicing data.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Symbol used when a currency code is not in the table
pub const DEFAULT_SYMBOL: &str = "$";

/// Number of decimal places carried by every monetary amount
pub const MONEY_DP: u32 = 2;

/// Currency codes following ISO 4217
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Currency {
    USD,
    EUR,
    GBP,
    CAD,
    AUD,
    CHF,
    SEK,
    NOK,
    DKK,
    JPY,
    CNY,
    INR,
    SGD,
    HKD,
    BRL,
    MXN,
    NZD,
    ZAR,
}

impl Currency {
    /// Every supported currency, in display order
    pub const ALL: [Currency; 18] = [
        Currency::USD,
        Currency::EUR,
        Currency::GBP,
        Currency::CAD,
        Currency::AUD,
        Currency::CHF,
        Currency::SEK,
        Currency::NOK,
        Currency::DKK,
        Currency::JPY,
        Currency::CNY,
        Currency::INR,
        Currency::SGD,
        Currency::HKD,
        Currency::BRL,
        Currency::MXN,
        Currency::NZD,
        Currency::ZAR,
    ];

    /// Returns the currency symbol
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::USD => "$",
            Currency::EUR => "€",
            Currency::GBP => "£",
            Currency::CAD => "C$",
            Currency::AUD => "A$",
            Currency::CHF => "CHF",
            Currency::SEK | Currency::NOK | Currency::DKK => "kr",
            Currency::JPY | Currency::CNY => "¥",
            Currency::INR => "₹",
            Currency::SGD => "S$",
            Currency::HKD => "HK$",
            Currency::BRL => "R$",
            Currency::MXN => "$",
            Currency::NZD => "NZ$",
            Currency::ZAR => "R",
        }
    }

    /// Returns the ISO 4217 code
    pub fn code(&self) -> &'static str {
        match self {
            Currency::USD => "USD",
            Currency::EUR => "EUR",
            Currency::GBP => "GBP",
            Currency::CAD => "CAD",
            Currency::AUD => "AUD",
            Currency::CHF => "CHF",
            Currency::SEK => "SEK",
            Currency::NOK => "NOK",
            Currency::DKK => "DKK",
            Currency::JPY => "JPY",
            Currency::CNY => "CNY",
            Currency::INR => "INR",
            Currency::SGD => "SGD",
            Currency::HKD => "HKD",
            Currency::BRL => "BRL",
            Currency::MXN => "MXN",
            Currency::NZD => "NZD",
            Currency::ZAR => "ZAR",
        }
    }

    /// Returns the English display name
    pub fn name(&self) -> &'static str {
        match self {
            Currency::USD => "US Dollar",
            Currency::EUR => "Euro",
            Currency::GBP => "British Pound",
            Currency::CAD => "Canadian Dollar",
            Currency::AUD => "Australian Dollar",
            Currency::CHF => "Swiss Franc",
            Currency::SEK => "Swedish Krona",
            Currency::NOK => "Norwegian Krone",
            Currency::DKK => "Danish Krone",
            Currency::JPY => "Japanese Yen",
            Currency::CNY => "Chinese Yuan",
            Currency::INR => "Indian Rupee",
            Currency::SGD => "Singapore Dollar",
            Currency::HKD => "Hong Kong Dollar",
            Currency::BRL => "Brazilian Real",
            Currency::MXN => "Mexican Peso",
            Currency::NZD => "New Zealand Dollar",
            Currency::ZAR => "South African Rand",
        }
    }

    /// Looks up a currency by code, ignoring case and surrounding whitespace
    pub fn from_code(code: &str) -> Option<Currency> {
        let code = code.trim();
        Self::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Currency {
    type Err = MoneyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Currency::from_code(s).ok_or_else(|| MoneyError::UnknownCurrency(s.to_string()))
    }
}

/// Resolves the display symbol for a currency code, falling back to `$`
pub fn symbol_for_code(code: &str) -> &'static str {
    Currency::from_code(code)
        .map(|c| c.symbol())
        .unwrap_or(DEFAULT_SYMBOL)
}

/// Errors that can occur during money operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    #[error("Unknown currency code: {0}")]
    UnknownCurrency(String),

    #[error("Percentage out of range (0-100): {0}")]
    PercentageOutOfRange(Decimal),

    #[error("Invalid amount: {0}")]
    InvalidAmount(String),
}

/// Rounds an amount to two decimal places, half to even
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp(MONEY_DP)
}

/// Formats an amount as `{symbol}{amount}` with thousands separators and
/// exactly two decimals, e.g. `$1,234.50`
///
/// Negative amounts keep the sign after the symbol (`$-5.00`).
pub fn format_amount(symbol: &str, amount: Decimal) -> String {
    let rounded = round_money(amount);
    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    let fixed = format!("{:.2}", rounded.abs());
    let (int_part, frac_part) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    format!("{}{}{}.{}", symbol, sign, group_thousands(int_part), frac_part)
}

/// Inserts `,` between every group of three integer digits
fn group_thousands(digits: &str) -> String {
    let len = digits.len();
    let mut out = String::with_capacity(len + len / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (len - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

/// A percentage in the range 0-100 (e.g. 8.25 for a rate of 8.25%)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Decimal", into = "Decimal")]
pub struct Percentage {
    value: Decimal,
}

impl Percentage {
    /// Creates a percentage, rejecting values outside 0-100
    pub fn new(value: Decimal) -> Result<Self, MoneyError> {
        if value < Decimal::ZERO || value > dec!(100) {
            return Err(MoneyError::PercentageOutOfRange(value));
        }
        Ok(Self { value })
    }

    /// The zero percentage
    pub fn zero() -> Self {
        Self { value: Decimal::ZERO }
    }

    /// Returns the percentage value (5 for 5%)
    pub fn value(&self) -> Decimal {
        self.value
    }

    pub fn is_zero(&self) -> bool {
        self.value.is_zero()
    }

    /// Returns `amount * value / 100`, rounded to two decimals
    pub fn portion_of(&self, amount: Decimal) -> Decimal {
        round_money(amount * self.value / dec!(100))
    }
}

impl Default for Percentage {
    fn default() -> Self {
        Self::zero()
    }
}

impl TryFrom<Decimal> for Percentage {
    type Error = MoneyError;

    fn try_from(value: Decimal) -> Result<Self, Self::Error> {
        Percentage::new(value)
    }
}

impl From<Percentage> for Decimal {
    fn from(p: Percentage) -> Decimal {
        p.value
    }
}

impl fmt::Display for Percentage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.value.normalize())
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn formatted_amount_has_two_decimals(minor in -1_000_000_000i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 2);
            let formatted = format_amount("$", amount);
            let (_, frac) = formatted.rsplit_once('.').unwrap();
            prop_assert_eq!(frac.len(), 2);
            prop_assert!(formatted.starts_with('$'));
        }

        #[test]
        fn formatted_amount_parses_back(minor in 0i64..1_000_000_000i64) {
            let amount = Decimal::new(minor, 2);
            let formatted = format_amount("$", amount);
            let digits: String = formatted.trim_start_matches('$').replace(',', "");
            prop_assert_eq!(Decimal::from_str(&digits).unwrap(), amount);
        }
    }
}
