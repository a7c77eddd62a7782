//! Country table and the default currency of each country

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::CoreError;
use crate::money::Currency;

/// Countries a tenant can register in (ISO 3166-1 alpha-2)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Country {
    #[default]
    US,
    CA,
    GB,
    AU,
    DE,
    FR,
    IT,
    ES,
    NL,
    BE,
    CH,
    AT,
    SE,
    NO,
    DK,
    FI,
    IE,
    PT,
    IN,
    SG,
    HK,
    JP,
    CN,
    BR,
    MX,
    NZ,
    ZA,
}

impl Country {
    pub const ALL: [Country; 27] = [
        Country::US,
        Country::CA,
        Country::GB,
        Country::AU,
        Country::DE,
        Country::FR,
        Country::IT,
        Country::ES,
        Country::NL,
        Country::BE,
        Country::CH,
        Country::AT,
        Country::SE,
        Country::NO,
        Country::DK,
        Country::FI,
        Country::IE,
        Country::PT,
        Country::IN,
        Country::SG,
        Country::HK,
        Country::JP,
        Country::CN,
        Country::BR,
        Country::MX,
        Country::NZ,
        Country::ZA,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            Country::US => "US",
            Country::CA => "CA",
            Country::GB => "GB",
            Country::AU => "AU",
            Country::DE => "DE",
            Country::FR => "FR",
            Country::IT => "IT",
            Country::ES => "ES",
            Country::NL => "NL",
            Country::BE => "BE",
            Country::CH => "CH",
            Country::AT => "AT",
            Country::SE => "SE",
            Country::NO => "NO",
            Country::DK => "DK",
            Country::FI => "FI",
            Country::IE => "IE",
            Country::PT => "PT",
            Country::IN => "IN",
            Country::SG => "SG",
            Country::HK => "HK",
            Country::JP => "JP",
            Country::CN => "CN",
            Country::BR => "BR",
            Country::MX => "MX",
            Country::NZ => "NZ",
            Country::ZA => "ZA",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Country::US => "United States",
            Country::CA => "Canada",
            Country::GB => "United Kingdom",
            Country::AU => "Australia",
            Country::DE => "Germany",
            Country::FR => "France",
            Country::IT => "Italy",
            Country::ES => "Spain",
            Country::NL => "Netherlands",
            Country::BE => "Belgium",
            Country::CH => "Switzerland",
            Country::AT => "Austria",
            Country::SE => "Sweden",
            Country::NO => "Norway",
            Country::DK => "Denmark",
            Country::FI => "Finland",
            Country::IE => "Ireland",
            Country::PT => "Portugal",
            Country::IN => "India",
            Country::SG => "Singapore",
            Country::HK => "Hong Kong",
            Country::JP => "Japan",
            Country::CN => "China",
            Country::BR => "Brazil",
            Country::MX => "Mexico",
            Country::NZ => "New Zealand",
            Country::ZA => "South Africa",
        }
    }

    /// Currency a newly registered tenant in this country bills in
    pub fn default_currency(&self) -> Currency {
        match self {
            Country::US => Currency::USD,
            Country::CA => Currency::CAD,
            Country::GB => Currency::GBP,
            Country::AU => Currency::AUD,
            Country::DE
            | Country::FR
            | Country::IT
            | Country::ES
            | Country::NL
            | Country::BE
            | Country::AT
            | Country::FI
            | Country::IE
            | Country::PT => Currency::EUR,
            Country::CH => Currency::CHF,
            Country::SE => Currency::SEK,
            Country::NO => Currency::NOK,
            Country::DK => Currency::DKK,
            Country::IN => Currency::INR,
            Country::SG => Currency::SGD,
            Country::HK => Currency::HKD,
            Country::JP => Currency::JPY,
            Country::CN => Currency::CNY,
            Country::BR => Currency::BRL,
            Country::MX => Currency::MXN,
            Country::NZ => Currency::NZD,
            Country::ZA => Currency::ZAR,
        }
    }
}

impl fmt::Display for Country {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for Country {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let code = s.trim();
        Country::ALL
            .iter()
            .copied()
            .find(|c| c.code().eq_ignore_ascii_case(code))
            .ok_or_else(|| CoreError::validation(format!("Unknown country code: {}", s)))
    }
}

/// Default currency for a country code; unknown codes bill in USD
pub fn currency_for_country(code: &str) -> Currency {
    code.parse::<Country>()
        .map(|c| c.default_currency())
        .unwrap_or(Currency::USD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eurozone_defaults() {
        for country in [Country::DE, Country::FR, Country::IE, Country::PT] {
            assert_eq!(country.default_currency(), Currency::EUR);
        }
    }

    #[test]
    fn test_currency_for_unknown_country() {
        assert_eq!(currency_for_country("jp"), Currency::JPY);
        assert_eq!(currency_for_country("ZZ"), Currency::USD);
    }
}
