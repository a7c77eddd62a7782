//! Tests for core_kernel error types and the country table

use core_kernel::error::CoreError;
use core_kernel::money::MoneyError;
use core_kernel::temporal::TemporalError;
use core_kernel::{currency_for_country, Country, Currency, PortError};

mod core_errors {
    use super::*;

    #[test]
    fn test_core_error_validation() {
        let error = CoreError::validation("Invalid input");

        match error {
            CoreError::Validation(msg) => assert_eq!(msg, "Invalid input"),
            _ => panic!("Expected Validation error"),
        }
    }

    #[test]
    fn test_core_error_from_money_error() {
        let core_error: CoreError = MoneyError::UnknownCurrency("XYZ".to_string()).into();
        assert!(matches!(core_error, CoreError::Money(_)));
        assert!(core_error.to_string().contains("XYZ"));
    }

    #[test]
    fn test_core_error_from_temporal_error() {
        let core_error: CoreError = TemporalError::InvalidTimezone("Bad/Zone".to_string()).into();
        assert!(matches!(core_error, CoreError::Temporal(_)));
    }

    #[test]
    fn test_unknown_country_is_validation_error() {
        let error = "QQ".parse::<Country>().unwrap_err();
        assert_eq!(error.to_string(), "Validation error: Unknown country code: QQ");
    }
}

mod port_errors {
    use super::*;

    #[test]
    fn test_conflict() {
        let error = PortError::conflict("sequence already registered");
        assert!(error.is_conflict());
        assert!(!error.is_not_found());
    }
}

mod countries {
    use super::*;

    #[test]
    fn test_table_has_twenty_seven_codes() {
        assert_eq!(Country::ALL.len(), 27);
    }

    #[test]
    fn test_default_currencies() {
        assert_eq!(currency_for_country("US"), Currency::USD);
        assert_eq!(currency_for_country("gb"), Currency::GBP);
        assert_eq!(currency_for_country("CH"), Currency::CHF);
        assert_eq!(currency_for_country("IN"), Currency::INR);
        assert_eq!(currency_for_country("ZA"), Currency::ZAR);
        assert_eq!(currency_for_country("NL"), Currency::EUR);
    }

    #[test]
    fn test_unknown_country_bills_in_usd() {
        assert_eq!(currency_for_country("XX"), Currency::USD);
        assert_eq!(currency_for_country(""), Currency::USD);
        assert!("XX".parse::<Country>().is_err());
    }

    #[test]
    fn test_default_country() {
        assert_eq!(Country::default(), Country::US);
        assert_eq!(Country::NZ.name(), "New Zealand");
    }
}
