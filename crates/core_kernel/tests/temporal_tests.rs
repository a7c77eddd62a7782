//! Tests for clocks and tenant timezones

use chrono::{NaiveDate, TimeZone, Utc};
use core_kernel::{Clock, FixedClock, SystemClock, TemporalError, Timezone};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_on_date() {
        let clock = FixedClock::on(date(2024, 2, 29));
        assert_eq!(clock.today(Timezone::default()), date(2024, 2, 29));
    }

    #[test]
    fn test_fixed_clock_in_western_timezone() {
        // 02:00 UTC is still the previous evening in Los Angeles
        let clock = FixedClock(Utc.with_ymd_and_hms(2024, 6, 15, 2, 0, 0).unwrap());
        let la = Timezone::parse("America/Los_Angeles").unwrap();
        assert_eq!(clock.today(la), date(2024, 6, 14));
    }

    #[test]
    fn test_system_clock_advances() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}

mod timezones {
    use super::*;

    #[test]
    fn test_default_is_utc() {
        assert_eq!(Timezone::default().name(), "UTC");
    }

    #[test]
    fn test_parse_trims_whitespace() {
        let tz = Timezone::parse(" Europe/Berlin ").unwrap();
        assert_eq!(tz.name(), "Europe/Berlin");
    }

    #[test]
    fn test_parse_rejects_unknown_zone() {
        let err = Timezone::parse("Nowhere/City").unwrap_err();
        assert_eq!(err, TemporalError::InvalidTimezone("Nowhere/City".to_string()));
        assert!(err.to_string().contains("Nowhere/City"));
    }

    #[test]
    fn test_deserialize_rejects_unknown_zone() {
        assert!(serde_json::from_str::<Timezone>("\"Atlantis/Capital\"").is_err());
    }
}
