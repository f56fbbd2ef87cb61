//! Unit tests for civil-time handling
//!
//! Tests cover Timezone, CivilDay, the clocks, and ISO date parsing.

use chrono::{NaiveDate, TimeZone, Utc, Weekday};
use core_kernel::temporal::{parse_iso_date, TemporalError};
use core_kernel::{CivilDay, Clock, FixedClock, SystemClock, Timezone};

mod timezone {
    use super::*;

    #[test]
    fn test_default_is_india() {
        assert_eq!(Timezone::default().name(), "Asia/Kolkata");
    }

    #[test]
    fn test_from_name_trims() {
        let tz = Timezone::from_name(" Europe/London ").unwrap();
        assert_eq!(tz.name(), "Europe/London");
    }

    #[test]
    fn test_offset_is_five_thirty() {
        // 18:29 UTC is 23:59 IST, 18:30 UTC is the next IST day
        let tz = Timezone::india();
        let before = Utc.with_ymd_and_hms(2024, 6, 3, 18, 29, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 6, 3, 18, 30, 0).unwrap();

        assert_eq!(tz.civil_day(before).date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(tz.civil_day(after).date, NaiveDate::from_ymd_opt(2024, 6, 4).unwrap());
        assert_eq!(tz.civil_day(after).weekday, Weekday::Tue);
    }

    #[test]
    fn test_serde_uses_iana_name() {
        let json = serde_json::to_string(&Timezone::india()).unwrap();
        assert_eq!(json, "\"Asia/Kolkata\"");

        let back: Timezone = serde_json::from_str(&json).unwrap();
        assert_eq!(back, Timezone::india());
        assert!(serde_json::from_str::<Timezone>("\"Not/AZone\"").is_err());
    }
}

mod civil_day {
    use super::*;

    #[test]
    fn test_from_date_derives_weekday() {
        let day = CivilDay::from_date(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap());
        assert_eq!(day.weekday, Weekday::Sun);
        assert_eq!(day.iso_date(), "2024-06-09");
    }

    #[test]
    fn test_iso_dates_sort_like_dates() {
        let mut dates = vec!["2024-10-01", "2024-09-30", "2025-01-02"];
        dates.sort();
        assert_eq!(dates, vec!["2024-09-30", "2024-10-01", "2025-01-02"]);
    }

    #[test]
    fn test_parse_iso_date() {
        assert_eq!(
            parse_iso_date("2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert_eq!(
            parse_iso_date("29/02/2024"),
            Err(TemporalError::InvalidDate("29/02/2024".to_string()))
        );
    }
}

mod clocks {
    use super::*;

    #[test]
    fn test_fixed_clock_set() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 4, 0, 0).unwrap());
        assert_eq!(clock.today(&Timezone::india()).weekday, Weekday::Mon);

        clock.set(Utc.with_ymd_and_hms(2024, 6, 7, 4, 0, 0).unwrap());
        assert_eq!(clock.today(&Timezone::india()).weekday, Weekday::Fri);
    }

    #[test]
    fn test_system_clock_moves_forward() {
        let clock = SystemClock;
        let first = clock.now();
        let second = clock.now();
        assert!(second >= first);
    }
}
