//! Civil-time handling
//!
//! Collection days are civil-calendar weekdays in the agent's reporting
//! timezone, not UTC. This module provides:
//! - `Timezone`: a serializable IANA zone wrapper
//! - `Clock`: the injectable source of "now" (system or fixed)
//! - `CivilDay`: the local date and weekday derived from a clock and zone

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::str::FromStr;
use std::sync::RwLock;
use thiserror::Error;

/// Timezone wrapper for the reporting jurisdiction
///
/// Wraps chrono_tz::Tz with custom serialization support.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timezone(pub Tz);

impl Serialize for Timezone {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.0.name())
    }
}

impl<'de> Deserialize<'de> for Timezone {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Timezone::from_name(&s).map_err(serde::de::Error::custom)
    }
}

impl Timezone {
    pub fn new(tz: Tz) -> Self {
        Self(tz)
    }

    /// Parses an IANA zone name such as `Asia/Kolkata`
    pub fn from_name(name: &str) -> Result<Self, TemporalError> {
        Tz::from_str(name.trim())
            .map(Timezone)
            .map_err(|_| TemporalError::UnknownTimezone(name.to_string()))
    }

    /// India Standard Time (UTC+5:30), the reference deployment zone
    pub fn india() -> Self {
        Self(chrono_tz::Asia::Kolkata)
    }

    /// Converts a UTC datetime to the local timezone
    pub fn to_local(&self, utc: DateTime<Utc>) -> DateTime<Tz> {
        utc.with_timezone(&self.0)
    }

    /// Returns the civil date and weekday of `utc` in this timezone
    pub fn civil_day(&self, utc: DateTime<Utc>) -> CivilDay {
        let local = self.to_local(utc);
        CivilDay {
            date: local.date_naive(),
            weekday: local.weekday(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.0.name()
    }
}

impl Default for Timezone {
    fn default() -> Self {
        Self::india()
    }
}

/// Errors related to temporal operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TemporalError {
    #[error("Unknown timezone: {0}")]
    UnknownTimezone(String),

    #[error("Invalid date '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),
}

/// A calendar day as observed in a particular timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CivilDay {
    pub date: NaiveDate,
    pub weekday: Weekday,
}

impl CivilDay {
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            date,
            weekday: date.weekday(),
        }
    }

    /// ISO `YYYY-MM-DD` rendering, which sorts lexicographically by date
    pub fn iso_date(&self) -> String {
        self.date.format("%Y-%m-%d").to_string()
    }
}

/// Parses an ISO `YYYY-MM-DD` date
pub fn parse_iso_date(value: &str) -> Result<NaiveDate, TemporalError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| TemporalError::InvalidDate(value.to_string()))
}

/// Source of the current instant
///
/// Injected wherever "today" matters so tests can pin the calendar.
pub trait Clock: Send + Sync + 'static {
    fn now(&self) -> DateTime<Utc>;

    /// The civil day of `now()` in the given timezone
    fn today(&self, timezone: &Timezone) -> CivilDay {
        timezone.civil_day(self.now())
    }
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock frozen at a settable instant
#[derive(Debug)]
pub struct FixedClock {
    instant: RwLock<DateTime<Utc>>,
}

impl FixedClock {
    pub fn new(instant: DateTime<Utc>) -> Self {
        Self {
            instant: RwLock::new(instant),
        }
    }

    /// Moves the clock to a new instant
    pub fn set(&self, instant: DateTime<Utc>) {
        let mut guard = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *guard = instant;
    }

    /// Advances the clock by whole days
    pub fn advance_days(&self, days: i64) {
        let mut guard = self.instant.write().unwrap_or_else(|e| e.into_inner());
        *guard += chrono::Duration::days(days);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.instant.read().unwrap_or_else(|e| e.into_inner())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_civil_day_crosses_midnight_ahead_of_utc() {
        // 20:00 UTC on Sunday is 01:30 Monday in Kolkata
        let utc = Utc.with_ymd_and_hms(2024, 6, 2, 20, 0, 0).unwrap();
        let day = Timezone::india().civil_day(utc);

        assert_eq!(day.date, NaiveDate::from_ymd_opt(2024, 6, 3).unwrap());
        assert_eq!(day.weekday, Weekday::Mon);
    }

    #[test]
    fn test_unknown_timezone() {
        let result = Timezone::from_name("Mars/Olympus");
        assert_eq!(
            result,
            Err(TemporalError::UnknownTimezone("Mars/Olympus".to_string()))
        );
    }

    #[test]
    fn test_fixed_clock_advance() {
        let clock = FixedClock::new(Utc.with_ymd_and_hms(2024, 6, 3, 6, 0, 0).unwrap());
        clock.advance_days(1);
        let day = clock.today(&Timezone::india());
        assert_eq!(day.weekday, Weekday::Tue);
    }
}
