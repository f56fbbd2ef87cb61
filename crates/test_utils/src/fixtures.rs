//! Pre-built Test Fixtures
//!
//! Provides ready-to-use dates, clocks, ids and documents. All dates are
//! anchored on Monday 2024-06-03 so weekday-sensitive tests are predictable.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde_json::{json, Value};
use std::sync::Arc;

use core_kernel::{CivilDay, ClientId, FixedClock, Timezone, UserId};
use domain_ledger::ports::memory::InMemoryDocumentStore;
use domain_ledger::repair::repair;
use domain_ledger::{DocumentPath, LedgerService};

/// Fixture for calendar data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Monday 2024-06-03
    pub fn monday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
    }

    /// Lend date one week before `monday`
    pub fn lend_date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, 27).unwrap()
    }

    /// `monday` shifted by `days`
    pub fn day(days: i64) -> NaiveDate {
        Self::monday() + Duration::days(days)
    }

    /// `day(days)` as a civil day
    pub fn civil_day(days: i64) -> CivilDay {
        CivilDay::from_date(Self::day(days))
    }

    /// 10:00 on `monday` in Kolkata, as UTC
    pub fn monday_morning_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 3, 4, 30, 0).unwrap()
    }

    /// 23:00 UTC on Sunday 2024-06-02, already Monday in Kolkata
    pub fn sunday_night_utc() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 2, 23, 0, 0).unwrap()
    }
}

/// Fixture for clocks
pub struct ClockFixtures;

impl ClockFixtures {
    /// A clock stopped on Monday morning, Kolkata time
    pub fn monday() -> Arc<FixedClock> {
        Arc::new(FixedClock::new(TemporalFixtures::monday_morning_utc()))
    }
}

/// Fixture for identifiers
pub struct IdFixtures;

impl IdFixtures {
    pub fn user() -> UserId {
        UserId::parse("agent1").unwrap()
    }

    pub fn other_user() -> UserId {
        UserId::parse("agent2").unwrap()
    }

    pub fn client(n: u32) -> ClientId {
        ClientId::from_number(n)
    }

    pub fn email() -> &'static str {
        "ravi.kumar@example.com"
    }
}

/// Fixture for stored documents
pub struct DocumentFixtures;

impl DocumentFixtures {
    /// A freshly initialized ledger with no clients
    pub fn empty_ledger() -> Value {
        repair(None)
    }

    /// A login-details record pointing at `user`
    pub fn login(user: &UserId) -> Value {
        json!({ "userName": user.as_str(), "email": IdFixtures::email() })
    }
}

/// An in-memory store, a service over it and the clock driving it
pub struct ServiceFixture {
    pub store: Arc<InMemoryDocumentStore>,
    pub clock: Arc<FixedClock>,
    pub service: LedgerService,
}

impl ServiceFixture {
    /// Empty store, clock on Monday morning
    pub fn new() -> Self {
        let store = Arc::new(InMemoryDocumentStore::new());
        let clock = ClockFixtures::monday();
        let service = LedgerService::new(store.clone(), clock.clone(), Timezone::india());
        Self {
            store,
            clock,
            service,
        }
    }

    /// Store seeded with an empty ledger for `IdFixtures::user()`
    pub async fn with_empty_ledger() -> Self {
        let fixture = Self::new();
        fixture
            .store
            .put(&DocumentPath::user(&IdFixtures::user()), DocumentFixtures::empty_ledger())
            .await;
        fixture
    }

    /// Current stored document of `user`
    pub async fn document(&self, user: &UserId) -> Option<Value> {
        use domain_ledger::DocumentStore;
        self.store.read(&DocumentPath::user(user)).await.unwrap()
    }
}

impl Default for ServiceFixture {
    fn default() -> Self {
        Self::new()
    }
}
