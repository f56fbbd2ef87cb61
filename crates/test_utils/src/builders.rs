//! Test Data Builders
//!
//! Provides builder patterns for constructing ledgers with sensible
//! defaults. Stats are derived from the entries a builder is given, so a
//! built ledger always satisfies the ledger invariants unless a test
//! deliberately breaks them afterwards.

use chrono::{Duration, NaiveDate};
use serde_json::Value;

use core_kernel::{ClientId, WeekNumber};
use domain_ledger::{
    AllStats, ClientRecord, ClientStat, CollectionDay, Entry, EntryStatus, Ledger, LoanStatus,
    MAX_WEEKS, WEEKLY_INSTALLMENT,
};

use crate::fixtures::TemporalFixtures;

/// Builder for one client record
#[derive(Debug, Clone)]
pub struct ClientBuilder {
    collection_day: CollectionDay,
    lend_date: NaiveDate,
    entries: Vec<Entry>,
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClientBuilder {
    /// Monday client lent on `TemporalFixtures::lend_date`, no entries
    pub fn new() -> Self {
        Self {
            collection_day: CollectionDay::Mon,
            lend_date: TemporalFixtures::lend_date(),
            entries: Vec::new(),
        }
    }

    pub fn on(mut self, day: CollectionDay) -> Self {
        self.collection_day = day;
        self
    }

    pub fn lent_on(mut self, date: NaiveDate) -> Self {
        self.lend_date = date;
        self
    }

    /// Appends one entry at the next week
    pub fn with_entry(mut self, amount: i64, date: NaiveDate, status: EntryStatus) -> Self {
        self.entries.push(Entry {
            amount,
            date,
            status,
        });
        self
    }

    /// Appends `weeks` standard paid entries, one week apart, ending the
    /// week before `TemporalFixtures::monday`
    pub fn with_paid_weeks(mut self, weeks: u32) -> Self {
        for i in 0..weeks {
            let weeks_back = i64::from(weeks - i);
            self.entries.push(Entry {
                amount: WEEKLY_INSTALLMENT,
                date: TemporalFixtures::monday() - Duration::weeks(weeks_back),
                status: EntryStatus::Paid,
            });
        }
        self
    }

    /// Builds the record with stats derived from the paid entries
    pub fn build(self, id: &ClientId) -> ClientRecord {
        let paid: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.status == EntryStatus::Paid)
            .collect();
        let weeks_paid = paid.len() as u32;

        let stat = ClientStat {
            client_name: id.to_string(),
            collection_day: self.collection_day,
            lend_date: self.lend_date,
            status: if weeks_paid >= MAX_WEEKS {
                LoanStatus::Closed
            } else {
                LoanStatus::Active
            },
            total_amount_paid: paid.iter().map(|e| e.amount).sum(),
            weeks_paid,
        };

        let mut record = ClientRecord::new(stat);
        let mut week = WeekNumber::FIRST;
        for entry in self.entries {
            record.collection.insert(week, entry);
            week = week.next();
        }
        record
    }
}

/// Builder for a whole ledger
#[derive(Debug, Clone, Default)]
pub struct LedgerBuilder {
    clients: Vec<ClientBuilder>,
}

impl LedgerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a client; ids are assigned `P1, P2, ...` in call order
    pub fn with_client(mut self, client: ClientBuilder) -> Self {
        self.clients.push(client);
        self
    }

    /// Builds a ledger whose `AllStats` agree with its clients
    pub fn build(self) -> Ledger {
        let mut ledger = Ledger::empty();
        for (i, client) in self.clients.into_iter().enumerate() {
            let id = ClientId::from_number(i as u32 + 1);
            let record = client.build(&id);
            ledger.clients.insert(id, record);
        }
        ledger.all_stats = recount(&ledger);
        ledger
    }

    /// Builds the ledger as a stored document
    pub fn build_document(self) -> Value {
        serde_json::to_value(self.build()).unwrap()
    }
}

/// Loan counters recomputed from client statuses
pub fn recount(ledger: &Ledger) -> AllStats {
    let mut stats = AllStats::default();
    for stat in ledger.clients.values().filter_map(|r| r.stat.as_ref()) {
        stats.total_loans += 1;
        match stat.status {
            LoanStatus::Active => stats.active_loans += 1,
            LoanStatus::Closed => stats.closed_loans += 1,
        }
    }
    stats
}
