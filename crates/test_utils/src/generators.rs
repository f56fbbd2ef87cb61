//! Property-Based Test Generators
//!
//! Provides proptest strategies for ledger inputs and for random sequences
//! of ledger operations, plus a driver that applies such a sequence to a
//! `Ledger` the way the service would, one day at a time.

use chrono::Duration;
use proptest::prelude::*;
use proptest::sample::Index;

use core_kernel::CivilDay;
use domain_ledger::poster::post_entry;
use domain_ledger::registrar::register_client;
use domain_ledger::sweeper::sweep;
use domain_ledger::undo::undo_last_batch;
use domain_ledger::{CollectionDay, EntryStatus, Ledger, NewClient, NewEntry};

use crate::fixtures::TemporalFixtures;

/// Strategy for collection days
pub fn collection_day_strategy() -> impl Strategy<Value = CollectionDay> {
    prop::sample::select(CollectionDay::ALL.to_vec())
}

/// Strategy for entry statuses
pub fn entry_status_strategy() -> impl Strategy<Value = EntryStatus> {
    prop_oneof![Just(EntryStatus::Paid), Just(EntryStatus::Pending)]
}

/// Strategy for positive posting amounts
pub fn amount_strategy() -> impl Strategy<Value = i64> {
    prop_oneof![Just(600i64), 1i64..2_000i64]
}

/// One step of a simulated agent's week
#[derive(Debug, Clone)]
pub enum LedgerOp {
    /// Register a client collected on `day`
    Register(CollectionDay),
    /// Post an entry dated today against an existing client
    Post {
        client: Index,
        amount: i64,
        status: EntryStatus,
    },
    /// Move the calendar forward
    Advance(u8),
    /// Run the sweep for today
    Sweep,
    /// Revert the latest sweep
    Undo,
}

/// Strategy for a single operation, postings included
pub fn ledger_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        2 => collection_day_strategy().prop_map(LedgerOp::Register),
        3 => (any::<Index>(), amount_strategy(), entry_status_strategy())
            .prop_map(|(client, amount, status)| LedgerOp::Post { client, amount, status }),
        3 => (1u8..=3).prop_map(LedgerOp::Advance),
        3 => Just(LedgerOp::Sweep),
        2 => Just(LedgerOp::Undo),
    ]
}

/// Strategy for a single operation without direct postings
pub fn sweep_only_op_strategy() -> impl Strategy<Value = LedgerOp> {
    prop_oneof![
        1 => collection_day_strategy().prop_map(LedgerOp::Register),
        3 => (1u8..=3).prop_map(LedgerOp::Advance),
        3 => Just(LedgerOp::Sweep),
        2 => Just(LedgerOp::Undo),
    ]
}

/// Strategy for sequences of operations
pub fn ledger_ops_strategy(max_len: usize) -> impl Strategy<Value = Vec<LedgerOp>> {
    prop::collection::vec(ledger_op_strategy(), 0..max_len)
}

/// Drives a ledger through operations on a calendar that only moves forward
#[derive(Debug, Clone)]
pub struct Simulation {
    pub ledger: Ledger,
    day_offset: i64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Empty ledger, calendar on `TemporalFixtures::monday`
    pub fn new() -> Self {
        Self {
            ledger: Ledger::empty(),
            day_offset: 0,
        }
    }

    pub fn today(&self) -> CivilDay {
        TemporalFixtures::civil_day(self.day_offset)
    }

    /// Applies one operation; rejected postings must leave the ledger as it was
    pub fn apply(&mut self, op: &LedgerOp) {
        let today = self.today();
        match op {
            LedgerOp::Register(day) => {
                register_client(
                    &mut self.ledger,
                    &NewClient {
                        lend_date: today.date - Duration::days(7),
                        collection_day: *day,
                    },
                );
            }
            LedgerOp::Post {
                client,
                amount,
                status,
            } => {
                if self.ledger.clients.is_empty() {
                    return;
                }
                let ids: Vec<_> = self.ledger.clients.keys().cloned().collect();
                let id = &ids[client.index(ids.len())];
                let before = self.ledger.clone();
                let entry = NewEntry {
                    amount: *amount,
                    date: today.date,
                    status: *status,
                };
                if post_entry(&mut self.ledger, id, &entry).is_err() {
                    assert_eq!(self.ledger, before, "Rejected posting modified the ledger");
                }
            }
            LedgerOp::Advance(days) => self.day_offset += i64::from(*days),
            LedgerOp::Sweep => {
                sweep(&mut self.ledger, today);
            }
            LedgerOp::Undo => {
                undo_last_batch(&mut self.ledger);
            }
        }
    }

    pub fn run(ops: &[LedgerOp]) -> Self {
        let mut simulation = Self::new();
        for op in ops {
            simulation.apply(op);
        }
        simulation
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_then_sweep_on_collection_day() {
        let simulation = Simulation::run(&[
            LedgerOp::Register(CollectionDay::Mon),
            LedgerOp::Sweep,
        ]);

        let record = simulation.ledger.clients.values().next().unwrap();
        let stat = record.stat.as_ref().unwrap();
        assert_eq!(stat.lend_date, simulation.today().date - Duration::days(7));
        assert_eq!(stat.weeks_paid, 1);
        assert!(simulation.ledger.batches.contains_key(&simulation.today().date));
    }
}
