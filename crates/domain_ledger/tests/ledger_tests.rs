//! Scenario and property tests for the ledger operations

use chrono::NaiveDate;
use proptest::prelude::*;

use core_kernel::{ClientId, WeekNumber};

use domain_ledger::poster::post_entry;
use domain_ledger::registrar::register_client;
use domain_ledger::sweeper::sweep;
use domain_ledger::undo::undo_last_batch;
use domain_ledger::{
    AllStats, BatchAction, CollectionDay, EntryStatus, Ledger, LedgerError, LoanStatus,
    NewClient, NewEntry, ReceiptLine, MAX_WEEKS, WEEKLY_INSTALLMENT,
};

use test_utils::{
    assert_ledger_invariants, assert_totals_match_entries, assert_weeks_dense,
    ledger_ops_strategy, sweep_only_op_strategy, ClientBuilder, IdFixtures, LedgerBuilder,
    Simulation, TemporalFixtures,
};

fn stats(total: u32, active: u32, closed: u32) -> AllStats {
    AllStats {
        total_loans: total,
        active_loans: active,
        closed_loans: closed,
    }
}

fn paid_entry(date: NaiveDate) -> NewEntry {
    NewEntry {
        amount: WEEKLY_INSTALLMENT,
        date,
        status: EntryStatus::Paid,
    }
}

// ============================================================================
// Registration
// ============================================================================

mod registration_tests {
    use super::*;

    #[test]
    fn test_register_on_empty_ledger() {
        let mut ledger = LedgerBuilder::new().build();

        let id = register_client(
            &mut ledger,
            &NewClient {
                lend_date: TemporalFixtures::lend_date(),
                collection_day: CollectionDay::Mon,
            },
        );

        assert_eq!(id, IdFixtures::client(1));
        assert_eq!(ledger.clients[&id].stat.as_ref().unwrap().status, LoanStatus::Active);
        assert_eq!(ledger.all_stats, stats(1, 1, 0));
        assert_ledger_invariants(&ledger);
    }

    #[test]
    fn test_register_after_existing_clients() {
        let mut ledger = LedgerBuilder::new()
            .with_client(ClientBuilder::new())
            .with_client(ClientBuilder::new().with_paid_weeks(MAX_WEEKS))
            .build();

        let id = register_client(
            &mut ledger,
            &NewClient {
                lend_date: TemporalFixtures::monday(),
                collection_day: CollectionDay::Fri,
            },
        );

        assert_eq!(id, IdFixtures::client(3));
        assert_eq!(ledger.all_stats, stats(3, 2, 1));
    }
}

// ============================================================================
// Posting
// ============================================================================

mod posting_tests {
    use super::*;

    #[test]
    fn test_twentieth_paid_entry_closes_loan() {
        let mut ledger = LedgerBuilder::new()
            .with_client(ClientBuilder::new().with_paid_weeks(MAX_WEEKS - 1))
            .build();
        let id = IdFixtures::client(1);

        let posted = post_entry(&mut ledger, &id, &paid_entry(TemporalFixtures::monday())).unwrap();

        assert!(posted.closed);
        assert_eq!(posted.week.get(), MAX_WEEKS);
        let stat = ledger.clients[&id].stat.as_ref().unwrap();
        assert_eq!(stat.weeks_paid, MAX_WEEKS);
        assert_eq!(stat.status, LoanStatus::Closed);
        assert_eq!(ledger.all_stats, stats(1, 0, 1));
        assert_ledger_invariants(&ledger);
    }

    #[test]
    fn test_posting_to_closed_loan_fails_unchanged() {
        let mut ledger = LedgerBuilder::new()
            .with_client(ClientBuilder::new().with_paid_weeks(MAX_WEEKS))
            .build();
        let before = ledger.clone();

        let result = post_entry(
            &mut ledger,
            &IdFixtures::client(1),
            &paid_entry(TemporalFixtures::monday()),
        );

        assert!(matches!(result, Err(LedgerError::ClientClosed(_))));
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_full_schedule_of_pending_entries_is_exhausted() {
        let mut client = ClientBuilder::new();
        for week in 0..MAX_WEEKS {
            client = client.with_entry(
                WEEKLY_INSTALLMENT,
                TemporalFixtures::day(i64::from(week) * 7),
                EntryStatus::Pending,
            );
        }
        let mut ledger = LedgerBuilder::new().with_client(client).build();
        let before = ledger.clone();

        let result = post_entry(
            &mut ledger,
            &IdFixtures::client(1),
            &paid_entry(TemporalFixtures::day(200)),
        );

        assert!(matches!(
            result,
            Err(LedgerError::ScheduleExhausted { max_weeks: MAX_WEEKS, .. })
        ));
        assert_eq!(ledger, before);
    }
}

// ============================================================================
// Sweep and undo
// ============================================================================

mod sweep_tests {
    use super::*;

    #[test]
    fn test_monday_sweep_creates_week_one() {
        let mut ledger = LedgerBuilder::new().with_client(ClientBuilder::new()).build();
        let id = IdFixtures::client(1);

        let outcome = sweep(&mut ledger, TemporalFixtures::civil_day(0));

        assert_eq!(
            outcome.receipt[&id],
            ReceiptLine {
                action: BatchAction::Created,
                week: WeekNumber::FIRST
            }
        );
        let entry = &ledger.clients[&id].collection[&WeekNumber::FIRST];
        assert_eq!(entry.date, TemporalFixtures::monday());
        assert_eq!(entry.status, EntryStatus::Paid);
        assert_eq!(ledger.clients[&id].stat.as_ref().unwrap().weeks_paid, 1);
    }

    #[test]
    fn test_sweep_closes_final_week_and_undo_reopens() {
        let mut ledger = LedgerBuilder::new()
            .with_client(ClientBuilder::new().with_paid_weeks(MAX_WEEKS - 1))
            .build();
        let before = ledger.clone();

        let outcome = sweep(&mut ledger, TemporalFixtures::civil_day(0));
        assert_eq!(outcome.closed, 1);
        assert_eq!(ledger.all_stats, stats(1, 0, 1));
        assert_ledger_invariants(&ledger);

        undo_last_batch(&mut ledger).unwrap();
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_sweep_skips_exhausted_client_and_continues() {
        let mut exhausted = ClientBuilder::new();
        for week in 0..MAX_WEEKS {
            exhausted = exhausted.with_entry(
                WEEKLY_INSTALLMENT,
                TemporalFixtures::day(-7 * i64::from(week + 1)),
                EntryStatus::Pending,
            );
        }
        let mut ledger = LedgerBuilder::new()
            .with_client(exhausted)
            .with_client(ClientBuilder::new())
            .build();

        let outcome = sweep(&mut ledger, TemporalFixtures::civil_day(0));

        assert!(!outcome.receipt.contains_key(&IdFixtures::client(1)));
        assert!(outcome.receipt.contains_key(&IdFixtures::client(2)));
    }

    #[test]
    fn test_sweep_then_undo_restores_pending_entry() {
        let mut ledger = LedgerBuilder::new()
            .with_client(ClientBuilder::new().with_paid_weeks(2).with_entry(
                WEEKLY_INSTALLMENT,
                TemporalFixtures::monday(),
                EntryStatus::Pending,
            ))
            .build();
        let before = ledger.clone();
        let id = IdFixtures::client(1);

        let outcome = sweep(&mut ledger, TemporalFixtures::civil_day(0));
        assert_eq!(outcome.receipt[&id].action, BatchAction::Updated);
        assert_eq!(outcome.receipt[&id].week.get(), 3);

        undo_last_batch(&mut ledger).unwrap();
        assert_eq!(ledger, before);
        assert_eq!(
            ledger.clients[&id].collection[&WeekNumber::new(3).unwrap()].status,
            EntryStatus::Pending
        );
    }

    #[test]
    fn test_undo_of_missing_entry_is_skipped() {
        let mut ledger = LedgerBuilder::new().with_client(ClientBuilder::new()).build();
        let id = IdFixtures::client(1);
        sweep(&mut ledger, TemporalFixtures::civil_day(0));
        ledger.clients.get_mut(&id).unwrap().collection.clear();

        let outcome = undo_last_batch(&mut ledger).unwrap();

        assert_eq!(outcome.reverted, 0);
        assert_eq!(outcome.skipped, 1);
        assert!(ledger.batches.is_empty());
    }

    #[test]
    fn test_receipt_keys_are_dates() {
        let mut ledger = Ledger::empty();
        sweep(&mut ledger, TemporalFixtures::civil_day(0));
        let json = serde_json::to_value(&ledger).unwrap();
        assert!(json["batches"].get("2024-06-03").is_some());
        assert_eq!(json["_lastBatch"], "2024-06-03");
    }

    #[test]
    fn test_client_without_stat_is_ignored_by_sweep() {
        let mut ledger = LedgerBuilder::new().with_client(ClientBuilder::new()).build();
        ledger.clients.get_mut(&ClientId::from_number(1)).unwrap().stat = None;

        let outcome = sweep(&mut ledger, TemporalFixtures::civil_day(0));
        assert!(outcome.receipt.is_empty());
    }
}

// ============================================================================
// Properties
// ============================================================================

mod property_tests {
    use super::*;

    proptest! {
        #[test]
        fn prop_invariants_hold_after_any_sequence(ops in ledger_ops_strategy(60)) {
            let simulation = Simulation::run(&ops);
            assert_ledger_invariants(&simulation.ledger);
            assert_totals_match_entries(&simulation.ledger);
        }

        #[test]
        fn prop_weeks_stay_dense_without_direct_postings(
            ops in prop::collection::vec(sweep_only_op_strategy(), 0..60)
        ) {
            let simulation = Simulation::run(&ops);
            assert_weeks_dense(&simulation.ledger);
            assert_ledger_invariants(&simulation.ledger);
        }

        #[test]
        fn prop_second_sweep_same_day_changes_nothing(ops in ledger_ops_strategy(40)) {
            let mut simulation = Simulation::run(&ops);
            let today = simulation.today();

            sweep(&mut simulation.ledger, today);
            let after_first = simulation.ledger.clone();
            let outcome = sweep(&mut simulation.ledger, today);

            prop_assert!(outcome.already_swept);
            prop_assert_eq!(&simulation.ledger, &after_first);
        }

        #[test]
        fn prop_sweep_then_undo_round_trips(ops in ledger_ops_strategy(40)) {
            let simulation = Simulation::run(&ops);
            let mut ledger = simulation.ledger.clone();
            let today = simulation.today();
            prop_assume!(!ledger.batches.contains_key(&today.date));
            prop_assume!(ledger.batches.keys().all(|d| *d < today.date));
            let before = ledger.clone();

            sweep(&mut ledger, today);
            undo_last_batch(&mut ledger);

            prop_assert_eq!(ledger, before);
        }
    }
}
