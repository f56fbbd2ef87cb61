//! Custom Test Assertions
//!
//! Provides ledger-level assertion helpers that name the offending client
//! and field instead of dumping the whole document.

use serde_json::Value;

use domain_ledger::{EntryStatus, Ledger, LoanStatus, MAX_WEEKS};

use crate::builders::recount;

/// Asserts every structural invariant of a ledger
///
/// - `TotalLoans == ActiveLoans + ClosedLoans`, and the counters match a
///   recount of client statuses
/// - `WeeksPaid` equals the number of paid entries and never exceeds
///   `MAX_WEEKS`
/// - a loan is closed exactly when `WeeksPaid` reached `MAX_WEEKS`
/// - `_lastBatch` is the most recent receipt date
pub fn assert_ledger_invariants(ledger: &Ledger) {
    assert!(
        ledger.all_stats.is_consistent(),
        "AllStats inconsistent: {:?}",
        ledger.all_stats
    );
    assert_eq!(
        ledger.all_stats,
        recount(ledger),
        "AllStats disagree with client statuses"
    );

    for (id, record) in &ledger.clients {
        let Some(stat) = record.stat.as_ref() else {
            continue;
        };
        let paid = record
            .collection
            .values()
            .filter(|e| e.status == EntryStatus::Paid)
            .count() as u32;

        assert_eq!(stat.weeks_paid, paid, "WeeksPaid of {} != paid entries", id);
        assert!(
            stat.weeks_paid <= MAX_WEEKS,
            "WeeksPaid of {} is {}",
            id,
            stat.weeks_paid
        );
        assert!(
            record.collection.keys().all(|w| w.get() <= MAX_WEEKS),
            "{} has an entry beyond week {}",
            id,
            MAX_WEEKS
        );
        assert_eq!(
            stat.status == LoanStatus::Closed,
            stat.weeks_paid >= MAX_WEEKS,
            "Status of {} is {:?} with {} weeks paid",
            id,
            stat.status,
            stat.weeks_paid
        );
    }

    assert_eq!(
        ledger.last_batch,
        ledger.batches.keys().next_back().copied(),
        "_lastBatch does not point at the latest receipt"
    );
}

/// Asserts that `TotalAmountPaid` is the sum of paid entry amounts
pub fn assert_totals_match_entries(ledger: &Ledger) {
    for (id, record) in &ledger.clients {
        let Some(stat) = record.stat.as_ref() else {
            continue;
        };
        let sum: i64 = record
            .collection
            .values()
            .filter(|e| e.status == EntryStatus::Paid)
            .map(|e| e.amount)
            .sum();
        assert_eq!(stat.total_amount_paid, sum, "TotalAmountPaid of {}", id);
    }
}

/// Asserts that every client's week keys run `1..=len`
pub fn assert_weeks_dense(ledger: &Ledger) {
    for (id, record) in &ledger.clients {
        assert!(
            record.weeks_are_dense(),
            "Weeks of {} are not dense: {:?}",
            id,
            record.collection.keys().collect::<Vec<_>>()
        );
    }
}

/// Decodes a stored document and checks its invariants
pub fn assert_document_invariants(document: &Value) -> Ledger {
    let ledger: Ledger = serde_json::from_value(document.clone())
        .unwrap_or_else(|e| panic!("Stored document does not decode: {}", e));
    assert_ledger_invariants(&ledger);
    ledger
}
