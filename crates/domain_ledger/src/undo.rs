//! Reversal of the most recent batch sweep
//!
//! Receipts behave as a stack keyed by date: undo always pops the greatest
//! date. Calling it again reverts the next most recent remaining sweep.

use chrono::NaiveDate;
use tracing::warn;

use crate::model::{BatchAction, EntryStatus, Ledger};

/// Result of reverting one receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UndoOutcome {
    /// Date of the receipt that was removed
    pub date: NaiveDate,
    /// Receipt lines applied
    pub reverted: usize,
    /// Receipt lines whose client or entry no longer exists
    pub skipped: usize,
}

/// Reverts the latest receipt, or returns `None` if there is none
pub fn undo_last_batch(ledger: &mut Ledger) -> Option<UndoOutcome> {
    let date = *ledger.batches.keys().next_back()?;
    let receipt = ledger.batches.remove(&date)?;

    let mut reverted = 0;
    let mut skipped = 0;

    for (client_id, line) in receipt {
        let Some(record) = ledger.clients.get_mut(&client_id) else {
            warn!(client = %client_id, %date, "Receipt references a missing client, skipping");
            skipped += 1;
            continue;
        };
        let (Some(stat), Some(entry)) = (record.stat.as_mut(), record.collection.get(&line.week))
        else {
            warn!(client = %client_id, week = %line.week, %date, "Receipt references a missing entry, skipping");
            skipped += 1;
            continue;
        };
        let amount = entry.amount;

        match line.action {
            BatchAction::Created => {
                record.collection.remove(&line.week);
            }
            BatchAction::Updated => {
                if let Some(entry) = record.collection.get_mut(&line.week) {
                    entry.status = EntryStatus::Pending;
                }
            }
        }

        if stat.debit(amount) {
            ledger.all_stats.record_reopened();
        }
        reverted += 1;
    }

    ledger.last_batch = ledger.batches.keys().next_back().copied();

    Some(UndoOutcome {
        date,
        reverted,
        skipped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::CollectionDay;
    use crate::registrar::{register_client, NewClient};
    use crate::sweeper::sweep;
    use core_kernel::{CivilDay, ClientId, WeekNumber};

    fn day(d: u32) -> CivilDay {
        CivilDay::from_date(NaiveDate::from_ymd_opt(2024, 6, d).unwrap())
    }

    fn ledger_with_monday_client() -> (Ledger, ClientId) {
        let mut ledger = Ledger::empty();
        let id = register_client(
            &mut ledger,
            &NewClient {
                lend_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
                collection_day: CollectionDay::Mon,
            },
        );
        (ledger, id)
    }

    #[test]
    fn test_empty_batches_is_noop() {
        let (mut ledger, _) = ledger_with_monday_client();
        let before = ledger.clone();
        assert_eq!(undo_last_batch(&mut ledger), None);
        assert_eq!(ledger, before);
    }

    #[test]
    fn test_undo_removes_created_entry() {
        let (mut ledger, id) = ledger_with_monday_client();
        sweep(&mut ledger, day(3));

        let outcome = undo_last_batch(&mut ledger).unwrap();

        assert_eq!(outcome.date, day(3).date);
        assert_eq!(outcome.reverted, 1);
        let record = &ledger.clients[&id];
        assert!(record.collection.is_empty());
        assert_eq!(record.stat.as_ref().unwrap().weeks_paid, 0);
        assert_eq!(record.stat.as_ref().unwrap().total_amount_paid, 0);
        assert!(ledger.batches.is_empty());
        assert_eq!(ledger.last_batch, None);
    }

    #[test]
    fn test_sequential_undo_walks_backwards() {
        let (mut ledger, id) = ledger_with_monday_client();
        sweep(&mut ledger, day(3));
        sweep(&mut ledger, day(10));

        assert_eq!(undo_last_batch(&mut ledger).unwrap().date, day(10).date);
        assert_eq!(ledger.last_batch, Some(day(3).date));
        assert_eq!(ledger.clients[&id].collection.len(), 1);

        assert_eq!(undo_last_batch(&mut ledger).unwrap().date, day(3).date);
        assert!(ledger.clients[&id].collection.is_empty());
        assert_eq!(undo_last_batch(&mut ledger), None);
    }

    #[test]
    fn test_missing_client_is_skipped() {
        let (mut ledger, id) = ledger_with_monday_client();
        sweep(&mut ledger, day(3));
        ledger
            .batches
            .get_mut(&day(3).date)
            .unwrap()
            .insert(
                ClientId::from_number(99),
                crate::model::ReceiptLine {
                    action: BatchAction::Created,
                    week: WeekNumber::FIRST,
                },
            );

        let outcome = undo_last_batch(&mut ledger).unwrap();

        assert_eq!(outcome.reverted, 1);
        assert_eq!(outcome.skipped, 1);
        assert!(ledger.clients[&id].collection.is_empty());
    }
}
