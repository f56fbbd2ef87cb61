//! Daily batch sweep
//!
//! For one civil day, every active client scheduled for that weekday is
//! marked as collected: an existing pending entry dated today is flipped to
//! paid, otherwise a new paid entry is appended. What happened to each client
//! is written to `batches[today]`, which both blocks a second sweep on the
//! same date and lets `undo` invert the sweep exactly.

use chrono::NaiveDate;

use core_kernel::CivilDay;

use crate::model::{
    BatchAction, BatchReceipt, CollectionDay, Entry, EntryStatus, Ledger, ReceiptLine,
    MAX_WEEKS, WEEKLY_INSTALLMENT,
};

/// Result of running the sweep for one day
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SweepOutcome {
    pub date: NaiveDate,
    /// True if a receipt for `date` already existed and nothing changed
    pub already_swept: bool,
    /// The receipt for `date`
    pub receipt: BatchReceipt,
    /// Clients whose loans closed during this sweep
    pub closed: u32,
}

/// Runs the sweep for `today`, at most once per date
pub fn sweep(ledger: &mut Ledger, today: CivilDay) -> SweepOutcome {
    if let Some(existing) = ledger.batches.get(&today.date) {
        return SweepOutcome {
            date: today.date,
            already_swept: true,
            receipt: existing.clone(),
            closed: 0,
        };
    }

    let weekday = CollectionDay::from(today.weekday);
    let mut receipt = BatchReceipt::new();
    let mut closed = 0;

    for (client_id, record) in ledger.clients.iter_mut() {
        let next_week = record.next_week();
        let todays_week = record.entry_on(today.date);

        let Some(stat) = record.stat.as_mut() else {
            continue;
        };
        if !stat.is_active() || stat.collection_day != weekday {
            continue;
        }

        let (line, amount) = match todays_week {
            Some(week) => {
                let Some(entry) = record.collection.get_mut(&week) else {
                    continue;
                };
                if entry.status == EntryStatus::Paid {
                    continue;
                }
                entry.status = EntryStatus::Paid;
                (
                    ReceiptLine {
                        action: BatchAction::Updated,
                        week,
                    },
                    entry.amount,
                )
            }
            None => {
                if next_week.get() > MAX_WEEKS {
                    continue;
                }
                record.collection.insert(
                    next_week,
                    Entry {
                        amount: WEEKLY_INSTALLMENT,
                        date: today.date,
                        status: EntryStatus::Paid,
                    },
                );
                (
                    ReceiptLine {
                        action: BatchAction::Created,
                        week: next_week,
                    },
                    WEEKLY_INSTALLMENT,
                )
            }
        };

        if stat.credit(amount) {
            ledger.all_stats.record_closed();
            closed += 1;
        }
        receipt.insert(client_id.clone(), line);
    }

    ledger.batches.insert(today.date, receipt.clone());
    ledger.last_batch = Some(today.date);

    SweepOutcome {
        date: today.date,
        already_swept: false,
        receipt,
        closed,
    }
}
