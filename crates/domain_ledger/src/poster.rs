//! Weekly payment posting
//!
//! Appends one entry to a client's schedule at the next free week and rolls
//! the client's counters forward. Only `paid` entries are credited; a
//! `pending` entry records a scheduled week that has not been collected.

use chrono::NaiveDate;

use core_kernel::{ClientId, WeekNumber};

use crate::error::LedgerError;
use crate::model::{Entry, EntryStatus, Ledger, LoanStatus, MAX_WEEKS};

/// Input for posting one week's entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    /// Amount collected; not range-checked here
    pub amount: i64,
    pub date: NaiveDate,
    pub status: EntryStatus,
}

/// Result of a successful posting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Posted {
    pub week: WeekNumber,
    /// True if this posting completed the schedule
    pub closed: bool,
}

/// Posts `entry` against `client_id`
///
/// # Errors
///
/// - `ClientNotFound` if the client does not exist
/// - `CorruptStructure` if the client's stored record does not decode
/// - `ClientStatMissing` if its stat block is absent
/// - `ClientClosed` if the loan is already closed
/// - `ScheduleExhausted` if the next week would exceed `MAX_WEEKS`
///
/// On error the ledger is left unmodified.
pub fn post_entry(
    ledger: &mut Ledger,
    client_id: &ClientId,
    entry: &NewEntry,
) -> Result<Posted, LedgerError> {
    if ledger.unreadable_clients.contains_key(client_id) {
        return Err(LedgerError::corrupt(format!(
            "record for client {} does not decode",
            client_id
        )));
    }
    let record = ledger
        .clients
        .get_mut(client_id)
        .ok_or_else(|| LedgerError::ClientNotFound(client_id.clone()))?;

    let next_week = record.next_week();
    let stat = record
        .stat
        .as_mut()
        .ok_or_else(|| LedgerError::ClientStatMissing(client_id.clone()))?;

    if stat.status == LoanStatus::Closed {
        return Err(LedgerError::ClientClosed(client_id.clone()));
    }
    if next_week.get() > MAX_WEEKS {
        return Err(LedgerError::ScheduleExhausted {
            client: client_id.clone(),
            max_weeks: MAX_WEEKS,
        });
    }

    let closed = match entry.status {
        EntryStatus::Paid => stat.credit(entry.amount),
        EntryStatus::Pending => false,
    };

    record.collection.insert(
        next_week,
        Entry {
            amount: entry.amount,
            date: entry.date,
            status: entry.status,
        },
    );

    if closed {
        ledger.all_stats.record_closed();
    }

    Ok(Posted {
        week: next_week,
        closed,
    })
}
