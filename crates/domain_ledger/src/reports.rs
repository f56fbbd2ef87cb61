//! Read-only reports over a ledger document
//!
//! Reports fold over a single plain read and never write. They are lenient:
//! client records that fail to decode, or carry no stat block, are skipped
//! rather than failing the whole report.

use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

use core_kernel::{CivilDay, ClientId, UserId};

use crate::error::LedgerError;
use crate::model::{ClientRecord, CollectionDay, EntryStatus, WEEKLY_INSTALLMENT};

/// Portfolio totals recounted from the client records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct Dashboard {
    pub total_loans: u32,
    pub active_loans: u32,
    pub closed_loans: u32,
    pub weekly_collection: i64,
    #[serde(rename = "UpComingCollection")]
    pub upcoming_collection: i64,
}

/// Active clients and expected takings for one weekday
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DayLoad {
    pub count: u32,
    pub amount: i64,
}

/// `DayLoad` for every weekday, `MON` through `SUN`
pub type WeeklyBreakdown = BTreeMap<CollectionDay, DayLoad>;

/// Today's collection round
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TodayView {
    pub date: NaiveDate,
    pub weekday: CollectionDay,
    pub summary: TodaySummary,
    pub customers: Vec<TodayCustomer>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TodaySummary {
    pub due: i64,
    pub collected: i64,
    pub pending: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayCustomer {
    pub client_id: ClientId,
    pub amount: i64,
    pub status: EntryStatus,
}

/// Decodes each client record independently, dropping the broken ones
fn decoded_clients(client_data: &Value) -> Vec<(ClientId, ClientRecord)> {
    let Some(clients) = client_data.as_object() else {
        return Vec::new();
    };

    clients
        .iter()
        .filter_map(|(key, raw)| match serde_json::from_value::<ClientRecord>(raw.clone()) {
            Ok(record) if record.stat.is_some() => Some((ClientId::new(key.as_str()), record)),
            Ok(_) => {
                debug!(client = %key, "Skipping client without stat");
                None
            }
            Err(e) => {
                debug!(client = %key, error = %e, "Skipping undecodable client");
                None
            }
        })
        .collect()
}

/// `ClientData` of a document that must exist
fn required_client_data<'a>(
    user: &UserId,
    document: Option<&'a Value>,
) -> Result<&'a Value, LedgerError> {
    let document = document.ok_or_else(|| LedgerError::UserNotFound(user.to_string()))?;
    document
        .get("ClientData")
        .filter(|v| !v.is_null())
        .ok_or_else(|| LedgerError::corrupt(format!("ClientData not found for user {}", user)))
}

/// Recounts loans and outstanding amounts
///
/// # Errors
///
/// `UserNotFound` if there is no document, `CorruptStructure` if it has no
/// `ClientData`.
pub fn dashboard(user: &UserId, document: Option<&Value>) -> Result<Dashboard, LedgerError> {
    let client_data = required_client_data(user, document)?;

    let mut report = Dashboard {
        total_loans: 0,
        active_loans: 0,
        closed_loans: 0,
        weekly_collection: 0,
        upcoming_collection: 0,
    };

    for (_, record) in decoded_clients(client_data) {
        let Some(stat) = record.stat else { continue };
        report.total_loans += 1;
        if stat.is_active() {
            report.active_loans += 1;
        } else {
            report.closed_loans += 1;
        }
        report.upcoming_collection =
            report.upcoming_collection.saturating_add(stat.outstanding());
    }
    report.weekly_collection = i64::from(report.active_loans) * WEEKLY_INSTALLMENT;

    Ok(report)
}

/// Active clients grouped by collection day
///
/// Same failure rules as `dashboard`.
pub fn weekly(user: &UserId, document: Option<&Value>) -> Result<WeeklyBreakdown, LedgerError> {
    let client_data = required_client_data(user, document)?;

    let mut breakdown: WeeklyBreakdown = CollectionDay::ALL
        .into_iter()
        .map(|day| (day, DayLoad::default()))
        .collect();

    for (_, record) in decoded_clients(client_data) {
        let Some(stat) = record.stat.filter(|s| s.is_active()) else { continue };
        let load = breakdown.entry(stat.collection_day).or_default();
        load.count += 1;
        load.amount += WEEKLY_INSTALLMENT;
    }

    Ok(breakdown)
}

/// Active clients scheduled for `today` and whether each has paid
///
/// An absent document yields an empty round.
pub fn today(today: CivilDay, document: Option<&Value>) -> TodayView {
    let weekday = CollectionDay::from(today.weekday);
    let mut summary = TodaySummary::default();
    let mut customers = Vec::new();

    let client_data = document.and_then(|doc| doc.get("ClientData"));
    for (client_id, record) in client_data.map(decoded_clients).unwrap_or_default() {
        let scheduled = record
            .stat
            .as_ref()
            .is_some_and(|s| s.is_active() && s.collection_day == weekday);
        if !scheduled {
            continue;
        }

        summary.due += WEEKLY_INSTALLMENT;
        let status = if record.paid_on(today.date) {
            summary.collected += WEEKLY_INSTALLMENT;
            EntryStatus::Paid
        } else {
            summary.pending += WEEKLY_INSTALLMENT;
            EntryStatus::Pending
        };

        customers.push(TodayCustomer {
            client_id,
            amount: WEEKLY_INSTALLMENT,
            status,
        });
    }

    TodayView {
        date: today.date,
        weekday,
        summary,
        customers,
    }
}
