//! Ledger document model
//!
//! One `Ledger` document exists per user. Field names on the wire follow the
//! stored document layout (`AllStats`, `ClientData`, `collectionData`, ...).
//! A client's stat block lives under `ClientStat`; documents that still key
//! it as `<id>Stat` decode with no stat and are ignored by every operation.
//!
//! # Invariants
//!
//! - `TotalLoans == ActiveLoans + ClosedLoans`
//! - `0 <= WeeksPaid <= MAX_WEEKS` for every client
//! - week keys of a client's schedule form the dense range `1..=len`

use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use core_kernel::{ClientId, WeekNumber};

/// Fixed weekly installment, in currency units
pub const WEEKLY_INSTALLMENT: i64 = 600;

/// Length of every repayment schedule, in weeks
pub const MAX_WEEKS: u32 = 20;

/// Total repayable over a full schedule
pub const SCHEDULE_TOTAL: i64 = WEEKLY_INSTALLMENT * MAX_WEEKS as i64;

/// The complete per-user document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(rename = "AllStats")]
    pub all_stats: AllStats,
    #[serde(rename = "ClientData", default)]
    pub clients: BTreeMap<ClientId, ClientRecord>,
    /// Sweep receipts keyed by civil date; doubles as the once-per-day gate
    #[serde(default)]
    pub batches: BTreeMap<NaiveDate, BatchReceipt>,
    /// Date of the most recent unreverted sweep
    #[serde(rename = "_lastBatch", default)]
    pub last_batch: Option<NaiveDate>,
    /// Top-level keys this model does not own, preserved on write
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// `ClientData` entries that failed to decode, written back untouched
    #[serde(skip)]
    pub unreadable_clients: BTreeMap<ClientId, Value>,
}

impl Ledger {
    /// An empty ledger with zeroed stats
    pub fn empty() -> Self {
        Self {
            all_stats: AllStats::default(),
            clients: BTreeMap::new(),
            batches: BTreeMap::new(),
            last_batch: None,
            extra: Map::new(),
            unreadable_clients: BTreeMap::new(),
        }
    }

    pub fn client(&self, id: &ClientId) -> Option<&ClientRecord> {
        self.clients.get(id)
    }

    /// True if `id` is taken, whether or not its record decodes
    pub fn has_client_id(&self, id: &ClientId) -> bool {
        self.clients.contains_key(id) || self.unreadable_clients.contains_key(id)
    }

    /// The receipt with the greatest date, if any
    pub fn latest_batch(&self) -> Option<(&NaiveDate, &BatchReceipt)> {
        self.batches.iter().next_back()
    }
}

impl Default for Ledger {
    fn default() -> Self {
        Self::empty()
    }
}

/// Aggregate loan counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct AllStats {
    pub total_loans: u32,
    pub active_loans: u32,
    pub closed_loans: u32,
}

impl AllStats {
    /// A new loan was opened
    pub fn record_opened(&mut self) {
        self.total_loans += 1;
        self.active_loans += 1;
    }

    /// An active loan was paid off
    pub fn record_closed(&mut self) {
        self.active_loans = self.active_loans.saturating_sub(1);
        self.closed_loans += 1;
    }

    /// A closed loan went back to active
    pub fn record_reopened(&mut self) {
        self.active_loans += 1;
        self.closed_loans = self.closed_loans.saturating_sub(1);
    }

    pub fn is_consistent(&self) -> bool {
        self.total_loans == self.active_loans + self.closed_loans
    }
}

/// One client's stat block and weekly schedule
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientRecord {
    #[serde(rename = "ClientStat", default, skip_serializing_if = "Option::is_none")]
    pub stat: Option<ClientStat>,
    #[serde(rename = "collectionData", default)]
    pub collection: BTreeMap<WeekNumber, Entry>,
}

impl ClientRecord {
    pub fn new(stat: ClientStat) -> Self {
        Self {
            stat: Some(stat),
            collection: BTreeMap::new(),
        }
    }

    /// One past the highest recorded week, starting at week 1
    pub fn next_week(&self) -> WeekNumber {
        self.collection
            .keys()
            .next_back()
            .map(|w| w.next())
            .unwrap_or(WeekNumber::FIRST)
    }

    /// The week whose entry is dated `date`, if any
    pub fn entry_on(&self, date: NaiveDate) -> Option<WeekNumber> {
        self.collection
            .iter()
            .find(|(_, entry)| entry.date == date)
            .map(|(week, _)| *week)
    }

    /// True if some entry dated `date` has been paid
    pub fn paid_on(&self, date: NaiveDate) -> bool {
        self.collection
            .values()
            .any(|entry| entry.date == date && entry.status == EntryStatus::Paid)
    }

    /// True if week keys run 1..=len with no gaps
    pub fn weeks_are_dense(&self) -> bool {
        self.collection
            .keys()
            .enumerate()
            .all(|(i, week)| week.get() as usize == i + 1)
    }
}

/// Per-client loan status and rollups
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ClientStat {
    pub client_name: String,
    pub collection_day: CollectionDay,
    pub lend_date: NaiveDate,
    pub status: LoanStatus,
    #[serde(default)]
    pub total_amount_paid: i64,
    #[serde(default)]
    pub weeks_paid: u32,
}

impl ClientStat {
    pub fn is_active(&self) -> bool {
        self.status == LoanStatus::Active
    }

    /// Credits one paid week
    ///
    /// Returns true if this payment completed the schedule and closed the loan.
    pub fn credit(&mut self, amount: i64) -> bool {
        self.weeks_paid += 1;
        self.total_amount_paid = self.total_amount_paid.saturating_add(amount);
        if self.weeks_paid >= MAX_WEEKS && self.status == LoanStatus::Active {
            self.status = LoanStatus::Closed;
            return true;
        }
        false
    }

    /// Reverses one credited week, floored at zero
    ///
    /// Returns true if the loan was closed and has been reopened.
    pub fn debit(&mut self, amount: i64) -> bool {
        self.weeks_paid = self.weeks_paid.saturating_sub(1);
        self.total_amount_paid = self.total_amount_paid.saturating_sub(amount).max(0);
        if self.status == LoanStatus::Closed {
            self.status = LoanStatus::Active;
            return true;
        }
        false
    }

    /// Amount still owed over the full schedule
    pub fn outstanding(&self) -> i64 {
        SCHEDULE_TOTAL.saturating_sub(self.total_amount_paid).max(0)
    }
}

/// Loan lifecycle status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoanStatus {
    #[serde(alias = "active", alias = "ACTIVE")]
    Active,
    #[serde(alias = "closed", alias = "CLOSED")]
    Closed,
}

/// One week's collection record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(rename = "Amount")]
    pub amount: i64,
    pub date: NaiveDate,
    #[serde(rename = "entryStatus")]
    pub status: EntryStatus,
}

/// Whether a scheduled week has been collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    #[serde(alias = "Paid", alias = "PAID")]
    Paid,
    #[serde(alias = "Pending", alias = "PENDING")]
    Pending,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Paid => "paid",
            EntryStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "paid" => Ok(EntryStatus::Paid),
            "pending" => Ok(EntryStatus::Pending),
            other => Err(format!("unknown entry status '{}'", other)),
        }
    }
}

/// Weekday on which a client's installment is collected
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CollectionDay {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl CollectionDay {
    pub const ALL: [CollectionDay; 7] = [
        CollectionDay::Mon,
        CollectionDay::Tue,
        CollectionDay::Wed,
        CollectionDay::Thu,
        CollectionDay::Fri,
        CollectionDay::Sat,
        CollectionDay::Sun,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CollectionDay::Mon => "MON",
            CollectionDay::Tue => "TUE",
            CollectionDay::Wed => "WED",
            CollectionDay::Thu => "THU",
            CollectionDay::Fri => "FRI",
            CollectionDay::Sat => "SAT",
            CollectionDay::Sun => "SUN",
        }
    }
}

impl From<Weekday> for CollectionDay {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => CollectionDay::Mon,
            Weekday::Tue => CollectionDay::Tue,
            Weekday::Wed => CollectionDay::Wed,
            Weekday::Thu => CollectionDay::Thu,
            Weekday::Fri => CollectionDay::Fri,
            Weekday::Sat => CollectionDay::Sat,
            Weekday::Sun => CollectionDay::Sun,
        }
    }
}

impl fmt::Display for CollectionDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CollectionDay {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        CollectionDay::ALL
            .into_iter()
            .find(|day| day.as_str() == upper)
            .ok_or_else(|| format!("unknown collection day '{}'", s))
    }
}

/// What the sweep did to one client
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BatchAction {
    /// A new paid entry was appended
    Created,
    /// An existing pending entry was marked paid
    Updated,
}

/// One client's line on a sweep receipt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptLine {
    pub action: BatchAction,
    #[serde(with = "week_index")]
    pub week: WeekNumber,
}

/// Everything one day's sweep changed, keyed by client
pub type BatchReceipt = BTreeMap<ClientId, ReceiptLine>;

/// Receipts store the week as a bare number rather than a `weekN` key
mod week_index {
    use core_kernel::WeekNumber;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(week: &WeekNumber, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u32(week.get())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<WeekNumber, D::Error>
    where
        D: Deserializer<'de>,
    {
        let n = u32::deserialize(deserializer)?;
        WeekNumber::new(n).ok_or_else(|| de::Error::custom("week index must be at least 1"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stat() -> ClientStat {
        ClientStat {
            client_name: "P1".to_string(),
            collection_day: CollectionDay::Mon,
            lend_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
            status: LoanStatus::Active,
            total_amount_paid: 0,
            weeks_paid: 0,
        }
    }

    #[test]
    fn test_credit_closes_on_final_week() {
        let mut stat = stat();
        stat.weeks_paid = MAX_WEEKS - 1;
        assert!(stat.credit(WEEKLY_INSTALLMENT));
        assert_eq!(stat.status, LoanStatus::Closed);
        assert_eq!(stat.weeks_paid, MAX_WEEKS);
    }

    #[test]
    fn test_debit_floors_at_zero_and_reopens() {
        let mut stat = stat();
        stat.status = LoanStatus::Closed;
        stat.total_amount_paid = 100;
        assert!(stat.debit(WEEKLY_INSTALLMENT));
        assert_eq!(stat.total_amount_paid, 0);
        assert_eq!(stat.weeks_paid, 0);
        assert!(stat.is_active());
    }

    #[test]
    fn test_extreme_amounts_saturate() {
        let mut stat = stat();
        stat.total_amount_paid = -1;
        assert_eq!(stat.outstanding(), SCHEDULE_TOTAL + 1);

        stat.total_amount_paid = i64::MIN;
        assert_eq!(stat.outstanding(), i64::MAX);
        stat.debit(i64::MAX);
        assert_eq!(stat.total_amount_paid, 0);
    }

    #[test]
    fn test_next_week_and_density() {
        let mut record = ClientRecord::new(stat());
        assert_eq!(record.next_week(), WeekNumber::FIRST);

        let entry = Entry {
            amount: WEEKLY_INSTALLMENT,
            date: NaiveDate::from_ymd_opt(2024, 6, 3).unwrap(),
            status: EntryStatus::Pending,
        };
        record.collection.insert(WeekNumber::FIRST, entry.clone());
        record.collection.insert(WeekNumber::new(3).unwrap(), entry);
        assert_eq!(record.next_week().get(), 4);
        assert!(!record.weeks_are_dense());
    }

    #[test]
    fn test_document_layout() {
        let doc = json!({
            "AllStats": {"TotalLoans": 1, "ActiveLoans": 1, "ClosedLoans": 0},
            "ClientData": {
                "P1": {
                    "ClientStat": {
                        "ClientName": "P1",
                        "CollectionDay": "MON",
                        "LendDate": "2024-05-27",
                        "Status": "Active",
                        "TotalAmountPaid": 600,
                        "WeeksPaid": 1
                    },
                    "collectionData": {
                        "week1": {"Amount": 600, "date": "2024-06-03", "entryStatus": "paid"}
                    }
                }
            },
            "batches": {"2024-06-03": {"P1": {"action": "created", "week": 1}}},
            "_lastBatch": "2024-06-03",
            "agentName": "Ravi"
        });

        let ledger: Ledger = serde_json::from_value(doc.clone()).unwrap();
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        let line = ledger.batches[&date][&ClientId::from_number(1)];
        assert_eq!(line.action, BatchAction::Created);
        assert_eq!(line.week, WeekNumber::FIRST);
        assert_eq!(ledger.extra.get("agentName"), Some(&json!("Ravi")));

        assert_eq!(serde_json::to_value(&ledger).unwrap(), doc);
    }

    #[test]
    fn test_parse_inputs_case_insensitively() {
        assert_eq!("mon".parse::<CollectionDay>().unwrap(), CollectionDay::Mon);
        assert_eq!("PAID".parse::<EntryStatus>().unwrap(), EntryStatus::Paid);
        assert!("someday".parse::<CollectionDay>().is_err());
        assert!("missed".parse::<EntryStatus>().is_err());
    }
}
