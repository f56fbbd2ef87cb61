//! Client registration
//!
//! Client ids have the form `P<n>`. Two allocators exist:
//! - `allocate_client_id` scans `P1, P2, ...` for the first unused key and is
//!   the authoritative allocator used inside the atomic transform.
//! - `preview_next_client_id` takes the highest numeric suffix plus one from
//!   a plain read. It is advisory only.
//!
//! Clients are never removed, so on any ledger without gaps in its ids the
//! two agree. Adding client removal would require reconciling them.

use chrono::NaiveDate;
use serde_json::Value;

use core_kernel::ClientId;

use crate::model::{ClientRecord, ClientStat, CollectionDay, Ledger, LoanStatus};

/// Input for registering a new client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewClient {
    pub lend_date: NaiveDate,
    pub collection_day: CollectionDay,
}

/// Smallest `P<n>` for which `taken` is false
pub fn allocate_client_id(taken: impl Fn(&ClientId) -> bool) -> ClientId {
    let mut n = 1;
    loop {
        let candidate = ClientId::from_number(n);
        if !taken(&candidate) {
            return candidate;
        }
        n += 1;
    }
}

/// `P<max numeric suffix + 1>` over the raw document's `ClientData` keys
///
/// Absent documents, absent or empty `ClientData`, and keys without a numeric
/// suffix all contribute nothing, so a fresh ledger previews `P1`.
pub fn preview_next_client_id(document: Option<&Value>) -> ClientId {
    let max = document
        .and_then(|doc| doc.get("ClientData"))
        .and_then(Value::as_object)
        .map(|clients| {
            clients
                .keys()
                .filter_map(|key| ClientId::new(key.as_str()).number())
                .max()
                .unwrap_or(0)
        })
        .unwrap_or(0);

    ClientId::from_number(max + 1)
}

/// Adds a new active client and bumps the loan counters
///
/// Returns the allocated id.
pub fn register_client(ledger: &mut Ledger, request: &NewClient) -> ClientId {
    let id = allocate_client_id(|id| ledger.has_client_id(id));

    let stat = ClientStat {
        client_name: id.to_string(),
        collection_day: request.collection_day,
        lend_date: request.lend_date,
        status: LoanStatus::Active,
        total_amount_paid: 0,
        weeks_paid: 0,
    };

    ledger.clients.insert(id.clone(), ClientRecord::new(stat));
    ledger.all_stats.record_opened();

    id
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::BTreeMap;

    fn request() -> NewClient {
        NewClient {
            lend_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
            collection_day: CollectionDay::Mon,
        }
    }

    #[test]
    fn test_first_client_is_p1() {
        let mut ledger = Ledger::empty();
        let id = register_client(&mut ledger, &request());

        assert_eq!(id, ClientId::from_number(1));
        let stat = ledger.clients[&id].stat.as_ref().unwrap();
        assert_eq!(stat.client_name, "P1");
        assert_eq!(stat.status, LoanStatus::Active);
        assert_eq!(stat.weeks_paid, 0);
        assert_eq!(stat.total_amount_paid, 0);
        assert!(ledger.clients[&id].collection.is_empty());
        assert_eq!(ledger.all_stats.total_loans, 1);
        assert_eq!(ledger.all_stats.active_loans, 1);
        assert_eq!(ledger.all_stats.closed_loans, 0);
    }

    #[test]
    fn test_allocation_fills_first_gap() {
        let mut clients = BTreeMap::new();
        clients.insert(ClientId::from_number(1), ());
        clients.insert(ClientId::from_number(3), ());
        assert_eq!(
            allocate_client_id(|id| clients.contains_key(id)),
            ClientId::from_number(2)
        );
    }

    #[test]
    fn test_allocation_skips_unreadable_records() {
        let mut ledger = Ledger::empty();
        ledger
            .unreadable_clients
            .insert(ClientId::from_number(1), json!({"ClientStat": "garbage"}));

        let id = register_client(
            &mut ledger,
            &NewClient {
                lend_date: NaiveDate::from_ymd_opt(2024, 5, 27).unwrap(),
                collection_day: CollectionDay::Mon,
            },
        );
        assert_eq!(id, ClientId::from_number(2));
        assert!(ledger.unreadable_clients.contains_key(&ClientId::from_number(1)));
    }

    #[test]
    fn test_preview_ignores_malformed_keys() {
        let doc = json!({"ClientData": {"P1": {}, "P7": {}, "legacy": {}, "P": {}}});
        assert_eq!(preview_next_client_id(Some(&doc)), ClientId::from_number(8));
        assert_eq!(preview_next_client_id(None), ClientId::from_number(1));
        assert_eq!(
            preview_next_client_id(Some(&json!({"ClientData": null}))),
            ClientId::from_number(1)
        );
    }

    #[test]
    fn test_preview_agrees_with_allocator_without_gaps() {
        let mut ledger = Ledger::empty();
        for _ in 0..5 {
            let document = serde_json::to_value(&ledger).unwrap();
            let previewed = preview_next_client_id(Some(&document));
            let allocated = register_client(&mut ledger, &request());
            assert_eq!(previewed, allocated);
        }
    }
}
