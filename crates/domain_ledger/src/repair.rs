//! Ledger repair and initialization policies
//!
//! Every transform starts by turning the raw stored value into a `Ledger`.
//! Two policies exist and each operation picks one explicitly:
//!
//! - `RepairOrCreate` (sweep, undo): an absent or sparse document is filled
//!   with defaults, so a ledger can be materialized lazily.
//! - `RequireExisting` (registration, posting): the document and its
//!   `AllStats`/`ClientData` sections must already exist.

use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use tracing::warn;

use core_kernel::{ClientId, UserId};

use crate::error::LedgerError;
use crate::model::{ClientRecord, Ledger};

const ALL_STATS: &str = "AllStats";
const CLIENT_DATA: &str = "ClientData";
const LAST_BATCH: &str = "_lastBatch";

/// How a transform treats a missing or partial document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitPolicy {
    RepairOrCreate,
    RequireExisting,
}

impl InitPolicy {
    /// Produces the typed ledger a transform will work on
    ///
    /// # Errors
    ///
    /// - `UserNotFound` if the policy requires a document and there is none
    /// - `CorruptStructure` if required sections are missing or malformed
    pub fn load(self, user: &UserId, document: Option<Value>) -> Result<Ledger, LedgerError> {
        match self {
            InitPolicy::RepairOrCreate => decode(repair(document)),
            InitPolicy::RequireExisting => require_existing(user, document),
        }
    }
}

/// Fills in whatever top-level sections are missing
///
/// Never fails: an absent or non-object value becomes a fresh ledger, and a
/// partial one gains zeroed `AllStats`, empty `ClientData` and a null
/// last-batch marker. Sections that are present are left untouched.
pub fn repair(document: Option<Value>) -> Value {
    let mut root = match document {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    if is_missing(&root, ALL_STATS) {
        root.insert(
            ALL_STATS.to_string(),
            json!({"TotalLoans": 0, "ActiveLoans": 0, "ClosedLoans": 0}),
        );
    }
    if is_missing(&root, CLIENT_DATA) {
        root.insert(CLIENT_DATA.to_string(), Value::Object(Map::new()));
    }
    root.entry(LAST_BATCH).or_insert(Value::Null);

    Value::Object(root)
}

/// Decodes a document that must already be a well-formed ledger
pub fn require_existing(user: &UserId, document: Option<Value>) -> Result<Ledger, LedgerError> {
    let document = document.ok_or_else(|| {
        LedgerError::UserNotFound(format!(
            "{} (refusing to create the ledger root automatically)",
            user
        ))
    })?;

    let root = document
        .as_object()
        .ok_or_else(|| LedgerError::corrupt("ledger root is not an object"))?;
    if is_missing(root, ALL_STATS) || is_missing(root, CLIENT_DATA) {
        return Err(LedgerError::corrupt("AllStats or ClientData missing"));
    }

    decode(document)
}

/// Decodes a repaired document into the typed model
///
/// A `ClientData` entry that does not decode as a client record is set aside
/// in `unreadable_clients` instead of failing the whole ledger. A `ClientData`
/// section that is not an object at all is still corrupt.
pub fn decode(mut document: Value) -> Result<Ledger, LedgerError> {
    let unreadable = match document.get_mut(CLIENT_DATA) {
        Some(Value::Object(clients)) => take_unreadable(clients),
        _ => BTreeMap::new(),
    };

    let mut ledger: Ledger =
        serde_json::from_value(document).map_err(|e| LedgerError::corrupt(e.to_string()))?;
    ledger.unreadable_clients = unreadable;
    Ok(ledger)
}

/// Encodes a ledger for storage, unreadable client records included
pub fn encode(ledger: &Ledger) -> Result<Value, LedgerError> {
    let mut document =
        serde_json::to_value(ledger).map_err(|e| LedgerError::Serialization(e.to_string()))?;

    if !ledger.unreadable_clients.is_empty() {
        let clients = document
            .get_mut(CLIENT_DATA)
            .and_then(Value::as_object_mut)
            .ok_or_else(|| LedgerError::Serialization("ClientData is not an object".into()))?;
        for (id, raw) in &ledger.unreadable_clients {
            clients.insert(id.to_string(), raw.clone());
        }
    }

    Ok(document)
}

fn take_unreadable(clients: &mut Map<String, Value>) -> BTreeMap<ClientId, Value> {
    let bad: Vec<String> = clients
        .iter()
        .filter_map(|(key, raw)| {
            serde_json::from_value::<ClientRecord>(raw.clone())
                .err()
                .map(|e| {
                    warn!(
                        client = %key,
                        error = %e,
                        "Client record does not decode, leaving it untouched"
                    );
                    key.clone()
                })
        })
        .collect();

    bad.into_iter()
        .filter_map(|key| {
            let raw = clients.remove(&key)?;
            Some((ClientId::new(key.as_str()), raw))
        })
        .collect()
}

fn is_missing(root: &Map<String, Value>, key: &str) -> bool {
    root.get(key).map_or(true, Value::is_null)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> UserId {
        UserId::parse("agent1").unwrap()
    }

    #[test]
    fn test_repair_absent_document() {
        let repaired = repair(None);
        assert_eq!(
            repaired,
            json!({
                "AllStats": {"TotalLoans": 0, "ActiveLoans": 0, "ClosedLoans": 0},
                "ClientData": {},
                "_lastBatch": null
            })
        );
    }

    #[test]
    fn test_repair_keeps_present_sections() {
        let repaired = repair(Some(json!({
            "AllStats": {"TotalLoans": 2, "ActiveLoans": 1, "ClosedLoans": 1}
        })));
        assert_eq!(repaired["AllStats"]["TotalLoans"], json!(2));
        assert_eq!(repaired["ClientData"], json!({}));
    }

    #[test]
    fn test_repair_or_create_yields_empty_ledger() {
        let ledger = InitPolicy::RepairOrCreate.load(&user(), None).unwrap();
        assert_eq!(ledger, Ledger::empty());
    }

    #[test]
    fn test_require_existing_refuses_absent_root() {
        let result = InitPolicy::RequireExisting.load(&user(), None);
        assert!(matches!(result, Err(LedgerError::UserNotFound(_))));
    }

    #[test]
    fn test_require_existing_refuses_sparse_root() {
        let result = InitPolicy::RequireExisting.load(
            &user(),
            Some(json!({"AllStats": {"TotalLoans": 0, "ActiveLoans": 0, "ClosedLoans": 0}})),
        );
        assert!(matches!(result, Err(LedgerError::CorruptStructure(_))));
    }

    #[test]
    fn test_bad_client_record_is_set_aside_and_written_back() {
        let bad = json!({
            "ClientStat": {
                "ClientName": "P2",
                "CollectionDay": "MON",
                "LendDate": "27-05-2024",
                "Status": "Active",
                "TotalAmountPaid": 0,
                "WeeksPaid": 0
            },
            "collectionData": {}
        });
        let document = json!({
            "AllStats": {"TotalLoans": 2, "ActiveLoans": 2, "ClosedLoans": 0},
            "ClientData": {
                "P1": {
                    "ClientStat": {
                        "ClientName": "P1",
                        "CollectionDay": "MON",
                        "LendDate": "2024-05-27",
                        "Status": "Active",
                        "TotalAmountPaid": 0,
                        "WeeksPaid": 0
                    },
                    "collectionData": {}
                },
                "P2": bad.clone()
            },
            "batches": {},
            "_lastBatch": null
        });

        let ledger = decode(document.clone()).unwrap();
        assert!(ledger.clients.contains_key(&ClientId::from_number(1)));
        assert!(!ledger.clients.contains_key(&ClientId::from_number(2)));
        assert_eq!(ledger.unreadable_clients[&ClientId::from_number(2)], bad);
        assert!(ledger.has_client_id(&ClientId::from_number(2)));

        assert_eq!(encode(&ledger).unwrap(), document);
    }

    #[test]
    fn test_client_data_must_be_an_object() {
        let document = json!({
            "AllStats": {"TotalLoans": 0, "ActiveLoans": 0, "ClosedLoans": 0},
            "ClientData": [],
            "_lastBatch": null
        });
        assert!(matches!(decode(document), Err(LedgerError::CorruptStructure(_))));
    }
}
