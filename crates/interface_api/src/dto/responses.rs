//! Response DTOs

use chrono::NaiveDate;
use serde::Serialize;

use core_kernel::{ClientId, UserId, WeekNumber};
use domain_ledger::{Posted, SweepOutcome, UndoOutcome};

#[derive(Debug, Serialize)]
pub struct BannerResponse {
    pub status: &'static str,
    pub msg: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NextClientIdResponse {
    pub next_client_id: ClientId,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddClientResponse {
    pub status: &'static str,
    pub client_id: ClientId,
}

impl From<ClientId> for AddClientResponse {
    fn from(client_id: ClientId) -> Self {
        Self {
            status: "success",
            client_id,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct AddEntryResponse {
    pub status: &'static str,
    pub week: WeekNumber,
}

impl From<Posted> for AddEntryResponse {
    fn from(posted: Posted) -> Self {
        Self {
            status: "success",
            week: posted.week,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchMarkResponse {
    pub status: &'static str,
    pub date: NaiveDate,
    pub already_swept: bool,
    /// Clients recorded in the day's receipt
    pub clients: usize,
}

impl From<SweepOutcome> for BatchMarkResponse {
    fn from(outcome: SweepOutcome) -> Self {
        Self {
            status: "ok",
            date: outcome.date,
            already_swept: outcome.already_swept,
            clients: outcome.receipt.len(),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UndoResponse {
    pub status: &'static str,
    /// `null` when there was no batch to undo
    pub undone_date: Option<NaiveDate>,
}

impl From<Option<UndoOutcome>> for UndoResponse {
    fn from(outcome: Option<UndoOutcome>) -> Self {
        Self {
            status: "ok",
            undone_date: outcome.map(|undone| undone.date),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolveUserResponse {
    pub user_id: UserId,
}
