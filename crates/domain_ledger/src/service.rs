//! Ledger application service
//!
//! `LedgerService` is the entry point used by the HTTP layer. Each mutating
//! operation loads the user's document under the policy it requires, runs
//! the pure ledger operation, and commits through
//! [`DocumentClient::transact`]. Reports use a single plain read.

use std::sync::Arc;
use tracing::info;

use core_kernel::{CivilDay, ClientId, Clock, HealthCheckResult, Timezone, UserId};

use crate::client::DocumentClient;
use crate::error::LedgerError;
use crate::poster::{self, NewEntry, Posted};
use crate::ports::{DocumentPath, DocumentStore};
use crate::registrar::{self, NewClient};
use crate::repair::{encode, InitPolicy};
use crate::reports::{self, Dashboard, TodayView, WeeklyBreakdown};
use crate::sweeper::{self, SweepOutcome};
use crate::undo::{self, UndoOutcome};

/// Orchestrates ledger operations against the document store
#[derive(Clone)]
pub struct LedgerService {
    documents: DocumentClient,
    clock: Arc<dyn Clock>,
    timezone: Timezone,
}

impl LedgerService {
    pub fn new(store: Arc<dyn DocumentStore>, clock: Arc<dyn Clock>, timezone: Timezone) -> Self {
        Self {
            documents: DocumentClient::new(store),
            clock,
            timezone,
        }
    }

    /// Overrides the optimistic retry budget
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.documents = self.documents.with_max_attempts(max_attempts);
        self
    }

    pub fn timezone(&self) -> Timezone {
        self.timezone
    }

    /// Today's civil date in the reporting timezone
    pub fn today(&self) -> CivilDay {
        self.clock.today(&self.timezone)
    }

    /// Registers a new client and returns its id
    ///
    /// # Errors
    ///
    /// `UserNotFound` or `CorruptStructure` if the ledger does not already
    /// exist in full; store failures and contention as for any update.
    pub async fn add_client(
        &self,
        user: &UserId,
        request: &NewClient,
    ) -> Result<ClientId, LedgerError> {
        let path = DocumentPath::user(user);
        let client_id = self
            .documents
            .transact(&path, |document| {
                let mut ledger = InitPolicy::RequireExisting.load(user, document)?;
                let client_id = registrar::register_client(&mut ledger, request);
                Ok((encode(&ledger)?, client_id))
            })
            .await?;

        info!(%user, client = %client_id, day = %request.collection_day, "Client registered");
        Ok(client_id)
    }

    /// Posts one week's entry for a client
    pub async fn post_entry(
        &self,
        user: &UserId,
        client_id: &ClientId,
        entry: &NewEntry,
    ) -> Result<Posted, LedgerError> {
        let path = DocumentPath::user(user);
        let posted = self
            .documents
            .transact(&path, |document| {
                let mut ledger = InitPolicy::RequireExisting.load(user, document)?;
                let posted = poster::post_entry(&mut ledger, client_id, entry)?;
                Ok((encode(&ledger)?, posted))
            })
            .await?;

        info!(
            %user,
            client = %client_id,
            week = %posted.week,
            status = %entry.status,
            amount = entry.amount,
            closed = posted.closed,
            "Entry posted"
        );
        Ok(posted)
    }

    /// Runs the daily sweep for the current civil day
    ///
    /// The date is taken afresh on every attempt, so a retry that crosses
    /// midnight sweeps the new day.
    pub async fn sweep_today(&self, user: &UserId) -> Result<SweepOutcome, LedgerError> {
        let path = DocumentPath::user(user);
        let outcome = self
            .documents
            .transact(&path, |document| {
                let today = self.today();
                let mut ledger = InitPolicy::RepairOrCreate.load(user, document)?;
                let outcome = sweeper::sweep(&mut ledger, today);
                Ok((encode(&ledger)?, outcome))
            })
            .await?;

        if outcome.already_swept {
            info!(%user, date = %outcome.date, "Sweep already ran today");
        } else {
            info!(
                %user,
                date = %outcome.date,
                clients = outcome.receipt.len(),
                closed = outcome.closed,
                "Batch sweep committed"
            );
        }
        Ok(outcome)
    }

    /// Reverts the most recent sweep, if any
    pub async fn undo_last_batch(&self, user: &UserId) -> Result<Option<UndoOutcome>, LedgerError> {
        let path = DocumentPath::user(user);
        let outcome = self
            .documents
            .transact(&path, |document| {
                let mut ledger = InitPolicy::RepairOrCreate.load(user, document)?;
                let outcome = undo::undo_last_batch(&mut ledger);
                Ok((encode(&ledger)?, outcome))
            })
            .await?;

        match &outcome {
            Some(undone) => info!(
                %user,
                date = %undone.date,
                reverted = undone.reverted,
                skipped = undone.skipped,
                "Batch undone"
            ),
            None => info!(%user, "No batch to undo"),
        }
        Ok(outcome)
    }

    /// Advisory preview of the id the next registration will receive
    pub async fn preview_next_client_id(&self, user: &UserId) -> Result<ClientId, LedgerError> {
        let document = self.documents.read(&DocumentPath::user(user)).await?;
        Ok(registrar::preview_next_client_id(document.as_ref()))
    }

    pub async fn dashboard(&self, user: &UserId) -> Result<Dashboard, LedgerError> {
        let document = self.documents.read(&DocumentPath::user(user)).await?;
        reports::dashboard(user, document.as_ref())
    }

    pub async fn weekly(&self, user: &UserId) -> Result<WeeklyBreakdown, LedgerError> {
        let document = self.documents.read(&DocumentPath::user(user)).await?;
        reports::weekly(user, document.as_ref())
    }

    /// Today's collection round for `user`
    pub async fn today_view(&self, user: &UserId) -> Result<TodayView, LedgerError> {
        let document = self.documents.read(&DocumentPath::user(user)).await?;
        Ok(reports::today(self.today(), document.as_ref()))
    }

    /// Maps a login email to the user id that owns a ledger
    ///
    /// # Errors
    ///
    /// `LoginNotFound` if there is no login record, `CorruptStructure` if it
    /// carries no usable `userName`.
    pub async fn resolve_user(&self, email: &str) -> Result<UserId, LedgerError> {
        let path = DocumentPath::login(email);
        let record = self
            .documents
            .read(&path)
            .await?
            .ok_or_else(|| LedgerError::LoginNotFound(email.trim().to_string()))?;

        let user_name = record
            .get("userName")
            .and_then(|v| v.as_str())
            .ok_or_else(|| LedgerError::corrupt(format!("userName missing at {}", path)))?;

        UserId::parse(user_name).map_err(|e| LedgerError::corrupt(e.to_string()))
    }

    /// Health of the backing store
    pub async fn health_check(&self) -> HealthCheckResult {
        self.documents.store().health_check().await
    }
}
