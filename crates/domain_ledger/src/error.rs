//! Ledger domain errors

use thiserror::Error;

use core_kernel::{ClientId, PortError};

/// Errors that can occur in the ledger domain
///
/// Precondition and capacity failures are raised from inside a transform and
/// abort the update with nothing written. Store conflicts never appear here
/// unless the retry budget is exhausted.
#[derive(Debug, Error)]
pub enum LedgerError {
    /// The user's ledger document does not exist
    #[error("User not found: {0}")]
    UserNotFound(String),

    /// The document exists but is missing or has malformed required sections
    #[error("Corrupt ledger structure: {0}")]
    CorruptStructure(String),

    /// Client not found
    #[error("Client not found: {0}")]
    ClientNotFound(ClientId),

    /// Client record carries no stat block
    #[error("Client stat missing: {0}")]
    ClientStatMissing(ClientId),

    /// Client's loan is already closed
    #[error("Client already closed: {0}")]
    ClientClosed(ClientId),

    /// The weekly schedule is full
    #[error("Max {max_weeks} weeks reached for client {client}")]
    ScheduleExhausted {
        client: ClientId,
        max_weeks: u32,
    },

    /// No login record for the given email
    #[error("Login not found: {0}")]
    LoginNotFound(String),

    /// Every attempt lost the race against a concurrent writer
    #[error("Gave up on {path} after {attempts} conflicting attempts")]
    Contention {
        path: String,
        attempts: u32,
    },

    /// Ledger could not be encoded for storage
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// The underlying document store failed
    #[error("Store error: {0}")]
    Store(#[from] PortError),
}

impl LedgerError {
    pub fn corrupt(message: impl Into<String>) -> Self {
        LedgerError::CorruptStructure(message.into())
    }

    /// Returns true for failures raised by a transform's own preconditions
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            LedgerError::UserNotFound(_)
                | LedgerError::CorruptStructure(_)
                | LedgerError::ClientNotFound(_)
                | LedgerError::ClientStatMissing(_)
                | LedgerError::ClientClosed(_)
        )
    }
}
