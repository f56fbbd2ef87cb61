//! Optimistic read-modify-write over the document store
//!
//! `transact` reads a path, hands the value to a pure transform, and writes
//! the result back only if nobody else wrote in between. A lost race re-runs
//! the transform against the fresh value. A transform error aborts at once
//! with nothing written.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::LedgerError;
use crate::ports::{DocumentPath, DocumentStore};

/// Attempts before `transact` gives up with `Contention`
pub const DEFAULT_MAX_ATTEMPTS: u32 = 25;

/// Handle to the document store with a retry budget
#[derive(Clone)]
pub struct DocumentClient {
    store: Arc<dyn DocumentStore>,
    max_attempts: u32,
}

impl DocumentClient {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Overrides the retry budget; values below 1 are raised to 1
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn store(&self) -> &Arc<dyn DocumentStore> {
        &self.store
    }

    /// Plain read with no isolation guarantees
    pub async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, LedgerError> {
        Ok(self.store.read(path).await?)
    }

    /// Applies `transform` to the value at `path` atomically
    ///
    /// The transform returns the value to store plus a result for the caller.
    /// It may run several times and must not have side effects outside its
    /// return value. If the stored value would not change, nothing is written.
    ///
    /// # Errors
    ///
    /// - whatever the transform returns, on the first attempt that fails
    /// - `Store` if the adapter fails
    /// - `Contention` after `max_attempts` lost races
    pub async fn transact<T, F>(&self, path: &DocumentPath, mut transform: F) -> Result<T, LedgerError>
    where
        F: FnMut(Option<Value>) -> Result<(Value, T), LedgerError> + Send,
        T: Send,
    {
        for attempt in 1..=self.max_attempts {
            let current = self.store.read_versioned(path).await?;
            let unchanged_from = current.value.clone();
            let (next, output) = transform(current.value)?;

            if unchanged_from.as_ref() == Some(&next) {
                debug!(%path, attempt, "Transform left document unchanged, skipping write");
                return Ok(output);
            }

            if self.store.compare_and_swap(path, current.version, next).await? {
                debug!(%path, attempt, version = %current.version.next(), "Document updated");
                return Ok(output);
            }

            debug!(%path, attempt, "Concurrent write detected, retrying");
        }

        warn!(%path, attempts = self.max_attempts, "Giving up after repeated conflicts");
        Err(LedgerError::Contention {
            path: path.to_string(),
            attempts: self.max_attempts,
        })
    }
}
