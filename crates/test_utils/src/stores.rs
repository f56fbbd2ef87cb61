//! Store Wrappers for Concurrency Tests
//!
//! `RacingStore` simulates another writer committing between a transform's
//! read and its compare-and-swap. Each queued interference is applied to the
//! stored value right before the next swap, which then loses the race.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use core_kernel::{DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_ledger::ports::memory::InMemoryDocumentStore;
use domain_ledger::{DocumentPath, DocumentStore, Version, VersionedDocument};

type Interference = Box<dyn FnOnce(Option<Value>) -> Value + Send>;

/// In-memory store that lets tests inject concurrent writes
#[derive(Default)]
pub struct RacingStore {
    inner: InMemoryDocumentStore,
    pending: Mutex<VecDeque<Interference>>,
    swaps: AtomicU32,
    lost: AtomicU32,
}

impl RacingStore {
    pub fn new(inner: InMemoryDocumentStore) -> Self {
        Self {
            inner,
            ..Self::default()
        }
    }

    /// Queues a competing write to land before the next swap
    pub fn interfere<F>(&self, write: F)
    where
        F: FnOnce(Option<Value>) -> Value + Send + 'static,
    {
        self.pending.lock().unwrap().push_back(Box::new(write));
    }

    /// Queues `n` competing writes that leave the value unchanged
    pub fn interfere_times(&self, n: usize) {
        for _ in 0..n {
            self.interfere(|current| current.unwrap_or(Value::Null));
        }
    }

    /// Compare-and-swap calls seen so far
    pub fn swaps(&self) -> u32 {
        self.swaps.load(Ordering::SeqCst)
    }

    /// Compare-and-swap calls that lost the race
    pub fn lost(&self) -> u32 {
        self.lost.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryDocumentStore {
        &self.inner
    }
}

impl DomainPort for RacingStore {}

#[async_trait]
impl HealthCheckable for RacingStore {
    async fn health_check(&self) -> HealthCheckResult {
        self.inner.health_check().await
    }
}

#[async_trait]
impl DocumentStore for RacingStore {
    async fn read_versioned(&self, path: &DocumentPath) -> Result<VersionedDocument, PortError> {
        self.inner.read_versioned(path).await
    }

    async fn compare_and_swap(
        &self,
        path: &DocumentPath,
        expected: Version,
        value: Value,
    ) -> Result<bool, PortError> {
        self.swaps.fetch_add(1, Ordering::SeqCst);

        let interference = self.pending.lock().unwrap().pop_front();
        if let Some(write) = interference {
            let current = self.inner.read(path).await?;
            self.inner.put(path, write(current)).await;
        }

        let swapped = self.inner.compare_and_swap(path, expected, value).await?;
        if !swapped {
            self.lost.fetch_add(1, Ordering::SeqCst);
        }
        Ok(swapped)
    }
}
