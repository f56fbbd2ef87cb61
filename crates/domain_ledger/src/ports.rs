//! Document Store Port
//!
//! The ledger lives in a hierarchical JSON document store. Every path holds
//! one JSON value and a version counter that increases on every write. The
//! domain needs exactly three things from the store:
//!
//! - a plain read (reports)
//! - a versioned read
//! - a conditional write that only succeeds if the version is unchanged
//!
//! Retrying on a lost race is not the store's job; see
//! [`DocumentClient::transact`](crate::client::DocumentClient::transact).
//!
//! # Adapters
//!
//! - **Postgres**: `infra_db::PostgresDocumentStore`, one row per path
//! - **In-memory**: [`memory::InMemoryDocumentStore`], behind the `mock` feature

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use core_kernel::{DomainPort, HealthCheckable, PortError, UserId};

/// Location of a document, e.g. `Users/agent1`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentPath(String);

impl DocumentPath {
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The ledger document of `user`
    pub fn user(user: &UserId) -> Self {
        Self(format!("Users/{}", user))
    }

    /// The login record for `email`
    ///
    /// Store keys cannot contain `.`, so it is replaced by `_`.
    pub fn login(email: &str) -> Self {
        Self(format!("Users/LoginDetails/{}", email.trim().replace('.', "_")))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DocumentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Write counter of one path
///
/// `Version::ABSENT` means nothing is stored there.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Version(pub u64);

impl Version {
    pub const ABSENT: Version = Version(0);

    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }

    pub fn is_absent(self) -> bool {
        self == Self::ABSENT
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

/// A value together with the version it was read at
#[derive(Debug, Clone, PartialEq)]
pub struct VersionedDocument {
    pub value: Option<Value>,
    pub version: Version,
}

impl VersionedDocument {
    pub fn absent() -> Self {
        Self {
            value: None,
            version: Version::ABSENT,
        }
    }
}

/// Port for the hierarchical document store
#[async_trait]
pub trait DocumentStore: DomainPort + HealthCheckable {
    /// Reads the value at `path` without version information
    async fn read(&self, path: &DocumentPath) -> Result<Option<Value>, PortError> {
        Ok(self.read_versioned(path).await?.value)
    }

    /// Reads the value at `path` and the version it was read at
    async fn read_versioned(&self, path: &DocumentPath) -> Result<VersionedDocument, PortError>;

    /// Writes `value` at `path` only if the stored version is still `expected`
    ///
    /// Returns `Ok(false)` if another writer got there first. Nothing is
    /// written in that case.
    async fn compare_and_swap(
        &self,
        path: &DocumentPath,
        expected: Version,
        value: Value,
    ) -> Result<bool, PortError>;
}

/// In-memory document store for tests and single-process deployments
#[cfg(any(test, feature = "mock"))]
pub mod memory {
    use super::*;
    use chrono::Utc;
    use core_kernel::{AdapterHealth, HealthCheckResult};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::RwLock;

    /// Versioned map of path to JSON value
    #[derive(Debug, Default, Clone)]
    pub struct InMemoryDocumentStore {
        documents: Arc<RwLock<HashMap<DocumentPath, (Version, Value)>>>,
    }

    impl InMemoryDocumentStore {
        pub fn new() -> Self {
            Self::default()
        }

        /// Pre-populates the store with documents
        pub async fn with_documents(documents: Vec<(DocumentPath, Value)>) -> Self {
            let store = Self::new();
            for (path, value) in documents {
                store.put(&path, value).await;
            }
            store
        }

        /// Writes unconditionally, bumping the version
        pub async fn put(&self, path: &DocumentPath, value: Value) -> Version {
            let mut documents = self.documents.write().await;
            let version = documents
                .get(path)
                .map(|(v, _)| v.next())
                .unwrap_or(Version(1));
            documents.insert(path.clone(), (version, value));
            version
        }

        /// Current version of `path`
        pub async fn version(&self, path: &DocumentPath) -> Version {
            self.documents
                .read()
                .await
                .get(path)
                .map(|(v, _)| *v)
                .unwrap_or(Version::ABSENT)
        }

        pub async fn len(&self) -> usize {
            self.documents.read().await.len()
        }

        pub async fn is_empty(&self) -> bool {
            self.documents.read().await.is_empty()
        }
    }

    impl DomainPort for InMemoryDocumentStore {}

    #[async_trait]
    impl HealthCheckable for InMemoryDocumentStore {
        async fn health_check(&self) -> HealthCheckResult {
            HealthCheckResult {
                adapter_id: "memory-document-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms: 0,
                message: Some(format!("{} documents", self.len().await)),
                checked_at: Utc::now(),
            }
        }
    }

    #[async_trait]
    impl DocumentStore for InMemoryDocumentStore {
        async fn read_versioned(
            &self,
            path: &DocumentPath,
        ) -> Result<VersionedDocument, PortError> {
            let documents = self.documents.read().await;
            Ok(match documents.get(path) {
                Some((version, value)) => VersionedDocument {
                    value: Some(value.clone()),
                    version: *version,
                },
                None => VersionedDocument::absent(),
            })
        }

        async fn compare_and_swap(
            &self,
            path: &DocumentPath,
            expected: Version,
            value: Value,
        ) -> Result<bool, PortError> {
            let mut documents = self.documents.write().await;
            let current = documents
                .get(path)
                .map(|(v, _)| *v)
                .unwrap_or(Version::ABSENT);
            if current != expected {
                return Ok(false);
            }
            documents.insert(path.clone(), (expected.next(), value));
            Ok(true)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::memory::InMemoryDocumentStore;
    use super::*;
    use serde_json::json;

    #[test]
    fn test_paths() {
        let user = UserId::parse("agent1").unwrap();
        assert_eq!(DocumentPath::user(&user).as_str(), "Users/agent1");
        assert_eq!(
            DocumentPath::login("ravi.k@mail.com").as_str(),
            "Users/LoginDetails/ravi_k@mail_com"
        );
    }

    #[tokio::test]
    async fn test_compare_and_swap_requires_current_version() {
        let store = InMemoryDocumentStore::new();
        let path = DocumentPath::new("Users/a");

        assert!(store.compare_and_swap(&path, Version::ABSENT, json!(1)).await.unwrap());
        assert!(!store.compare_and_swap(&path, Version::ABSENT, json!(2)).await.unwrap());

        let doc = store.read_versioned(&path).await.unwrap();
        assert_eq!(doc.value, Some(json!(1)));
        assert_eq!(doc.version, Version(1));

        assert!(store.compare_and_swap(&path, Version(1), json!(3)).await.unwrap());
        assert_eq!(store.read(&path).await.unwrap(), Some(json!(3)));
    }

    #[tokio::test]
    async fn test_absent_read() {
        let store = InMemoryDocumentStore::new();
        let doc = store.read_versioned(&DocumentPath::new("Users/none")).await.unwrap();
        assert_eq!(doc, VersionedDocument::absent());
        assert!(store.health_check().await.is_healthy());
    }
}
