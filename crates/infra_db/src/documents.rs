//! PostgreSQL Document Store Adapter
//!
//! Implements the ledger's `DocumentStore` port over the `ledger_documents`
//! table. The `version` column is the compare-and-swap token: every
//! successful write bumps it by one, and a write only lands if the row is
//! still at the version the caller read. A missing row is version 0.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::Value;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::{debug, instrument};

use core_kernel::{AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, PortError};
use domain_ledger::{DocumentPath, DocumentStore, Version, VersionedDocument};

use crate::error::DatabaseError;

const SELECT_DOCUMENT: &str = "SELECT body, version FROM ledger_documents WHERE path = $1";

const INSERT_IF_ABSENT: &str = r#"
    INSERT INTO ledger_documents (path, body, version, updated_at)
    VALUES ($1, $2, 1, now())
    ON CONFLICT (path) DO NOTHING
"#;

const UPDATE_IF_VERSION: &str = r#"
    UPDATE ledger_documents
    SET body = $2, version = version + 1, updated_at = now()
    WHERE path = $1 AND version = $3
"#;

/// PostgreSQL-backed implementation of the `DocumentStore` port
#[derive(Debug, Clone)]
pub struct PostgresDocumentStore {
    pool: PgPool,
}

impl PostgresDocumentStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn sql_error(e: sqlx::Error) -> PortError {
    DatabaseError::from(&e).into()
}

/// Converts the stored BIGINT version into the port's token
fn stored_version(raw: i64) -> Result<Version, PortError> {
    u64::try_from(raw)
        .map(Version)
        .map_err(|_| DatabaseError::SerializationError(format!("negative version {}", raw)).into())
}

/// Converts the caller's token into a BIGINT for the conditional update
fn expected_version(version: Version) -> Result<i64, PortError> {
    i64::try_from(version.0)
        .map_err(|_| PortError::validation(format!("version {} out of range", version)))
}

impl DomainPort for PostgresDocumentStore {}

#[async_trait]
impl HealthCheckable for PostgresDocumentStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();

        let result = sqlx::query_scalar::<_, i64>("SELECT count(*) FROM ledger_documents")
            .fetch_one(&self.pool)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;

        let (status, message) = match result {
            Ok(count) => (AdapterHealth::Healthy, Some(format!("{} documents", count))),
            Err(e) => (AdapterHealth::Unhealthy, Some(format!("Database error: {}", e))),
        };

        HealthCheckResult {
            adapter_id: "postgres-document-store".to_string(),
            status,
            latency_ms,
            message,
            checked_at: Utc::now(),
        }
    }
}

#[async_trait]
impl DocumentStore for PostgresDocumentStore {
    #[instrument(skip_all, fields(path = %path))]
    async fn read_versioned(&self, path: &DocumentPath) -> Result<VersionedDocument, PortError> {
        let row = sqlx::query_as::<_, (Json<Value>, i64)>(SELECT_DOCUMENT)
            .bind(path.as_str())
            .fetch_optional(&self.pool)
            .await
            .map_err(sql_error)?;

        match row {
            Some((Json(value), version)) => Ok(VersionedDocument {
                value: Some(value),
                version: stored_version(version)?,
            }),
            None => Ok(VersionedDocument::absent()),
        }
    }

    #[instrument(skip_all, fields(path = %path, expected = %expected))]
    async fn compare_and_swap(
        &self,
        path: &DocumentPath,
        expected: Version,
        value: Value,
    ) -> Result<bool, PortError> {
        let result = if expected.is_absent() {
            sqlx::query(INSERT_IF_ABSENT)
                .bind(path.as_str())
                .bind(Json(&value))
                .execute(&self.pool)
                .await
        } else {
            sqlx::query(UPDATE_IF_VERSION)
                .bind(path.as_str())
                .bind(Json(&value))
                .bind(expected_version(expected)?)
                .execute(&self.pool)
                .await
        }
        .map_err(sql_error)?;

        let swapped = result.rows_affected() == 1;
        if !swapped {
            debug!("Version moved on, swap rejected");
        }
        Ok(swapped)
    }
}
