//! Infrastructure Database Layer
//!
//! This crate provides the PostgreSQL implementation of the ledger's
//! `DocumentStore` port. Each store path is one row holding a JSONB body and
//! a version counter; compare-and-swap is a conditional `UPDATE` (or an
//! `INSERT ... ON CONFLICT DO NOTHING` for a path that does not exist yet).
//!
//! # Example
//!
//! ```rust,ignore
//! use infra_db::{create_pool, run_migrations, DatabaseConfig, PostgresDocumentStore};
//!
//! let pool = create_pool(DatabaseConfig::new("postgres://localhost/collections")).await?;
//! run_migrations(&pool).await?;
//! let store = PostgresDocumentStore::new(pool);
//! ```

pub mod pool;
pub mod error;
pub mod documents;

pub use pool::{create_pool, create_pool_from_url, run_migrations, DatabaseConfig, DatabasePool};
pub use error::DatabaseError;
pub use documents::PostgresDocumentStore;
