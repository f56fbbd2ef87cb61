//! Test Utilities Crate
//!
//! Provides shared test infrastructure, fixtures, and helpers for the
//! collection ledger test suite.
//!
//! # Modules
//!
//! - `fixtures`: Fixed dates, clocks, ids and seed documents
//! - `builders`: Builder patterns for ledgers and client records
//! - `stores`: Document store wrappers that inject concurrent writes
//! - `assertions`: Ledger invariant checks with readable failure messages
//! - `generators`: Property-based operation sequences

pub mod fixtures;
pub mod builders;
pub mod stores;
pub mod assertions;
pub mod generators;

pub use fixtures::*;
pub use builders::*;
pub use stores::*;
pub use assertions::*;
pub use generators::*;
