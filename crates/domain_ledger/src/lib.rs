//! Collection Ledger Domain
//!
//! This crate owns the per-agent collection ledger: one JSON document per
//! user holding aggregate loan stats, every client's weekly repayment
//! schedule, and the receipts of daily batch sweeps.
//!
//! # Operations
//!
//! - **Registration**: allocate `P<n>` and open an active loan
//! - **Posting**: append one week's `paid` or `pending` entry
//! - **Sweep**: once per civil day, mark every client scheduled for today
//!   as collected and write a receipt
//! - **Undo**: pop the most recent receipt and invert it exactly
//!
//! Each operation is a pure function over a [`Ledger`]. The
//! [`LedgerService`] wraps them as transforms committed through
//! optimistic compare-and-swap on the [`DocumentStore`] port, retrying
//! against the fresh document on conflict.
//!
//! # Example
//!
//! ```rust,ignore
//! use domain_ledger::{LedgerService, NewClient, CollectionDay};
//!
//! let service = LedgerService::new(store, clock, Timezone::india());
//! let client = service.add_client(&user, &NewClient {
//!     lend_date,
//!     collection_day: CollectionDay::Mon,
//! }).await?;
//!
//! let sweep = service.sweep_today(&user).await?;
//! assert!(sweep.receipt.contains_key(&client));
//! ```

pub mod error;
pub mod model;
pub mod repair;
pub mod registrar;
pub mod poster;
pub mod sweeper;
pub mod undo;
pub mod reports;
pub mod ports;
pub mod client;
pub mod service;

pub use error::LedgerError;
pub use model::{
    AllStats, BatchAction, BatchReceipt, ClientRecord, ClientStat, CollectionDay, Entry,
    EntryStatus, Ledger, LoanStatus, ReceiptLine, MAX_WEEKS, SCHEDULE_TOTAL, WEEKLY_INSTALLMENT,
};
pub use repair::InitPolicy;
pub use registrar::NewClient;
pub use poster::{NewEntry, Posted};
pub use sweeper::SweepOutcome;
pub use undo::UndoOutcome;
pub use reports::{Dashboard, DayLoad, TodayCustomer, TodaySummary, TodayView, WeeklyBreakdown};
pub use ports::{DocumentPath, DocumentStore, Version, VersionedDocument};
pub use client::{DocumentClient, DEFAULT_MAX_ATTEMPTS};
pub use service::LedgerService;
