//! Core Kernel - Foundational types for the collection ledger
//!
//! This crate provides the building blocks shared by every other crate:
//! - Civil-time handling (fixed reporting timezone, injectable clock)
//! - Typed identifiers for users and clients
//! - Port infrastructure for swappable storage adapters
//! - The kernel error type

pub mod temporal;
pub mod identifiers;
pub mod ports;
pub mod error;

pub use temporal::{Timezone, TemporalError, Clock, SystemClock, FixedClock, CivilDay};
pub use identifiers::{UserId, ClientId, WeekNumber};
pub use ports::{
    PortError, DomainPort, HealthCheckable, HealthCheckResult, AdapterHealth,
};
pub use error::CoreError;
