//! Request handlers, one module per group of routes

pub mod auth;
pub mod batch;
pub mod clients;
pub mod entries;
pub mod health;
pub mod reports;
