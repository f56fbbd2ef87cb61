//! Request and response bodies
//!
//! Field names follow the camelCase wire format the mobile clients send.

pub mod requests;
pub mod responses;

pub use requests::*;
pub use responses::*;
