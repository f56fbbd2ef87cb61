//! Request DTOs
//!
//! Every field defaults when absent so that a missing field surfaces as a
//! validation error rather than a body-parsing failure.

use serde::Deserialize;
use validator::{Validate, ValidationError};

use core_kernel::temporal::parse_iso_date;
use core_kernel::{ClientId, UserId};
use domain_ledger::{CollectionDay, EntryStatus, NewClient, NewEntry};

use crate::error::ApiError;

fn validate_iso_date(value: &str) -> Result<(), ValidationError> {
    parse_iso_date(value)
        .map(|_| ())
        .map_err(|_| ValidationError::new("iso_date"))
}

fn validate_collection_day(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<CollectionDay>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("collection_day"))
}

fn validate_entry_status(value: &str) -> Result<(), ValidationError> {
    value
        .parse::<EntryStatus>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("entry_status"))
}

/// `?user=` on the report routes
#[derive(Debug, Deserialize, Validate)]
pub struct UserQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
}

impl UserQuery {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        Ok(UserId::parse(&self.user)?)
    }
}

/// `{user}` body of the batch routes
#[derive(Debug, Deserialize, Validate)]
pub struct UserRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
}

impl UserRequest {
    pub fn user_id(&self) -> Result<UserId, ApiError> {
        Ok(UserId::parse(&self.user)?)
    }
}

/// `?email=` on the login lookup
#[derive(Debug, Deserialize, Validate)]
pub struct EmailQuery {
    #[serde(default)]
    #[validate(length(min = 1, message = "email is required"))]
    pub email: String,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddClientRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub lend_date: String,
    #[serde(default)]
    #[validate(custom(function = "validate_collection_day"))]
    pub collection_day: String,
}

impl AddClientRequest {
    /// Splits a validated request into the owning user and the registration
    pub fn into_parts(self) -> Result<(UserId, NewClient), ApiError> {
        let user = UserId::parse(&self.user)?;
        let lend_date = parse_iso_date(&self.lend_date)?;
        let collection_day = self
            .collection_day
            .parse::<CollectionDay>()
            .map_err(ApiError::BadRequest)?;

        Ok((
            user,
            NewClient {
                lend_date,
                collection_day,
            },
        ))
    }
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AddEntryRequest {
    #[serde(default)]
    #[validate(length(min = 1, message = "user is required"))]
    pub user: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "clientId is required"))]
    pub client_id: String,
    #[serde(default)]
    #[validate(required(message = "entryAmount is required"))]
    pub entry_amount: Option<i64>,
    #[serde(default)]
    #[validate(custom(function = "validate_iso_date"))]
    pub entry_date: String,
    #[serde(default)]
    #[validate(custom(function = "validate_entry_status"))]
    pub entry_status: String,
}

impl AddEntryRequest {
    /// Splits a validated request into user, client and the entry to post
    pub fn into_parts(self) -> Result<(UserId, ClientId, NewEntry), ApiError> {
        let user = UserId::parse(&self.user)?;
        let client_id = ClientId::new(self.client_id.trim());
        let amount = self
            .entry_amount
            .ok_or_else(|| ApiError::BadRequest("entryAmount is required".to_string()))?;
        let date = parse_iso_date(&self.entry_date)?;
        let status = self
            .entry_status
            .parse::<EntryStatus>()
            .map_err(ApiError::BadRequest)?;

        Ok((user, client_id, NewEntry { amount, date, status }))
    }
}
