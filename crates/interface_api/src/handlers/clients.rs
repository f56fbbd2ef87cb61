//! Client registration handlers

use axum::{extract::State, http::StatusCode, Json};

use crate::dto::{AddClientRequest, AddClientResponse, NextClientIdResponse, UserQuery};
use crate::error::ApiError;
use crate::extract::{ValidatedJson, ValidatedQuery};
use crate::AppState;

/// Previews the id the next registration will most likely receive
pub async fn next_client_id(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Json<NextClientIdResponse>, ApiError> {
    let user = query.user_id()?;
    let next_client_id = state.service.preview_next_client_id(&user).await?;
    Ok(Json(NextClientIdResponse { next_client_id }))
}

/// Registers a new client under an existing ledger
pub async fn add_client(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AddClientRequest>,
) -> Result<(StatusCode, Json<AddClientResponse>), ApiError> {
    let (user, new_client) = request.into_parts()?;
    let client_id = state.service.add_client(&user, &new_client).await?;
    Ok((StatusCode::CREATED, Json(client_id.into())))
}
