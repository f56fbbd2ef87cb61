//! Login lookup handler

use axum::{extract::State, Json};

use crate::dto::{EmailQuery, ResolveUserResponse};
use crate::error::ApiError;
use crate::extract::ValidatedQuery;
use crate::AppState;

/// Maps a login email to the user id whose ledger it owns
pub async fn resolve_user(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<EmailQuery>,
) -> Result<Json<ResolveUserResponse>, ApiError> {
    let user_id = state.service.resolve_user(&query.email).await?;
    Ok(Json(ResolveUserResponse { user_id }))
}
