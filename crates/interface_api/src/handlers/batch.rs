//! Daily batch handlers

use axum::{extract::State, Json};

use crate::dto::{BatchMarkResponse, UndoResponse, UserRequest};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Marks every client due today as collected
pub async fn batch_mark(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserRequest>,
) -> Result<Json<BatchMarkResponse>, ApiError> {
    let user = request.user_id()?;
    let outcome = state.service.sweep_today(&user).await?;
    Ok(Json(outcome.into()))
}

/// Reverts the most recent batch
pub async fn undo_last_batch(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<UserRequest>,
) -> Result<Json<UndoResponse>, ApiError> {
    let user = request.user_id()?;
    let outcome = state.service.undo_last_batch(&user).await?;
    Ok(Json(outcome.into()))
}
