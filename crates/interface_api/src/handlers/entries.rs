//! Weekly entry posting handler

use axum::{extract::State, Json};

use crate::dto::{AddEntryRequest, AddEntryResponse};
use crate::error::ApiError;
use crate::extract::ValidatedJson;
use crate::AppState;

/// Posts one week's entry for a client
pub async fn add_entry(
    State(state): State<AppState>,
    ValidatedJson(request): ValidatedJson<AddEntryRequest>,
) -> Result<Json<AddEntryResponse>, ApiError> {
    let (user, client_id, entry) = request.into_parts()?;
    let posted = state.service.post_entry(&user, &client_id, &entry).await?;
    Ok(Json(posted.into()))
}
