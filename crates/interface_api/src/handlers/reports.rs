//! Read-only report handlers

use axum::{extract::State, Json};

use domain_ledger::{Dashboard, TodayView, WeeklyBreakdown};

use crate::dto::UserQuery;
use crate::error::ApiError;
use crate::extract::ValidatedQuery;
use crate::AppState;

pub async fn dashboard(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Json<Dashboard>, ApiError> {
    let user = query.user_id()?;
    Ok(Json(state.service.dashboard(&user).await?))
}

/// Active clients and expected takings per weekday
pub async fn weekly(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Json<WeeklyBreakdown>, ApiError> {
    let user = query.user_id()?;
    Ok(Json(state.service.weekly(&user).await?))
}

/// Today's collection round
pub async fn today(
    State(state): State<AppState>,
    ValidatedQuery(query): ValidatedQuery<UserQuery>,
) -> Result<Json<TodayView>, ApiError> {
    let user = query.user_id()?;
    Ok(Json(state.service.today_view(&user).await?))
}
