use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Datelike;
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{MonthQuery, ToggleWorkoutRequest};
use crate::error::AppResult;
use crate::services::calendar::{self, MonthView, StreakSummary, ToggleOutcome};
use crate::AppState;

pub async fn get_month(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<MonthQuery>,
) -> AppResult<Json<MonthView>> {
    let today = state.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let view = calendar::month_view(state.store.as_ref(), auth_user.id, year, month).await?;
    Ok(Json(view))
}

pub async fn toggle_workout(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<ToggleWorkoutRequest>,
) -> AppResult<Json<ToggleOutcome>> {
    req.validate()?;

    let outcome = calendar::toggle(
        state.store.as_ref(),
        auth_user.id,
        req.date,
        req.workout_type.as_deref(),
    )
    .await?;

    Ok(Json(outcome))
}

pub async fn get_streak(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
) -> AppResult<Json<StreakSummary>> {
    let summary =
        calendar::streak_summary(state.store.as_ref(), auth_user.id, state.today()).await?;
    Ok(Json(summary))
}
