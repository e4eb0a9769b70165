use axum::{
    extract::{Query, State},
    Extension, Json,
};
use chrono::Datelike;
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{ProgressQuery, RecordProgressRequest};
use crate::error::AppResult;
use crate::services::progress::{self, YearTable};
use crate::AppState;

pub async fn get_year_table(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<ProgressQuery>,
) -> AppResult<Json<YearTable>> {
    let year = query.year.unwrap_or_else(|| state.today().year());

    let table = progress::year_table(state.store.as_ref(), auth_user.id, year).await?;
    Ok(Json(table))
}

pub async fn record_progress(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<RecordProgressRequest>,
) -> AppResult<Json<Value>> {
    req.validate()?;

    let record = progress::record_manual(
        state.store.as_ref(),
        auth_user.id,
        req.year,
        req.month,
        &req.exercise_name,
        req.weight,
    )
    .await?;

    Ok(Json(json!({
        "year": record.year,
        "month": record.month,
        "exercise_name": record.exercise_name,
        "max_weight": record.max_weight,
        "auto_saved": record.auto_saved,
    })))
}
