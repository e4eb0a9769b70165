use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Extension, Json,
};
use serde_json::{json, Value};
use validator::Validate;

use crate::auth::middleware::AuthUser;
use crate::dto::{AdjustWeightRequest, SetWeightRequest, WeightsQuery, WeightsResponse};
use crate::error::AppResult;
use crate::models::exercise_weight::ExerciseWeight;
use crate::services::split::TrainingDay;
use crate::services::weights::{self, TrainingDayWeights};
use crate::AppState;

/// Without `?exercises=` every stored weight of the caller is returned.
pub async fn get_weights(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Query(query): Query<WeightsQuery>,
) -> AppResult<Json<WeightsResponse>> {
    let names = query.names();

    let weights: BTreeMap<String, f64> = if names.is_empty() {
        state
            .store
            .weights_for_user(auth_user.id)
            .await?
            .into_iter()
            .map(|w| (w.exercise_name, w.current_weight))
            .collect()
    } else {
        weights::get_weights(state.store.as_ref(), auth_user.id, &names).await?
    };

    Ok(Json(WeightsResponse { weights }))
}

pub async fn set_weight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<SetWeightRequest>,
) -> AppResult<Json<ExerciseWeight>> {
    req.validate()?;

    let row =
        weights::set_weight(state.store.as_ref(), auth_user.id, &req.exercise_name, req.weight)
            .await?;

    Ok(Json(row))
}

pub async fn adjust_weight(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Json(req): Json<AdjustWeightRequest>,
) -> AppResult<Json<ExerciseWeight>> {
    req.validate()?;

    let row =
        weights::adjust_weight(state.store.as_ref(), auth_user.id, &req.exercise_name, req.delta)
            .await?;

    Ok(Json(row))
}

pub async fn list_training_days() -> Json<Value> {
    let days: Vec<Value> = TrainingDay::all()
        .iter()
        .map(|day| {
            json!({
                "day": day,
                "title": day.title(),
                "focus": day.focus(),
                "exercises": day.exercises(),
            })
        })
        .collect();

    Json(json!({ "days": days }))
}

/// `:day` is the kebab-case slug, e.g. `upper-a`.
pub async fn get_training_day(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthUser>,
    Path(day): Path<TrainingDay>,
) -> AppResult<Json<TrainingDayWeights>> {
    let weights = weights::training_day(state.store.as_ref(), auth_user.id, day).await?;
    Ok(Json(weights))
}
