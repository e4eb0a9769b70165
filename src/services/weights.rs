use std::collections::BTreeMap;

use serde::Serialize;
use uuid::Uuid;

use super::canonical::canonicalize;
use super::split::TrainingDay;
use crate::error::{AppError, AppResult};
use crate::models::exercise_weight::ExerciseWeight;
use crate::store::TrainingStore;

pub const MIN_WEIGHT: f64 = 0.0;
pub const MAX_WEIGHT: f64 = 1000.0;
const MAX_NAME_LEN: usize = 100;

#[derive(Debug, Serialize)]
pub struct TrainingDayWeights {
    pub day: TrainingDay,
    pub title: &'static str,
    pub focus: &'static str,
    pub exercises: Vec<ExerciseEntry>,
}

#[derive(Debug, Serialize)]
pub struct ExerciseEntry {
    /// Label shown on the training day.
    pub label: &'static str,
    pub exercise_name: String,
    pub current_weight: f64,
}

/// Name under which a raw exercise is stored and looked up.
///
/// Surrounding whitespace never makes a separate key, even for names the
/// canonical table does not know.
pub fn storage_name(raw: &str) -> AppResult<String> {
    let name = canonicalize(raw.trim());
    if name.is_empty() || name.chars().count() > MAX_NAME_LEN {
        return Err(AppError::Validation(format!(
            "Exercise name must be 1-{} characters",
            MAX_NAME_LEN
        )));
    }
    Ok(name)
}

pub(crate) fn validate_weight(weight: f64) -> AppResult<()> {
    if !weight.is_finite() || !(MIN_WEIGHT..=MAX_WEIGHT).contains(&weight) {
        return Err(AppError::Validation(format!(
            "Weight must be between {} and {}",
            MIN_WEIGHT, MAX_WEIGHT
        )));
    }
    Ok(())
}

/// Current weight per canonical name. Names with no stored row report 0.
pub async fn get_weights<S: AsRef<str>>(
    store: &dyn TrainingStore,
    user_id: Uuid,
    exercise_names: &[S],
) -> AppResult<BTreeMap<String, f64>> {
    let mut weights = BTreeMap::new();
    for raw in exercise_names {
        weights.insert(storage_name(raw.as_ref())?, 0.0);
    }
    if weights.is_empty() {
        return Ok(weights);
    }

    let keys: Vec<String> = weights.keys().cloned().collect();
    for row in store.find_weights(user_id, &keys).await? {
        weights.insert(row.exercise_name, row.current_weight);
    }

    Ok(weights)
}

/// Absolute set; upserts on (user, canonical name).
pub async fn set_weight(
    store: &dyn TrainingStore,
    user_id: Uuid,
    exercise_name: &str,
    weight: f64,
) -> AppResult<ExerciseWeight> {
    validate_weight(weight)?;
    let name = storage_name(exercise_name)?;

    let row = store.upsert_weight(user_id, &name, weight).await?;
    tracing::info!(user_id = %user_id, exercise = %name, weight, "Exercise weight set");
    Ok(row)
}

/// Relative adjustment, clamped to the valid weight range.
pub async fn adjust_weight(
    store: &dyn TrainingStore,
    user_id: Uuid,
    exercise_name: &str,
    delta: f64,
) -> AppResult<ExerciseWeight> {
    if !delta.is_finite() || delta.abs() > MAX_WEIGHT {
        return Err(AppError::Validation(format!(
            "Adjustment must be within ±{}",
            MAX_WEIGHT
        )));
    }
    let name = storage_name(exercise_name)?;

    let row = store
        .adjust_weight(user_id, &name, delta, MIN_WEIGHT, MAX_WEIGHT)
        .await?;
    tracing::info!(
        user_id = %user_id,
        exercise = %name,
        delta,
        weight = row.current_weight,
        "Exercise weight adjusted"
    );
    Ok(row)
}

pub async fn training_day(
    store: &dyn TrainingStore,
    user_id: Uuid,
    day: TrainingDay,
) -> AppResult<TrainingDayWeights> {
    let weights = get_weights(store, user_id, day.exercises()).await?;

    let exercises = day
        .exercises()
        .iter()
        .map(|&label| {
            let exercise_name = canonicalize(label);
            let current_weight = weights.get(&exercise_name).copied().unwrap_or(0.0);
            ExerciseEntry {
                label,
                exercise_name,
                current_weight,
            }
        })
        .collect();

    Ok(TrainingDayWeights {
        day,
        title: day.title(),
        focus: day.focus(),
        exercises,
    })
}
