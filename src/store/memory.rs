use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StoreResult, TrainingStore};
use crate::models::daily_workout::DailyWorkout;
use crate::models::exercise_weight::ExerciseWeight;
use crate::models::monthly_progress::{MonthlyProgress, NewProgressRecord};
use crate::models::setting::UserSetting;

/// In-process store for tests and database-less local runs.
///
/// Each table is a map keyed by its uniqueness key, so upserts overwrite
/// the same way the SQL constraints do.
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

#[derive(Default)]
struct Tables {
    weights: HashMap<(Uuid, String), ExerciseWeight>,
    progress: HashMap<(Uuid, i32, i32, String), MonthlyProgress>,
    workouts: HashMap<(Uuid, NaiveDate), DailyWorkout>,
    settings: HashMap<(Uuid, String), UserSetting>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TrainingStore for MemoryStore {
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    async fn find_weights(
        &self,
        user_id: Uuid,
        exercise_names: &[String],
    ) -> StoreResult<Vec<ExerciseWeight>> {
        let tables = self.tables.lock().await;
        Ok(exercise_names
            .iter()
            .filter_map(|name| tables.weights.get(&(user_id, name.clone())).cloned())
            .collect())
    }

    async fn weights_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ExerciseWeight>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<ExerciseWeight> = tables
            .weights
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.exercise_name.cmp(&b.exercise_name));
        Ok(rows)
    }

    async fn all_weights(&self) -> StoreResult<Vec<ExerciseWeight>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<ExerciseWeight> = tables.weights.values().cloned().collect();
        rows.sort_by(|a, b| {
            (a.user_id, &a.exercise_name).cmp(&(b.user_id, &b.exercise_name))
        });
        Ok(rows)
    }

    async fn upsert_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        weight: f64,
    ) -> StoreResult<ExerciseWeight> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .weights
            .entry((user_id, exercise_name.to_string()))
            .and_modify(|w| {
                w.current_weight = weight;
                w.last_updated = Utc::now();
            })
            .or_insert_with(|| ExerciseWeight {
                id: Uuid::new_v4(),
                user_id,
                exercise_name: exercise_name.to_string(),
                current_weight: weight,
                last_updated: Utc::now(),
            });
        Ok(row.clone())
    }

    async fn adjust_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        delta: f64,
        min: f64,
        max: f64,
    ) -> StoreResult<ExerciseWeight> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .weights
            .entry((user_id, exercise_name.to_string()))
            .or_insert_with(|| ExerciseWeight {
                id: Uuid::new_v4(),
                user_id,
                exercise_name: exercise_name.to_string(),
                current_weight: 0.0,
                last_updated: Utc::now(),
            });
        row.current_weight = (row.current_weight + delta).clamp(min, max);
        row.last_updated = Utc::now();
        Ok(row.clone())
    }

    async fn upsert_progress(
        &self,
        records: &[NewProgressRecord],
        overwrite: bool,
    ) -> StoreResult<u64> {
        let mut tables = self.tables.lock().await;
        let mut written = 0u64;
        for record in records {
            let key = (
                record.user_id,
                record.year,
                record.month,
                record.exercise_name.clone(),
            );
            let now = Utc::now();
            match tables.progress.get_mut(&key) {
                Some(existing) => {
                    if overwrite {
                        existing.max_weight = record.max_weight;
                        existing.auto_saved = record.auto_saved;
                        existing.updated_at = now;
                        written += 1;
                    }
                }
                None => {
                    tables.progress.insert(
                        key,
                        MonthlyProgress {
                            id: Uuid::new_v4(),
                            user_id: record.user_id,
                            year: record.year,
                            month: record.month,
                            exercise_name: record.exercise_name.clone(),
                            max_weight: record.max_weight,
                            auto_saved: record.auto_saved,
                            created_at: now,
                            updated_at: now,
                        },
                    );
                    written += 1;
                }
            }
        }
        Ok(written)
    }

    async fn progress_for_user(
        &self,
        user_id: Uuid,
        year: Option<i32>,
    ) -> StoreResult<Vec<MonthlyProgress>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<MonthlyProgress> = tables
            .progress
            .values()
            .filter(|p| p.user_id == user_id && year.map_or(true, |y| p.year == y))
            .cloned()
            .collect();
        rows.sort_by(|a, b| (a.year, a.month).cmp(&(b.year, b.month)));
        Ok(rows)
    }

    async fn workouts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyWorkout>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<DailyWorkout> = tables
            .workouts
            .values()
            .filter(|w| w.user_id == user_id && w.workout_date >= start && w.workout_date <= end)
            .cloned()
            .collect();
        rows.sort_by_key(|w| w.workout_date);
        Ok(rows)
    }

    async fn find_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<DailyWorkout>> {
        let tables = self.tables.lock().await;
        Ok(tables.workouts.get(&(user_id, date)).cloned())
    }

    async fn set_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        worked_out: bool,
        workout_type: Option<&str>,
    ) -> StoreResult<DailyWorkout> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let row = tables
            .workouts
            .entry((user_id, date))
            .and_modify(|w| {
                w.worked_out = worked_out;
                if let Some(kind) = workout_type {
                    w.workout_type = Some(kind.to_string());
                }
                w.updated_at = now;
            })
            .or_insert_with(|| DailyWorkout {
                id: Uuid::new_v4(),
                user_id,
                workout_date: date,
                worked_out,
                workout_type: workout_type.map(str::to_string),
                created_at: now,
                updated_at: now,
            });
        Ok(row.clone())
    }

    async fn workouts_desc(&self, user_id: Uuid) -> StoreResult<Vec<DailyWorkout>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<DailyWorkout> = tables
            .workouts
            .values()
            .filter(|w| w.user_id == user_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.workout_date.cmp(&a.workout_date));
        Ok(rows)
    }

    async fn get_setting(&self, user_id: Uuid, key: &str) -> StoreResult<Option<UserSetting>> {
        let tables = self.tables.lock().await;
        Ok(tables.settings.get(&(user_id, key.to_string())).cloned())
    }

    async fn put_setting(
        &self,
        user_id: Uuid,
        key: &str,
        value: &str,
    ) -> StoreResult<UserSetting> {
        let mut tables = self.tables.lock().await;
        let row = UserSetting {
            user_id,
            key: key.to_string(),
            value: value.to_string(),
            updated_at: Utc::now(),
        };
        tables.settings.insert((user_id, key.to_string()), row.clone());
        Ok(row)
    }
}
