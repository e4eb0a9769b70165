//! Storage capability for the training data.
//!
//! Every entity has a declared uniqueness key and every write is an upsert
//! against it, so implementations must enforce:
//!
//! - `exercise_weights`: (user_id, exercise_name)
//! - `monthly_progress`: (user_id, year, month, exercise_name)
//! - `daily_workouts`: (user_id, workout_date)
//! - `user_settings`: (user_id, key)
//!
//! Concurrent writers to the same key resolve last-writer-wins inside the
//! store; callers never lock.

use async_trait::async_trait;
use chrono::NaiveDate;
use uuid::Uuid;

use crate::models::daily_workout::DailyWorkout;
use crate::models::exercise_weight::ExerciseWeight;
use crate::models::monthly_progress::{MonthlyProgress, NewProgressRecord};
use crate::models::setting::UserSetting;

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TrainingStore: Send + Sync {
    /// Cheap round trip used by readiness checks.
    async fn ping(&self) -> StoreResult<()>;

    // ── exercise_weights ────────────────────────────────────────────────

    /// Rows for `user_id` whose name is in `exercise_names`. Names are matched exactly.
    async fn find_weights(
        &self,
        user_id: Uuid,
        exercise_names: &[String],
    ) -> StoreResult<Vec<ExerciseWeight>>;

    async fn weights_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ExerciseWeight>>;

    /// Every user's rows. Read by the snapshot job.
    async fn all_weights(&self) -> StoreResult<Vec<ExerciseWeight>>;

    /// Insert or overwrite the weight on (user_id, exercise_name).
    async fn upsert_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        weight: f64,
    ) -> StoreResult<ExerciseWeight>;

    /// Add `delta` to the stored weight (0 when absent), clamped to `min..=max`,
    /// in a single store-side operation.
    async fn adjust_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        delta: f64,
        min: f64,
        max: f64,
    ) -> StoreResult<ExerciseWeight>;

    // ── monthly_progress ────────────────────────────────────────────────

    /// Write a batch on (user_id, year, month, exercise_name). With `overwrite`
    /// existing rows take the new values; without it they are left alone.
    /// Returns the number of rows written.
    async fn upsert_progress(
        &self,
        records: &[NewProgressRecord],
        overwrite: bool,
    ) -> StoreResult<u64>;

    /// History rows for a user, optionally limited to one year, ordered by (year, month).
    async fn progress_for_user(
        &self,
        user_id: Uuid,
        year: Option<i32>,
    ) -> StoreResult<Vec<MonthlyProgress>>;

    // ── daily_workouts ──────────────────────────────────────────────────

    /// Rows with `start <= workout_date <= end`, ordered by date ascending.
    async fn workouts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyWorkout>>;

    async fn find_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<DailyWorkout>>;

    /// Upsert the flag on (user_id, workout_date). A `None` type keeps the stored one.
    async fn set_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        worked_out: bool,
        workout_type: Option<&str>,
    ) -> StoreResult<DailyWorkout>;

    /// All rows for a user, most recent date first.
    async fn workouts_desc(&self, user_id: Uuid) -> StoreResult<Vec<DailyWorkout>>;

    // ── user_settings ───────────────────────────────────────────────────

    async fn get_setting(&self, user_id: Uuid, key: &str) -> StoreResult<Option<UserSetting>>;

    async fn put_setting(&self, user_id: Uuid, key: &str, value: &str)
        -> StoreResult<UserSetting>;
}
