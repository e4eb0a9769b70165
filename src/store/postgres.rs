use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;
use uuid::Uuid;

use super::{StoreResult, TrainingStore};
use crate::models::daily_workout::DailyWorkout;
use crate::models::exercise_weight::ExerciseWeight;
use crate::models::monthly_progress::{MonthlyProgress, NewProgressRecord};
use crate::models::setting::UserSetting;

/// PostgreSQL implementation backed by the tables in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrainingStore for PgStore {
    async fn ping(&self) -> StoreResult<()> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    async fn find_weights(
        &self,
        user_id: Uuid,
        exercise_names: &[String],
    ) -> StoreResult<Vec<ExerciseWeight>> {
        let rows = sqlx::query_as::<_, ExerciseWeight>(
            r#"
            SELECT * FROM exercise_weights
            WHERE user_id = $1 AND exercise_name = ANY($2)
            "#,
        )
        .bind(user_id)
        .bind(exercise_names)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn weights_for_user(&self, user_id: Uuid) -> StoreResult<Vec<ExerciseWeight>> {
        let rows = sqlx::query_as::<_, ExerciseWeight>(
            "SELECT * FROM exercise_weights WHERE user_id = $1 ORDER BY exercise_name ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn all_weights(&self) -> StoreResult<Vec<ExerciseWeight>> {
        let rows = sqlx::query_as::<_, ExerciseWeight>(
            "SELECT * FROM exercise_weights ORDER BY user_id, exercise_name",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn upsert_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        weight: f64,
    ) -> StoreResult<ExerciseWeight> {
        let row = sqlx::query_as::<_, ExerciseWeight>(
            r#"
            INSERT INTO exercise_weights (id, user_id, exercise_name, current_weight)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (user_id, exercise_name) DO UPDATE SET
                current_weight = EXCLUDED.current_weight,
                last_updated = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(exercise_name)
        .bind(weight)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn adjust_weight(
        &self,
        user_id: Uuid,
        exercise_name: &str,
        delta: f64,
        min: f64,
        max: f64,
    ) -> StoreResult<ExerciseWeight> {
        let row = sqlx::query_as::<_, ExerciseWeight>(
            r#"
            INSERT INTO exercise_weights (id, user_id, exercise_name, current_weight)
            VALUES ($1, $2, $3, LEAST($5, GREATEST($4, $6)))
            ON CONFLICT (user_id, exercise_name) DO UPDATE SET
                current_weight = LEAST($5, GREATEST($4, exercise_weights.current_weight + $6)),
                last_updated = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(exercise_name)
        .bind(min)
        .bind(max)
        .bind(delta)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn upsert_progress(
        &self,
        records: &[NewProgressRecord],
        overwrite: bool,
    ) -> StoreResult<u64> {
        if records.is_empty() {
            return Ok(0);
        }

        let mut ids = Vec::with_capacity(records.len());
        let mut user_ids = Vec::with_capacity(records.len());
        let mut years = Vec::with_capacity(records.len());
        let mut months = Vec::with_capacity(records.len());
        let mut names = Vec::with_capacity(records.len());
        let mut weights = Vec::with_capacity(records.len());
        let mut auto_saved = Vec::with_capacity(records.len());
        for record in records {
            ids.push(Uuid::new_v4());
            user_ids.push(record.user_id);
            years.push(record.year);
            months.push(record.month);
            names.push(record.exercise_name.clone());
            weights.push(record.max_weight);
            auto_saved.push(record.auto_saved);
        }

        // One statement per batch: the whole batch lands or none of it does.
        let on_conflict = if overwrite {
            r#"
            ON CONFLICT (user_id, year, month, exercise_name) DO UPDATE SET
                max_weight = EXCLUDED.max_weight,
                auto_saved = EXCLUDED.auto_saved,
                updated_at = NOW()
            "#
        } else {
            "ON CONFLICT (user_id, year, month, exercise_name) DO NOTHING"
        };
        let sql = format!(
            r#"
            INSERT INTO monthly_progress
                (id, user_id, year, month, exercise_name, max_weight, auto_saved)
            SELECT * FROM UNNEST(
                $1::uuid[], $2::uuid[], $3::int4[], $4::int4[],
                $5::text[], $6::float8[], $7::bool[]
            )
            {on_conflict}
            "#
        );

        let result = sqlx::query(&sql)
            .bind(&ids)
            .bind(&user_ids)
            .bind(&years)
            .bind(&months)
            .bind(&names)
            .bind(&weights)
            .bind(&auto_saved)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn progress_for_user(
        &self,
        user_id: Uuid,
        year: Option<i32>,
    ) -> StoreResult<Vec<MonthlyProgress>> {
        let rows = sqlx::query_as::<_, MonthlyProgress>(
            r#"
            SELECT * FROM monthly_progress
            WHERE user_id = $1 AND ($2::int4 IS NULL OR year = $2)
            ORDER BY year ASC, month ASC
            "#,
        )
        .bind(user_id)
        .bind(year)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn workouts_between(
        &self,
        user_id: Uuid,
        start: NaiveDate,
        end: NaiveDate,
    ) -> StoreResult<Vec<DailyWorkout>> {
        let rows = sqlx::query_as::<_, DailyWorkout>(
            r#"
            SELECT * FROM daily_workouts
            WHERE user_id = $1 AND workout_date BETWEEN $2 AND $3
            ORDER BY workout_date ASC
            "#,
        )
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn find_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
    ) -> StoreResult<Option<DailyWorkout>> {
        let row = sqlx::query_as::<_, DailyWorkout>(
            "SELECT * FROM daily_workouts WHERE user_id = $1 AND workout_date = $2",
        )
        .bind(user_id)
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn set_workout(
        &self,
        user_id: Uuid,
        date: NaiveDate,
        worked_out: bool,
        workout_type: Option<&str>,
    ) -> StoreResult<DailyWorkout> {
        let row = sqlx::query_as::<_, DailyWorkout>(
            r#"
            INSERT INTO daily_workouts (id, user_id, workout_date, worked_out, workout_type)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT (user_id, workout_date) DO UPDATE SET
                worked_out = EXCLUDED.worked_out,
                workout_type = COALESCE($5, daily_workouts.workout_type),
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(user_id)
        .bind(date)
        .bind(worked_out)
        .bind(workout_type)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }

    async fn workouts_desc(&self, user_id: Uuid) -> StoreResult<Vec<DailyWorkout>> {
        let rows = sqlx::query_as::<_, DailyWorkout>(
            r#"
            SELECT * FROM daily_workouts
            WHERE user_id = $1
            ORDER BY workout_date DESC
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    async fn get_setting(&self, user_id: Uuid, key: &str) -> StoreResult<Option<UserSetting>> {
        let row = sqlx::query_as::<_, UserSetting>(
            "SELECT * FROM user_settings WHERE user_id = $1 AND key = $2",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn put_setting(
        &self,
        user_id: Uuid,
        key: &str,
        value: &str,
    ) -> StoreResult<UserSetting> {
        let row = sqlx::query_as::<_, UserSetting>(
            r#"
            INSERT INTO user_settings (user_id, key, value)
            VALUES ($1, $2, $3)
            ON CONFLICT (user_id, key) DO UPDATE SET
                value = EXCLUDED.value,
                updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .fetch_one(&self.pool)
        .await?;

        Ok(row)
    }
}
