use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Current weight for one canonical exercise. Unique per (user_id, exercise_name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ExerciseWeight {
    pub id: Uuid,
    pub user_id: Uuid,
    pub exercise_name: String,
    pub current_weight: f64,
    pub last_updated: DateTime<Utc>,
}
