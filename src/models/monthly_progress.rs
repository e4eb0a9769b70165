use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// One month of history. Unique per (user_id, year, month, exercise_name).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MonthlyProgress {
    pub id: Uuid,
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub exercise_name: String,
    pub max_weight: f64,
    /// `true` when written by the snapshot job, `false` for manual entries.
    pub auto_saved: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Row to be upserted into the history table.
#[derive(Debug, Clone, PartialEq)]
pub struct NewProgressRecord {
    pub user_id: Uuid,
    pub year: i32,
    pub month: i32,
    pub exercise_name: String,
    pub max_weight: f64,
    pub auto_saved: bool,
}
