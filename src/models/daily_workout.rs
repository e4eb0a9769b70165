use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Attendance flag for one day. Unique per (user_id, workout_date).
///
/// A row with `worked_out = false` means the same as no row at all.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct DailyWorkout {
    pub id: Uuid,
    pub user_id: Uuid,
    pub workout_date: NaiveDate,
    pub worked_out: bool,
    pub workout_type: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
