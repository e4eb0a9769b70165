use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UserSetting {
    pub user_id: Uuid,
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}
