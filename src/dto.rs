//! # TrainVault: Request/Response DTOs
//!
//! Conventions:
//! - `*Request`  → deserialized from client JSON body
//! - `*Query`    → deserialized from query params
//! - `*Response` → serialized to client JSON
//! - Field validation is expressed via `validator` derive macros

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::services::snapshot::SnapshotOutcome;

// ============================================================================
// Exercise weights
// ============================================================================

/// GET /api/weights?exercises=Legpress,RDLs
#[derive(Debug, Deserialize)]
pub struct WeightsQuery {
    /// Comma-separated raw exercise names.
    pub exercises: Option<String>,
}

impl WeightsQuery {
    pub fn names(&self) -> Vec<String> {
        self.exercises
            .as_deref()
            .unwrap_or("")
            .split(',')
            .filter(|n| !n.trim().is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Serialize)]
pub struct WeightsResponse {
    pub weights: BTreeMap<String, f64>,
}

/// PUT /api/weights
#[derive(Debug, Deserialize, Validate)]
pub struct SetWeightRequest {
    #[validate(length(min = 1, max = 100, message = "Exercise name must be 1-100 characters"))]
    pub exercise_name: String,

    #[validate(range(min = 0.0, max = 1000.0, message = "Weight must be between 0 and 1000"))]
    pub weight: f64,
}

/// POST /api/weights/adjust
#[derive(Debug, Deserialize, Validate)]
pub struct AdjustWeightRequest {
    #[validate(length(min = 1, max = 100, message = "Exercise name must be 1-100 characters"))]
    pub exercise_name: String,

    /// Range-checked by the weights service.
    pub delta: f64,
}

// ============================================================================
// Calendar
// ============================================================================

/// GET /api/calendar, defaults to the current month
#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// POST /api/calendar/toggle
#[derive(Debug, Deserialize, Validate)]
pub struct ToggleWorkoutRequest {
    pub date: NaiveDate,

    /// Label such as "Upper A"; kept when omitted.
    #[validate(length(min = 1, max = 50, message = "Workout type must be 1-50 characters"))]
    pub workout_type: Option<String>,
}

// ============================================================================
// Progress
// ============================================================================

/// GET /api/progress, defaults to the current year
#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub year: Option<i32>,
}

/// PUT /api/progress
#[derive(Debug, Deserialize, Validate)]
pub struct RecordProgressRequest {
    #[validate(range(min = 2000, max = 2100, message = "Year must be between 2000 and 2100"))]
    pub year: i32,

    #[validate(range(min = 1, max = 12, message = "Month must be between 1 and 12"))]
    pub month: u32,

    #[validate(length(min = 1, max = 100, message = "Exercise name must be 1-100 characters"))]
    pub exercise_name: String,

    #[validate(range(min = 0.0, max = 1000.0, message = "Weight must be between 0 and 1000"))]
    pub weight: f64,
}

// ============================================================================
// Settings
// ============================================================================

/// PUT /api/settings/:key
#[derive(Debug, Deserialize, Validate)]
pub struct PutSettingRequest {
    #[validate(length(max = 1000, message = "Value too long"))]
    pub value: String,
}

/// A missing key is reported with `value: null`, not as an error.
#[derive(Debug, Serialize)]
pub struct SettingResponse {
    pub key: String,
    pub value: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
}

// ============================================================================
// Monthly snapshot function
// ============================================================================

/// POST /functions/v1/monthly-snapshot
#[derive(Debug, Deserialize)]
pub struct SnapshotRequest {
    #[serde(default = "default_overwrite")]
    pub overwrite: bool,
}

impl Default for SnapshotRequest {
    fn default() -> Self {
        Self {
            overwrite: default_overwrite(),
        }
    }
}

fn default_overwrite() -> bool {
    true
}

/// `{ message | error, recordsProcessed?, year?, month? }`
#[derive(Debug, Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_processed: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
}

impl SnapshotResponse {
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            error: Some(error.into()),
            ..Default::default()
        }
    }
}

impl From<SnapshotOutcome> for SnapshotResponse {
    fn from(outcome: SnapshotOutcome) -> Self {
        match outcome {
            SnapshotOutcome::NoWeights => Self {
                message: Some("No exercise weights found".into()),
                ..Default::default()
            },
            SnapshotOutcome::Completed {
                records_processed,
                year,
                month,
            } => Self {
                message: Some("Monthly snapshot completed successfully".into()),
                records_processed: Some(records_processed),
                year: Some(year),
                month: Some(month),
                ..Default::default()
            },
        }
    }
}
