//! Month-by-month strength table built from the history rows.

use std::collections::HashMap;

use serde::Serialize;
use uuid::Uuid;

use super::canonical::canonicalize;
use super::split::preferred_order;
use super::weights::{storage_name, validate_weight};
use crate::error::{AppError, AppResult};
use crate::models::monthly_progress::{MonthlyProgress, NewProgressRecord};
use crate::store::TrainingStore;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Increase,
    Decrease,
    Neutral,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct MonthDelta {
    pub delta: f64,
    pub trend: Trend,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressRow {
    pub exercise_name: String,
    /// January..December. `None` means no record, which is not the same as 0.
    pub months: [Option<f64>; 12],
    pub deltas: [Option<MonthDelta>; 12],
}

#[derive(Debug, Clone, Serialize)]
pub struct YearTable {
    pub year: i32,
    /// Column keys, `YYYY-MM`.
    pub months: Vec<String>,
    pub rows: Vec<ProgressRow>,
}

/// Change against the closest earlier month that has a value.
pub fn month_deltas(months: &[Option<f64>; 12]) -> [Option<MonthDelta>; 12] {
    let mut deltas = [None; 12];
    let mut previous: Option<f64> = None;

    for (i, value) in months.iter().enumerate() {
        let Some(current) = *value else { continue };
        if let Some(prev) = previous {
            let delta = current - prev;
            let trend = if delta > f64::EPSILON {
                Trend::Increase
            } else if delta < -f64::EPSILON {
                Trend::Decrease
            } else {
                Trend::Neutral
            };
            deltas[i] = Some(MonthDelta { delta, trend });
        }
        previous = Some(current);
    }

    deltas
}

/// Group `records` by canonical exercise and keep the best weight per month.
///
/// Records from other years or with a month outside 1..=12 are ignored.
/// Rows follow the training split order; exercises outside it come after,
/// alphabetically.
pub fn build_year_table(year: i32, records: &[MonthlyProgress]) -> YearTable {
    let mut cells: HashMap<String, [Option<f64>; 12]> = HashMap::new();

    for record in records {
        if record.year != year || !(1..=12).contains(&record.month) {
            continue;
        }
        if !record.max_weight.is_finite() {
            continue;
        }
        let exercise = canonicalize(&record.exercise_name);
        let slot = &mut cells.entry(exercise).or_insert([None; 12])[(record.month - 1) as usize];
        *slot = Some(match *slot {
            Some(existing) => existing.max(record.max_weight),
            None => record.max_weight,
        });
    }

    let order = preferred_order();
    let mut names: Vec<String> = cells.keys().cloned().collect();
    names.sort_by(|a, b| {
        let rank = |name: &String| order.iter().position(|o| o == name).unwrap_or(order.len());
        rank(a).cmp(&rank(b)).then_with(|| a.cmp(b))
    });

    let rows = names
        .into_iter()
        .map(|exercise_name| {
            let months = cells[&exercise_name];
            ProgressRow {
                deltas: month_deltas(&months),
                months,
                exercise_name,
            }
        })
        .collect();

    YearTable {
        year,
        months: (1..=12).map(|m| format!("{}-{:02}", year, m)).collect(),
        rows,
    }
}

pub async fn year_table(
    store: &dyn TrainingStore,
    user_id: Uuid,
    year: i32,
) -> AppResult<YearTable> {
    let records = store.progress_for_user(user_id, Some(year)).await?;
    Ok(build_year_table(year, &records))
}

/// Manually entered month value; shares the snapshot's conflict key and
/// overwrites whatever is there.
pub async fn record_manual(
    store: &dyn TrainingStore,
    user_id: Uuid,
    year: i32,
    month: u32,
    exercise_name: &str,
    weight: f64,
) -> AppResult<NewProgressRecord> {
    if !(1..=12).contains(&month) {
        return Err(AppError::Validation("Month must be between 1 and 12".into()));
    }
    validate_weight(weight)?;

    let record = NewProgressRecord {
        user_id,
        year,
        month: month as i32,
        exercise_name: storage_name(exercise_name)?,
        max_weight: weight,
        auto_saved: false,
    };
    store
        .upsert_progress(std::slice::from_ref(&record), true)
        .await?;

    tracing::info!(
        user_id = %user_id,
        year,
        month,
        exercise = %record.exercise_name,
        "Monthly progress recorded manually"
    );
    Ok(record)
}
