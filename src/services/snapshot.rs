//! Monthly snapshot job: copies every user's current weights into the
//! history table under the month that just finished.
//!
//! The job keeps no state between runs. It is triggered by the in-process
//! scheduler on the 1st of each month and on demand over HTTP; concurrent
//! runs for the same month are safe because every row is an upsert on
//! (user, year, month, exercise).

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use chrono_tz::Tz;
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::canonical::canonicalize;
use crate::error::AppResult;
use crate::models::exercise_weight::ExerciseWeight;
use crate::models::monthly_progress::NewProgressRecord;
use crate::store::TrainingStore;

#[derive(Debug, Clone, PartialEq)]
pub enum SnapshotOutcome {
    /// There were no current weights to copy.
    NoWeights,
    Completed {
        /// Rows actually inserted or updated. Existing months skipped by a
        /// non-overwriting run are not counted.
        records_processed: usize,
        year: i32,
        month: u32,
    },
}

pub fn previous_month(year: i32, month: u32) -> (i32, u32) {
    if month <= 1 {
        (year - 1, 12)
    } else {
        (year, month - 1)
    }
}

/// The month a run at `now` snapshots: the one before the current month in `tz`.
pub fn snapshot_period(now: DateTime<Utc>, tz: Tz) -> (i32, u32) {
    let local = now.with_timezone(&tz);
    previous_month(local.year(), local.month())
}

/// One auto-saved record per (user, canonical exercise).
///
/// Legacy rows that canonicalize onto the same exercise are merged keeping
/// the highest weight, so a batch never contains a conflict key twice.
pub fn snapshot_records(weights: &[ExerciseWeight], year: i32, month: u32) -> Vec<NewProgressRecord> {
    let mut merged: BTreeMap<(Uuid, String), f64> = BTreeMap::new();
    for weight in weights {
        let key = (weight.user_id, canonicalize(&weight.exercise_name));
        merged
            .entry(key)
            .and_modify(|best| *best = best.max(weight.current_weight))
            .or_insert(weight.current_weight);
    }

    merged
        .into_iter()
        .map(|((user_id, exercise_name), max_weight)| NewProgressRecord {
            user_id,
            year,
            month: month as i32,
            exercise_name,
            max_weight,
            auto_saved: true,
        })
        .collect()
}

/// Read all current weights and upsert them as history for the previous month.
///
/// With `overwrite = false`, months that already have a value for an
/// exercise keep it.
pub async fn run_snapshot(
    store: &dyn TrainingStore,
    now: DateTime<Utc>,
    tz: Tz,
    overwrite: bool,
) -> AppResult<SnapshotOutcome> {
    let (year, month) = snapshot_period(now, tz);
    tracing::info!(year, month, overwrite, "Running monthly snapshot");

    let weights = store.all_weights().await?;
    tracing::debug!(count = weights.len(), "Fetched current exercise weights");

    if weights.is_empty() {
        tracing::info!("No exercise weights found to snapshot");
        return Ok(SnapshotOutcome::NoWeights);
    }

    let records = snapshot_records(&weights, year, month);
    let written = store.upsert_progress(&records, overwrite).await?;

    tracing::info!(
        year,
        month,
        records = records.len(),
        written,
        "Monthly snapshot completed"
    );

    Ok(SnapshotOutcome::Completed {
        records_processed: written as usize,
        year,
        month,
    })
}

/// Run the snapshot once on the 1st of every month (in `tz`).
///
/// Checks every `interval_secs`. The last snapshotted month is remembered
/// only to avoid re-running within the same day; a restart on the 1st simply
/// runs again, which overwrites with the same values.
pub fn spawn_snapshot_scheduler(
    store: Arc<dyn TrainingStore>,
    tz: Tz,
    interval_secs: u64,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        // tokio panics on a zero period
        let tick = std::time::Duration::from_secs(interval_secs.max(1));
        let mut interval = tokio::time::interval(tick);
        let mut last_period: Option<(i32, u32)> = None;
        loop {
            interval.tick().await;
            let now = Utc::now();
            if now.with_timezone(&tz).day() != 1 {
                continue;
            }
            let period = snapshot_period(now, tz);
            if last_period == Some(period) {
                continue;
            }
            match run_snapshot(store.as_ref(), now, tz, true).await {
                Ok(outcome) => {
                    tracing::info!(?outcome, "Scheduled monthly snapshot finished");
                    last_period = Some(period);
                }
                Err(e) => {
                    tracing::error!(error = %e, "Scheduled monthly snapshot failed");
                }
            }
        }
    })
}
