use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use super::calendar::{month_bounds, streak_summary};
use super::canonical::canonicalize;
use crate::error::AppResult;
use crate::store::TrainingStore;

const RECENT_WORKOUTS: usize = 5;

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub workouts_this_month: u32,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_sessions: u32,
    /// Exercises whose current weight beats every month on record.
    pub personal_records: u32,
    pub recent_workouts: Vec<RecentWorkout>,
}

#[derive(Debug, Serialize)]
pub struct RecentWorkout {
    pub date: NaiveDate,
    pub workout_type: Option<String>,
}

pub async fn dashboard(
    store: &dyn TrainingStore,
    user_id: Uuid,
    today: NaiveDate,
) -> AppResult<DashboardStats> {
    let streaks = streak_summary(store, user_id, today).await?;

    let (first, last) = month_bounds(today.year(), today.month())?;
    let workouts_this_month = store
        .workouts_between(user_id, first, last)
        .await?
        .iter()
        .filter(|w| w.worked_out)
        .count() as u32;

    let recent_workouts = store
        .workouts_desc(user_id)
        .await?
        .into_iter()
        .filter(|w| w.worked_out && w.workout_date <= today)
        .take(RECENT_WORKOUTS)
        .map(|w| RecentWorkout {
            date: w.workout_date,
            workout_type: w.workout_type,
        })
        .collect();

    let mut best_recorded: HashMap<String, f64> = HashMap::new();
    for record in store.progress_for_user(user_id, None).await? {
        let best = best_recorded
            .entry(canonicalize(&record.exercise_name))
            .or_insert(record.max_weight);
        *best = best.max(record.max_weight);
    }
    let personal_records = store
        .weights_for_user(user_id)
        .await?
        .iter()
        .filter(|w| {
            best_recorded
                .get(&canonicalize(&w.exercise_name))
                .map_or(false, |best| w.current_weight > *best)
        })
        .count() as u32;

    Ok(DashboardStats {
        workouts_this_month,
        current_streak: streaks.current_streak,
        longest_streak: streaks.longest_streak,
        total_sessions: streaks.total_sessions,
        personal_records,
        recent_workouts,
    })
}
