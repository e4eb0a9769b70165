use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::error::{AppError, AppResult};
use crate::store::TrainingStore;

#[derive(Debug, Clone, Serialize)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub first_day: NaiveDate,
    pub last_day: NaiveDate,
    /// Dates flagged as worked out, ascending.
    pub dates: Vec<NaiveDate>,
}

#[derive(Debug, Serialize)]
pub struct ToggleOutcome {
    pub date: NaiveDate,
    pub worked_out: bool,
    /// The affected month as re-read from the store after the write.
    pub month: MonthView,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
pub struct StreakSummary {
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_sessions: u32,
}

/// First and last day of a calendar month.
pub fn month_bounds(year: i32, month: u32) -> AppResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month {}-{}", year, month)))?;
    let (next_year, next_month) = if month == 12 {
        (year + 1, 1)
    } else {
        (year, month + 1)
    };
    let next_first = NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .ok_or_else(|| AppError::Validation(format!("Invalid month {}-{}", year, month)))?;

    Ok((first, next_first - Duration::days(1)))
}

/// Worked-out dates in one month.
pub async fn get_month(
    store: &dyn TrainingStore,
    user_id: Uuid,
    year: i32,
    month: u32,
) -> AppResult<BTreeSet<NaiveDate>> {
    let (first, last) = month_bounds(year, month)?;
    let rows = store.workouts_between(user_id, first, last).await?;

    Ok(rows
        .into_iter()
        .filter(|w| w.worked_out)
        .map(|w| w.workout_date)
        .collect())
}

pub async fn month_view(
    store: &dyn TrainingStore,
    user_id: Uuid,
    year: i32,
    month: u32,
) -> AppResult<MonthView> {
    let (first_day, last_day) = month_bounds(year, month)?;
    let dates = get_month(store, user_id, year, month).await?;

    Ok(MonthView {
        year,
        month,
        first_day,
        last_day,
        dates: dates.into_iter().collect(),
    })
}

/// Flip the worked-out flag for one day.
///
/// A flagged day is set back to `false` rather than deleted. The returned
/// month is read back from the store, not patched locally.
pub async fn toggle(
    store: &dyn TrainingStore,
    user_id: Uuid,
    date: NaiveDate,
    workout_type: Option<&str>,
) -> AppResult<ToggleOutcome> {
    let currently_worked_out = store
        .find_workout(user_id, date)
        .await?
        .map_or(false, |w| w.worked_out);

    let row = if currently_worked_out {
        store.set_workout(user_id, date, false, None).await?
    } else {
        store.set_workout(user_id, date, true, workout_type).await?
    };

    tracing::info!(
        user_id = %user_id,
        date = %date,
        worked_out = row.worked_out,
        "Workout day toggled"
    );

    let month = month_view(store, user_id, date.year(), date.month()).await?;

    Ok(ToggleOutcome {
        date,
        worked_out: row.worked_out,
        month,
    })
}

/// Consecutive worked-out days ending today, or ending yesterday when today
/// is not flagged yet.
///
/// `days_desc` must be ordered by date, most recent first. A missing date
/// breaks the streak exactly like an explicit `false`. Dates after `today`
/// are ignored.
pub fn current_streak<I>(days_desc: I, today: NaiveDate) -> u32
where
    I: IntoIterator<Item = (NaiveDate, bool)>,
{
    let days: Vec<(NaiveDate, bool)> = days_desc
        .into_iter()
        .filter(|(date, _)| *date <= today)
        .collect();

    let worked_today = days
        .first()
        .map_or(false, |&(date, worked_out)| date == today && worked_out);
    let mut expected = if worked_today {
        today
    } else {
        today - Duration::days(1)
    };

    let mut streak = 0u32;
    for (date, worked_out) in days {
        if date > expected {
            // today's unflagged row when anchored on yesterday
            continue;
        }
        if date < expected || !worked_out {
            break;
        }
        streak += 1;
        expected -= Duration::days(1);
    }

    streak
}

/// Longest run of consecutive worked-out dates.
pub fn longest_streak(worked_out: &BTreeSet<NaiveDate>) -> u32 {
    let mut longest = 0u32;
    let mut streak = 0u32;
    let mut prev_date: Option<NaiveDate> = None;

    for date in worked_out {
        match prev_date {
            Some(prev) if *date == prev + Duration::days(1) => streak += 1,
            _ => {
                longest = longest.max(streak);
                streak = 1;
            }
        }
        prev_date = Some(*date);
    }

    longest.max(streak)
}

pub async fn streak_summary(
    store: &dyn TrainingStore,
    user_id: Uuid,
    today: NaiveDate,
) -> AppResult<StreakSummary> {
    let rows = store.workouts_desc(user_id).await?;

    // Days after today do not count yet.
    let worked_out: BTreeSet<NaiveDate> = rows
        .iter()
        .filter(|w| w.worked_out && w.workout_date <= today)
        .map(|w| w.workout_date)
        .collect();

    Ok(StreakSummary {
        current_streak: current_streak(rows.iter().map(|w| (w.workout_date, w.worked_out)), today),
        longest_streak: longest_streak(&worked_out),
        total_sessions: worked_out.len() as u32,
    })
}
