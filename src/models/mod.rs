pub mod daily_workout;
pub mod exercise_weight;
pub mod monthly_progress;
pub mod setting;
