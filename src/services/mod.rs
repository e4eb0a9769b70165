pub mod calendar;
pub mod canonical;
pub mod dashboard;
pub mod progress;
pub mod snapshot;
pub mod split;
pub mod weights;
