pub mod calendar;
pub mod dashboard;
pub mod health;
pub mod progress;
pub mod settings;
pub mod snapshot;
pub mod weights;
