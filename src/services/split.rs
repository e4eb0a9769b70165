//! The fixed 4-day upper/lower split.

use serde::{Deserialize, Serialize};

use super::canonical::canonicalize_all;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TrainingDay {
    UpperA,
    UpperB,
    LowerA,
    LowerB,
}

impl TrainingDay {
    pub fn all() -> &'static [TrainingDay] {
        &[
            TrainingDay::UpperA,
            TrainingDay::UpperB,
            TrainingDay::LowerA,
            TrainingDay::LowerB,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            TrainingDay::UpperA => "Upper A",
            TrainingDay::UpperB => "Upper B",
            TrainingDay::LowerA => "Lower A",
            TrainingDay::LowerB => "Lower B",
        }
    }

    pub fn focus(&self) -> &'static str {
        match self {
            TrainingDay::UpperA => "Chest",
            TrainingDay::UpperB => "Back",
            TrainingDay::LowerA => "Quads",
            TrainingDay::LowerB => "Posterior chain & core",
        }
    }

    /// Exercise names as they were historically labelled on each day.
    pub fn exercises(&self) -> &'static [&'static str] {
        match self {
            TrainingDay::UpperA => &[
                "Incline Smith",
                "Flys",
                "Shoulder Press",
                "Pulldown Lat",
                "Row Cable",
                "Bicep Curl",
                "Tricep Overhead",
            ],
            TrainingDay::UpperB => &[
                "Pulldown Beneden",
                "Wide Row",
                "Chest Press",
                "Flys",
                "Lat Raises Cable",
                "Preacher Curl",
                "Tricep Pushdown",
            ],
            TrainingDay::LowerA => &[
                "Squats/Legpress",
                "Leg Extensions",
                "Leg Curls",
                "Bulgarians",
                "Calf Raises",
            ],
            TrainingDay::LowerB => &[
                "RDLs",
                "Leg Curls",
                "Leg Extensions",
                "Weighted Crunch",
                "Russian Twists",
            ],
        }
    }
}

/// Canonical exercise names in split order, each listed once.
pub fn preferred_order() -> Vec<String> {
    let raw: Vec<&str> = TrainingDay::all()
        .iter()
        .flat_map(|day| day.exercises().iter().copied())
        .collect();
    canonicalize_all(&raw)
}
