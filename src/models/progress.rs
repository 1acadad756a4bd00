use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::routine::{Exercise, RepsUnit, WeightUnit};

/// One row of the user's training log. `name` is the exercise name copied at
/// logging time, not a reference into a routine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEntry {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    #[serde(default)]
    pub reps_unit: RepsUnit,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub notes: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewProgressEntry {
    pub name: String,
    pub sets: u32,
    pub reps: u32,
    pub reps_unit: RepsUnit,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub notes: String,
    pub date: DateTime<Utc>,
}

impl NewProgressEntry {
    /// Snapshot of an exercise as it stands after an edit.
    pub fn from_exercise(exercise: &Exercise, date: DateTime<Utc>) -> Self {
        Self {
            name: exercise.name.clone(),
            sets: exercise.sets,
            reps: exercise.reps,
            reps_unit: exercise.reps_unit,
            weight: exercise.weight,
            weight_unit: exercise.weight_unit,
            notes: exercise.notes.clone().unwrap_or_default(),
            date,
        }
    }

    pub fn into_entry(self, id: String) -> ProgressEntry {
        ProgressEntry {
            id,
            name: self.name,
            sets: self.sets,
            reps: self.reps,
            reps_unit: self.reps_unit,
            weight: self.weight,
            weight_unit: self.weight_unit,
            notes: self.notes,
            date: self.date,
        }
    }
}

impl From<&ProgressEntry> for NewProgressEntry {
    fn from(entry: &ProgressEntry) -> Self {
        Self {
            name: entry.name.clone(),
            sets: entry.sets,
            reps: entry.reps,
            reps_unit: entry.reps_unit,
            weight: entry.weight,
            weight_unit: entry.weight_unit,
            notes: entry.notes.clone(),
            date: entry.date,
        }
    }
}
