use std::fmt;
use std::str::FromStr;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::video::{Video, VideoPayload};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepsUnit {
    #[default]
    Count,
    Seconds,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[default]
    Kg,
    Lb,
}

impl RepsUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            RepsUnit::Count => "count",
            RepsUnit::Seconds => "seconds",
        }
    }
}

impl WeightUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Kg => "kg",
            WeightUnit::Lb => "lb",
        }
    }
}

impl FromStr for RepsUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "count" => Ok(RepsUnit::Count),
            "seconds" => Ok(RepsUnit::Seconds),
            other => Err(format!("{} is not a reps unit (count|seconds)", other)),
        }
    }
}

impl FromStr for WeightUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "kg" => Ok(WeightUnit::Kg),
            "lb" => Ok(WeightUnit::Lb),
            other => Err(format!("{} is not a weight unit (kg|lb)", other)),
        }
    }
}

impl fmt::Display for RepsUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for WeightUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A persisted routine as returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Routine {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(default)]
    pub user_id: String,
    // The backend spells the coach reference `couchId`
    #[serde(rename = "couchId", alias = "coachId", default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub days: Vec<Day>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Routine {
    pub fn day(&self, day_id: &str) -> Option<&Day> {
        self.days.iter().find(|d| d.id == day_id)
    }

    pub fn exercise(&self, day_id: &str, exercise_id: &str) -> Option<&Exercise> {
        self.day(day_id)?.exercises.iter().find(|e| e.id == exercise_id)
    }

    pub fn exercise_mut(&mut self, day_id: &str, exercise_id: &str) -> Option<&mut Exercise> {
        self.days
            .iter_mut()
            .find(|d| d.id == day_id)?
            .exercises
            .iter_mut()
            .find(|e| e.id == exercise_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Day {
    #[serde(rename = "_id")]
    pub id: String,
    pub day_name: String,
    #[serde(default)]
    pub muscles_worked: Vec<String>,
    #[serde(default)]
    pub warmup_options: Vec<String>,
    #[serde(default)]
    pub explanation: String,
    #[serde(default)]
    pub exercises: Vec<Exercise>,
}

/// Completed-exercise tally for one day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCompletion {
    pub completed: usize,
    pub total: usize,
}

impl DayCompletion {
    /// Rounded percentage; an empty day counts as 0%.
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        ((self.completed as f64 / self.total as f64) * 100.0).round() as u8
    }
}

impl Day {
    pub fn completion(&self) -> DayCompletion {
        DayCompletion {
            completed: self.exercises.iter().filter(|e| e.completed).count(),
            total: self.exercises.len(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exercise {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub muscle_group: Vec<String>,
    #[serde(default)]
    pub sets: u32,
    #[serde(default)]
    pub reps: u32,
    #[serde(default)]
    pub reps_unit: RepsUnit,
    #[serde(default)]
    pub weight: f64,
    #[serde(default)]
    pub weight_unit: WeightUnit,
    #[serde(default)]
    pub rest: String,
    #[serde(default)]
    pub tips: Vec<String>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub videos: Vec<Video>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub circuit_id: Option<String>,
}

impl Exercise {
    pub fn current_video(&self) -> Option<&Video> {
        self.videos.iter().find(|v| v.is_current)
    }
}

/// Full routine document sent on create and update. Sub-documents without
/// `_id` are created by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoutinePayload {
    pub name: String,
    pub days: Vec<DayPayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayPayload {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub day_name: String,
    pub muscles_worked: Vec<String>,
    pub warmup_options: Vec<String>,
    pub explanation: String,
    pub exercises: Vec<ExercisePayload>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExercisePayload {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    pub muscle_group: Vec<String>,
    pub sets: u32,
    pub reps: u32,
    pub reps_unit: RepsUnit,
    pub weight: f64,
    pub weight_unit: WeightUnit,
    pub rest: String,
    pub tips: Vec<String>,
    pub completed: bool,
    pub videos: Vec<VideoPayload>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    // Always sent so clearing a circuit reaches the backend
    pub circuit_id: String,
}

/// Partial exercise update for `PUT /api/exercises/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sets: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reps_unit: Option<RepsUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weight_unit: Option<WeightUnit>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rest: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
    /// Video ids as stored by `POST /api/videos`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub videos: Option<Vec<String>>,
}

impl ExerciseUpdate {
    /// True when the update touches anything that belongs in the progress log.
    pub fn records_progress(&self) -> bool {
        self.name.is_some()
            || self.sets.is_some()
            || self.reps.is_some()
            || self.reps_unit.is_some()
            || self.weight.is_some()
            || self.weight_unit.is_some()
            || self.notes.is_some()
    }
}

/// Alternative exercise proposed by `POST /api/exercises/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExerciseSuggestion {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub sets: Option<u32>,
    #[serde(default)]
    pub reps: Option<u32>,
    #[serde(default)]
    pub reps_unit: Option<RepsUnit>,
    #[serde(default)]
    pub weight: Option<f64>,
    #[serde(default)]
    pub weight_unit: Option<WeightUnit>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video_url: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingLevel {
    Principiante,
    Intermedio,
    Avanzado,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrainingGoal {
    Fuerza,
    Hipertrofia,
    Resistencia,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Equipment {
    Gym,
    Casa,
    Pesas,
}

/// Input of `POST /api/routines/generate`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoutineGenerationRequest {
    pub level: TrainingLevel,
    pub goal: TrainingGoal,
    pub days: u8,
    pub equipment: Equipment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}
