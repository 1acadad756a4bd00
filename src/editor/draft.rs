use std::str::FromStr;

use crate::editor::circuit::{circuit_ids, next_circuit_id, CircuitMember};
use crate::editor::expandable::Expandable;
use crate::editor::id::EntityId;
use crate::editor::videos::VideoSlots;
use crate::models::{Day, Exercise, RepsUnit, Routine, WeightUnit};

const DEFAULT_SETS: u32 = 3;
const DEFAULT_REPS: u32 = 10;
const DEFAULT_REST: &str = "60";

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DraftError {
    #[error("A routine needs at least one day")]
    LastDay,

    #[error("Day {0} not found")]
    DayNotFound(EntityId),

    #[error("Exercise {0} not found")]
    ExerciseNotFound(EntityId),

    #[error("Video {0} not found")]
    VideoNotFound(EntityId),

    #[error("Invalid value {value:?} for {field}")]
    InvalidValue { field: &'static str, value: String },

    #[error("Unknown field {0}")]
    UnknownField(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayField {
    DayName,
    MusclesWorked,
    WarmupOptions,
    Explanation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseField {
    Name,
    MuscleGroup,
    Sets,
    Reps,
    RepsUnit,
    Weight,
    WeightUnit,
    Rest,
    Tips,
    Notes,
    CircuitId,
    Completed,
}

impl DayField {
    pub fn as_str(&self) -> &'static str {
        match self {
            DayField::DayName => "dayName",
            DayField::MusclesWorked => "musclesWorked",
            DayField::WarmupOptions => "warmupOptions",
            DayField::Explanation => "explanation",
        }
    }
}

impl ExerciseField {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseField::Name => "name",
            ExerciseField::MuscleGroup => "muscleGroup",
            ExerciseField::Sets => "sets",
            ExerciseField::Reps => "reps",
            ExerciseField::RepsUnit => "repsUnit",
            ExerciseField::Weight => "weight",
            ExerciseField::WeightUnit => "weightUnit",
            ExerciseField::Rest => "rest",
            ExerciseField::Tips => "tips",
            ExerciseField::Notes => "notes",
            ExerciseField::CircuitId => "circuitId",
            ExerciseField::Completed => "completed",
        }
    }
}

impl FromStr for DayField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            DayField::DayName,
            DayField::MusclesWorked,
            DayField::WarmupOptions,
            DayField::Explanation,
        ]
        .into_iter()
        .find(|field| field.as_str() == s)
        .ok_or_else(|| DraftError::UnknownField(s.to_string()))
    }
}

impl FromStr for ExerciseField {
    type Err = DraftError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            ExerciseField::Name,
            ExerciseField::MuscleGroup,
            ExerciseField::Sets,
            ExerciseField::Reps,
            ExerciseField::RepsUnit,
            ExerciseField::Weight,
            ExerciseField::WeightUnit,
            ExerciseField::Rest,
            ExerciseField::Tips,
            ExerciseField::Notes,
            ExerciseField::CircuitId,
            ExerciseField::Completed,
        ]
        .into_iter()
        .find(|field| field.as_str() == s)
        .ok_or_else(|| DraftError::UnknownField(s.to_string()))
    }
}

/// Day fields that hold several items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayList {
    MusclesWorked,
    WarmupOptions,
}

/// Exercise fields that hold several items.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseList {
    MuscleGroup,
    Tips,
}

/// Comma-separated input as typed in a form field.
pub fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn parse_count(field: &'static str, value: &str) -> Result<u32, DraftError> {
    value.trim().parse::<u32>().map_err(|_| DraftError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

fn parse_weight(value: &str) -> Result<f64, DraftError> {
    match value.trim().parse::<f64>() {
        Ok(weight) if weight.is_finite() && weight >= 0.0 => Ok(weight),
        _ => Err(DraftError::InvalidValue {
            field: "weight",
            value: value.to_string(),
        }),
    }
}

fn parse_with<T: FromStr>(field: &'static str, value: &str) -> Result<T, DraftError> {
    value.trim().parse::<T>().map_err(|_| DraftError::InvalidValue {
        field,
        value: value.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseDraft {
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
    pub videos: VideoSlots,
    pub notes: Option<String>,
    /// Empty when the exercise is not part of a circuit.
    pub circuit_id: String,
}

impl ExerciseDraft {
    pub fn blank() -> Self {
        Self {
            name: String::new(),
            muscle_group: Vec::new(),
            sets: DEFAULT_SETS,
            reps: DEFAULT_REPS,
            reps_unit: RepsUnit::Count,
            weight: 0.0,
            weight_unit: WeightUnit::Kg,
            rest: DEFAULT_REST.to_string(),
            tips: Vec::new(),
            completed: false,
            videos: VideoSlots::new(),
            notes: None,
            circuit_id: String::new(),
        }
    }

    pub fn from_exercise(exercise: &Exercise) -> Self {
        Self {
            name: exercise.name.clone(),
            muscle_group: exercise.muscle_group.clone(),
            sets: exercise.sets,
            reps: exercise.reps,
            reps_unit: exercise.reps_unit,
            weight: exercise.weight,
            weight_unit: exercise.weight_unit,
            rest: exercise.rest.clone(),
            tips: exercise.tips.clone(),
            completed: exercise.completed,
            videos: VideoSlots::from_videos(&exercise.videos),
            notes: exercise.notes.clone(),
            circuit_id: exercise.circuit_id.clone().unwrap_or_default(),
        }
    }

    fn set_field(&mut self, field: ExerciseField, value: &str) -> Result<(), DraftError> {
        match field {
            ExerciseField::Name => self.name = value.to_string(),
            ExerciseField::MuscleGroup => self.muscle_group = split_list(value),
            ExerciseField::Sets => self.sets = parse_count("sets", value)?,
            ExerciseField::Reps => self.reps = parse_count("reps", value)?,
            ExerciseField::RepsUnit => self.reps_unit = parse_with("repsUnit", value)?,
            ExerciseField::Weight => self.weight = parse_weight(value)?,
            ExerciseField::WeightUnit => self.weight_unit = parse_with("weightUnit", value)?,
            ExerciseField::Rest => self.rest = value.to_string(),
            ExerciseField::Tips => self.tips = split_list(value),
            ExerciseField::Notes => {
                self.notes = if value.is_empty() { None } else { Some(value.to_string()) }
            }
            ExerciseField::CircuitId => self.circuit_id = value.to_string(),
            ExerciseField::Completed => self.completed = parse_with("completed", value)?,
        }
        Ok(())
    }

    fn list_mut(&mut self, list: ExerciseList) -> &mut Vec<String> {
        match list {
            ExerciseList::MuscleGroup => &mut self.muscle_group,
            ExerciseList::Tips => &mut self.tips,
        }
    }
}

impl CircuitMember for ExerciseDraft {
    fn circuit_id(&self) -> Option<&str> {
        Some(self.circuit_id.as_str()).filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayDraft {
    pub day_name: String,
    pub muscles_worked: Vec<String>,
    pub warmup_options: Vec<String>,
    pub explanation: String,
    pub exercises: Expandable<ExerciseDraft>,
}

impl DayDraft {
    pub fn named(day_name: impl Into<String>) -> Self {
        Self {
            day_name: day_name.into(),
            muscles_worked: Vec::new(),
            warmup_options: Vec::new(),
            explanation: String::new(),
            exercises: Expandable::new(),
        }
    }

    pub fn from_day(day: &Day) -> Self {
        Self {
            day_name: day.day_name.clone(),
            muscles_worked: day.muscles_worked.clone(),
            warmup_options: day.warmup_options.clone(),
            explanation: day.explanation.clone(),
            exercises: day
                .exercises
                .iter()
                .map(|e| {
                    let id = EntityId::persisted(e.id.clone());
                    (id, ExerciseDraft::from_exercise(e), false)
                })
                .collect(),
        }
    }

    fn set_field(&mut self, field: DayField, value: &str) {
        match field {
            DayField::DayName => self.day_name = value.to_string(),
            DayField::MusclesWorked => self.muscles_worked = split_list(value),
            DayField::WarmupOptions => self.warmup_options = split_list(value),
            DayField::Explanation => self.explanation = value.to_string(),
        }
    }

    fn list_mut(&mut self, list: DayList) -> &mut Vec<String> {
        match list {
            DayList::MusclesWorked => &mut self.muscles_worked,
            DayList::WarmupOptions => &mut self.warmup_options,
        }
    }
}

/// Every mutation the editor understands.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftAction {
    RenameRoutine(String),
    AddDay,
    DeleteDay { day: EntityId },
    AddExercise { day: EntityId },
    DeleteExercise { day: EntityId, exercise: EntityId },
    EditDay {
        day: EntityId,
        field: DayField,
        value: String,
    },
    EditExercise {
        day: EntityId,
        exercise: EntityId,
        field: ExerciseField,
        value: String,
    },
    /// Replaces a whole list; items are kept as given, commas included.
    SetDayList {
        day: EntityId,
        list: DayList,
        items: Vec<String>,
    },
    SetExerciseList {
        day: EntityId,
        exercise: EntityId,
        list: ExerciseList,
        items: Vec<String>,
    },
    ToggleDay { day: EntityId },
    ToggleExercise { day: EntityId, exercise: EntityId },
    ToggleAll,
    AssignNewCircuit { day: EntityId, exercise: EntityId },
    AddVideo { day: EntityId, exercise: EntityId, url: String },
    RemoveVideo { day: EntityId, exercise: EntityId, video: EntityId },
    SetCurrentVideo { day: EntityId, exercise: EntityId, video: EntityId },
}

type OpenState = Vec<(EntityId, bool, Vec<(EntityId, bool)>)>;

/// Editable copy of a routine, detached from the persisted one until saved.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutineDraft {
    name: String,
    days: Expandable<DayDraft>,
    all_expanded: bool,
    // Open flags from before the last toggle-all; only valid while nothing
    // else has happened since.
    toggle_undo: Option<OpenState>,
}

impl Default for RoutineDraft {
    fn default() -> Self {
        Self::new()
    }
}

impl RoutineDraft {
    /// Create flow: one open day named `Día 1`, no exercises.
    pub fn new() -> Self {
        let mut days = Expandable::new();
        days.push(EntityId::new_draft(), DayDraft::named(day_label(1)), true);
        Self {
            name: String::new(),
            days,
            all_expanded: false,
            toggle_undo: None,
        }
    }

    /// Edit flow: everything collapsed.
    pub fn from_routine(routine: &Routine) -> Self {
        Self {
            name: routine.name.clone(),
            days: routine
                .days
                .iter()
                .map(|d| (EntityId::persisted(d.id.clone()), DayDraft::from_day(d), false))
                .collect(),
            all_expanded: false,
            toggle_undo: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn days(&self) -> &Expandable<DayDraft> {
        &self.days
    }

    pub fn day(&self, day: &EntityId) -> Option<&DayDraft> {
        self.days.get(day)
    }

    pub fn day_id_at(&self, index: usize) -> Option<&EntityId> {
        self.days.id_at(index)
    }

    pub fn exercise(&self, day: &EntityId, exercise: &EntityId) -> Option<&ExerciseDraft> {
        self.days.get(day)?.exercises.get(exercise)
    }

    pub fn all_expanded(&self) -> bool {
        self.all_expanded
    }

    /// Pure form of `dispatch`: the receiver is left as it was.
    pub fn apply(&self, action: DraftAction) -> Result<Self, DraftError> {
        let mut next = self.clone();
        next.dispatch(action)?;
        Ok(next)
    }

    /// Applies one action in place. Returns the id of the entity the action
    /// created, if any. On error the draft is unchanged.
    pub fn dispatch(&mut self, action: DraftAction) -> Result<Option<EntityId>, DraftError> {
        match action {
            DraftAction::RenameRoutine(name) => {
                self.rename(name);
                Ok(None)
            }
            DraftAction::AddDay => Ok(Some(self.add_day())),
            DraftAction::DeleteDay { day } => self.delete_day(&day).map(|_| None),
            DraftAction::AddExercise { day } => self.add_exercise(&day).map(Some),
            DraftAction::DeleteExercise { day, exercise } => {
                self.delete_exercise(&day, &exercise).map(|_| None)
            }
            DraftAction::EditDay { day, field, value } => {
                self.edit_day(&day, field, &value).map(|_| None)
            }
            DraftAction::EditExercise { day, exercise, field, value } => {
                self.edit_exercise(&day, &exercise, field, &value).map(|_| None)
            }
            DraftAction::SetDayList { day, list, items } => {
                self.set_day_list(&day, list, items).map(|_| None)
            }
            DraftAction::SetExerciseList { day, exercise, list, items } => {
                self.set_exercise_list(&day, &exercise, list, items).map(|_| None)
            }
            DraftAction::ToggleDay { day } => self.toggle_day(&day).map(|_| None),
            DraftAction::ToggleExercise { day, exercise } => {
                self.toggle_exercise(&day, &exercise).map(|_| None)
            }
            DraftAction::ToggleAll => {
                self.toggle_all();
                Ok(None)
            }
            DraftAction::AssignNewCircuit { day, exercise } => {
                self.assign_new_circuit(&day, &exercise).map(|_| None)
            }
            DraftAction::AddVideo { day, exercise, url } => {
                self.add_video(&day, &exercise, url).map(Some)
            }
            DraftAction::RemoveVideo { day, exercise, video } => {
                self.remove_video(&day, &exercise, &video).map(|_| None)
            }
            DraftAction::SetCurrentVideo { day, exercise, video } => {
                self.set_current_video(&day, &exercise, &video).map(|_| None)
            }
        }
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.touched();
    }

    pub fn add_day(&mut self) -> EntityId {
        let id = EntityId::new_draft();
        let label = day_label(self.days.len() + 1);
        self.days.push(id.clone(), DayDraft::named(label), true);
        self.touched();
        id
    }

    pub fn delete_day(&mut self, day: &EntityId) -> Result<DayDraft, DraftError> {
        if !self.days.contains(day) {
            return Err(DraftError::DayNotFound(day.clone()));
        }
        if self.days.len() <= 1 {
            return Err(DraftError::LastDay);
        }
        let removed = self
            .days
            .remove(day)
            .ok_or_else(|| DraftError::DayNotFound(day.clone()))?;
        self.touched();
        Ok(removed)
    }

    pub fn add_exercise(&mut self, day: &EntityId) -> Result<EntityId, DraftError> {
        let id = EntityId::new_draft();
        self.day_mut(day)?
            .exercises
            .push(id.clone(), ExerciseDraft::blank(), true);
        self.touched();
        Ok(id)
    }

    pub fn delete_exercise(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
    ) -> Result<ExerciseDraft, DraftError> {
        let removed = self
            .day_mut(day)?
            .exercises
            .remove(exercise)
            .ok_or_else(|| DraftError::ExerciseNotFound(exercise.clone()))?;
        self.touched();
        Ok(removed)
    }

    pub fn edit_day(
        &mut self,
        day: &EntityId,
        field: DayField,
        value: &str,
    ) -> Result<(), DraftError> {
        self.day_mut(day)?.set_field(field, value);
        self.touched();
        Ok(())
    }

    pub fn edit_exercise(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
        field: ExerciseField,
        value: &str,
    ) -> Result<(), DraftError> {
        // set_field parses before it assigns, so a bad value leaves no trace
        self.exercise_mut(day, exercise)?.set_field(field, value)?;
        self.touched();
        Ok(())
    }

    pub fn set_day_list(
        &mut self,
        day: &EntityId,
        list: DayList,
        items: Vec<String>,
    ) -> Result<(), DraftError> {
        *self.day_mut(day)?.list_mut(list) = items;
        self.touched();
        Ok(())
    }

    pub fn set_exercise_list(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
        list: ExerciseList,
        items: Vec<String>,
    ) -> Result<(), DraftError> {
        *self.exercise_mut(day, exercise)?.list_mut(list) = items;
        self.touched();
        Ok(())
    }

    pub fn toggle_day(&mut self, day: &EntityId) -> Result<bool, DraftError> {
        let is_open = self
            .days
            .toggle(day)
            .ok_or_else(|| DraftError::DayNotFound(day.clone()))?;
        self.touched();
        Ok(is_open)
    }

    pub fn toggle_exercise(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
    ) -> Result<bool, DraftError> {
        let is_open = self
            .day_mut(day)?
            .exercises
            .toggle(exercise)
            .ok_or_else(|| DraftError::ExerciseNotFound(exercise.clone()))?;
        self.touched();
        Ok(is_open)
    }

    /// Expand all / collapse all. Two in a row put every flag back where it
    /// was before the first.
    pub fn toggle_all(&mut self) {
        let before = self.open_state();
        match self.toggle_undo.take() {
            Some(previous) => self.restore_open_state(&previous),
            None => {
                let target = !self.all_expanded;
                self.days.set_all_open(target);
                for day in self.days.values_mut() {
                    day.exercises.set_all_open(target);
                }
            }
        }
        self.all_expanded = !self.all_expanded;
        self.toggle_undo = Some(before);
    }

    /// Puts the exercise in a brand-new circuit of its day; returns its id.
    pub fn assign_new_circuit(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
    ) -> Result<String, DraftError> {
        let day_draft = self.day_mut(day)?;
        if !day_draft.exercises.contains(exercise) {
            return Err(DraftError::ExerciseNotFound(exercise.clone()));
        }
        let circuit = next_circuit_id(&circuit_ids(day_draft.exercises.items()));
        if let Some(target) = day_draft.exercises.get_mut(exercise) {
            target.circuit_id = circuit.clone();
        }
        self.touched();
        Ok(circuit)
    }

    pub fn add_video(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
        url: String,
    ) -> Result<EntityId, DraftError> {
        let id = self.exercise_mut(day, exercise)?.videos.add(url);
        self.touched();
        Ok(id)
    }

    pub fn remove_video(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
        video: &EntityId,
    ) -> Result<(), DraftError> {
        self.exercise_mut(day, exercise)?
            .videos
            .remove(video)
            .ok_or_else(|| DraftError::VideoNotFound(video.clone()))?;
        self.touched();
        Ok(())
    }

    pub fn set_current_video(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
        video: &EntityId,
    ) -> Result<(), DraftError> {
        if !self.exercise_mut(day, exercise)?.videos.set_current(video) {
            return Err(DraftError::VideoNotFound(video.clone()));
        }
        self.touched();
        Ok(())
    }

    fn day_mut(&mut self, day: &EntityId) -> Result<&mut DayDraft, DraftError> {
        self.days
            .get_mut(day)
            .ok_or_else(|| DraftError::DayNotFound(day.clone()))
    }

    fn exercise_mut(
        &mut self,
        day: &EntityId,
        exercise: &EntityId,
    ) -> Result<&mut ExerciseDraft, DraftError> {
        self.day_mut(day)?
            .exercises
            .get_mut(exercise)
            .ok_or_else(|| DraftError::ExerciseNotFound(exercise.clone()))
    }

    fn touched(&mut self) {
        self.toggle_undo = None;
    }

    fn open_state(&self) -> OpenState {
        self.days
            .iter()
            .map(|(id, node)| {
                let exercises = node
                    .item
                    .exercises
                    .iter()
                    .map(|(ex_id, ex)| (ex_id.clone(), ex.is_open))
                    .collect();
                (id.clone(), node.is_open, exercises)
            })
            .collect()
    }

    fn restore_open_state(&mut self, state: &OpenState) {
        for (day_id, day_open, exercises) in state {
            self.days.set_open(day_id, *day_open);
            if let Some(day) = self.days.get_mut(day_id) {
                for (exercise_id, exercise_open) in exercises {
                    day.exercises.set_open(exercise_id, *exercise_open);
                }
            }
        }
    }
}

fn day_label(number: usize) -> String {
    format!("Día {}", number)
}
