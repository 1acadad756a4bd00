use std::collections::HashSet;

use crate::models::{Exercise, Routine, Video};
use crate::store::{Lifecycle, Slice, SliceError};

/// Address of one exercise inside the loaded routines.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExerciseKey {
    pub routine_id: String,
    pub day_id: String,
    pub exercise_id: String,
}

impl ExerciseKey {
    pub fn new(
        routine_id: impl Into<String>,
        day_id: impl Into<String>,
        exercise_id: impl Into<String>,
    ) -> Self {
        Self {
            routine_id: routine_id.into(),
            day_id: day_id.into(),
            exercise_id: exercise_id.into(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutineState {
    pub routines: Vec<Routine>,
    pub selected_routine_id: Option<String>,
    pub loading: bool,
    pub error: Option<SliceError>,
    /// Exercises whose video list is being replaced.
    pub loading_videos: HashSet<ExerciseKey>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RoutineAction {
    FetchAll(Lifecycle<Vec<Routine>>),
    FetchOne(Lifecycle<Routine>),
    Create(Lifecycle<Routine>),
    Update(Lifecycle<Routine>),
    /// Carries the deleted routine's id.
    Delete(Lifecycle<String>),
    Generate(Lifecycle<Routine>),
    UpdateExercise { key: ExerciseKey, result: Lifecycle<Exercise> },
    SetCompleted { key: ExerciseKey, result: Lifecycle<bool> },
    SetVideos { key: ExerciseKey, result: Lifecycle<Vec<Video>> },
    Reset,
}

impl RoutineState {
    pub fn selected(&self) -> Option<&Routine> {
        let id = self.selected_routine_id.as_deref()?;
        self.routine(id)
    }

    pub fn routine(&self, routine_id: &str) -> Option<&Routine> {
        self.routines.iter().find(|r| r.id == routine_id)
    }

    pub fn exercise(&self, key: &ExerciseKey) -> Option<&Exercise> {
        self.routine(&key.routine_id)?
            .exercise(&key.day_id, &key.exercise_id)
    }

    pub fn is_loading_videos(&self, key: &ExerciseKey) -> bool {
        self.loading_videos.contains(key)
    }

    /// Only routines that are loaded can be selected.
    pub fn select(&mut self, routine_id: &str) -> Result<(), SliceError> {
        if self.routine(routine_id).is_none() {
            let error = SliceError::new(format!("Routine {} not found", routine_id));
            self.error = Some(error.clone());
            return Err(error);
        }
        self.selected_routine_id = Some(routine_id.to_string());
        Ok(())
    }

    pub fn reduce(&mut self, action: RoutineAction) {
        match action {
            RoutineAction::FetchAll(lifecycle) => self.settle(lifecycle, |state, routines| {
                state.selected_routine_id = routines.first().map(|r| r.id.clone());
                state.routines = routines;
            }),
            RoutineAction::FetchOne(lifecycle) => self.settle(lifecycle, |state, routine| {
                state.selected_routine_id = Some(routine.id.clone());
                state.upsert(routine);
            }),
            RoutineAction::Create(lifecycle) | RoutineAction::Generate(lifecycle) => {
                self.settle(lifecycle, |state, routine| {
                    state.selected_routine_id = Some(routine.id.clone());
                    state.routines.push(routine);
                })
            }
            RoutineAction::Update(lifecycle) => self.settle(lifecycle, |state, routine| {
                if let Some(existing) = state.routines.iter_mut().find(|r| r.id == routine.id) {
                    *existing = routine;
                }
            }),
            RoutineAction::Delete(lifecycle) => self.settle(lifecycle, |state, routine_id| {
                state.routines.retain(|r| r.id != routine_id);
                state.selected_routine_id = state.routines.first().map(|r| r.id.clone());
            }),
            RoutineAction::UpdateExercise { key, result } => self.settle(result, |state, exercise| {
                if let Some(existing) = state.exercise_mut(&key) {
                    *existing = exercise;
                }
            }),
            RoutineAction::SetCompleted { key, result } => self.settle(result, |state, completed| {
                if let Some(existing) = state.exercise_mut(&key) {
                    existing.completed = completed;
                }
            }),
            RoutineAction::SetVideos { key, result } => self.reduce_videos(key, result),
            RoutineAction::Reset => *self = RoutineState::default(),
        }
    }

    // Video replacement only flags its own exercise, not the whole slice.
    fn reduce_videos(&mut self, key: ExerciseKey, result: Lifecycle<Vec<Video>>) {
        match result {
            Lifecycle::Pending => {
                self.loading_videos.insert(key);
            }
            Lifecycle::Fulfilled(videos) => {
                if let Some(existing) = self.exercise_mut(&key) {
                    existing.videos = videos;
                }
                self.loading_videos.remove(&key);
            }
            Lifecycle::Rejected(error) => {
                self.loading_videos.remove(&key);
                self.error = Some(error);
            }
        }
    }

    fn upsert(&mut self, routine: Routine) {
        match self.routines.iter_mut().find(|r| r.id == routine.id) {
            Some(existing) => *existing = routine,
            None => self.routines.push(routine),
        }
    }

    fn exercise_mut(&mut self, key: &ExerciseKey) -> Option<&mut Exercise> {
        self.routines
            .iter_mut()
            .find(|r| r.id == key.routine_id)?
            .exercise_mut(&key.day_id, &key.exercise_id)
    }
}

impl Slice for RoutineState {
    fn status_mut(&mut self) -> (&mut bool, &mut Option<SliceError>) {
        (&mut self.loading, &mut self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Day, RepsUnit, WeightUnit};

    fn routine(id: &str) -> Routine {
        Routine {
            id: id.into(),
            user_id: "u-1".into(),
            coach_id: None,
            name: format!("Rutina {}", id),
            days: vec![Day {
                id: "d-1".into(),
                day_name: "Lunes".into(),
                muscles_worked: vec![],
                warmup_options: vec![],
                explanation: String::new(),
                exercises: vec![Exercise {
                    id: "ex-1".into(),
                    name: "Curl".into(),
                    muscle_group: vec!["bíceps".into()],
                    sets: 3,
                    reps: 10,
                    reps_unit: RepsUnit::Count,
                    weight: 12.0,
                    weight_unit: WeightUnit::Kg,
                    rest: "60".into(),
                    tips: vec![],
                    completed: false,
                    videos: vec![],
                    notes: None,
                    circuit_id: None,
                }],
            }],
            created_at: None,
            updated_at: None,
        }
    }

    fn loaded(ids: &[&str]) -> RoutineState {
        let mut state = RoutineState::default();
        state.reduce(RoutineAction::FetchAll(Lifecycle::Fulfilled(
            ids.iter().map(|id| routine(id)).collect(),
        )));
        state
    }

    #[test]
    fn fetch_all_selects_the_first_routine() {
        let mut state = RoutineState::default();
        state.reduce(RoutineAction::FetchAll(Lifecycle::Pending));
        assert!(state.loading);
        state.reduce(RoutineAction::FetchAll(Lifecycle::Fulfilled(vec![routine("a"), routine("b")])));
        assert!(!state.loading);
        assert_eq!(state.selected_routine_id.as_deref(), Some("a"));
    }

    #[test]
    fn delete_selects_first_remaining() {
        let mut state = loaded(&["a", "b", "c"]);
        state.select("c").unwrap();
        state.reduce(RoutineAction::Delete(Lifecycle::Fulfilled("c".into())));
        assert_eq!(state.routines.len(), 2);
        assert_eq!(state.selected_routine_id.as_deref(), Some("a"));

        state.reduce(RoutineAction::Delete(Lifecycle::Fulfilled("a".into())));
        state.reduce(RoutineAction::Delete(Lifecycle::Fulfilled("b".into())));
        assert_eq!(state.selected_routine_id, None);
    }

    #[test]
    fn selecting_an_unknown_routine_is_rejected() {
        let mut state = loaded(&["a", "b"]);
        assert!(state.select("zzz").is_err());
        assert_eq!(state.selected_routine_id.as_deref(), Some("a"));
        assert!(state.error.is_some());
        assert!(state.select("b").is_ok());
        assert_eq!(state.selected().unwrap().id, "b");
    }

    #[test]
    fn create_and_generate_append_and_select() {
        let mut state = loaded(&["a"]);
        state.reduce(RoutineAction::Create(Lifecycle::Fulfilled(routine("b"))));
        assert_eq!(state.selected_routine_id.as_deref(), Some("b"));
        state.reduce(RoutineAction::Generate(Lifecycle::Fulfilled(routine("ai"))));
        assert_eq!(state.routines.len(), 3);
        assert_eq!(state.selected_routine_id.as_deref(), Some("ai"));
    }

    #[test]
    fn fetch_one_replaces_or_appends() {
        let mut state = loaded(&["a"]);
        let mut renamed = routine("a");
        renamed.name = "Nueva".into();
        state.reduce(RoutineAction::FetchOne(Lifecycle::Fulfilled(renamed)));
        assert_eq!(state.routines.len(), 1);
        assert_eq!(state.routines[0].name, "Nueva");
        state.reduce(RoutineAction::FetchOne(Lifecycle::Fulfilled(routine("b"))));
        assert_eq!(state.routines.len(), 2);
        assert_eq!(state.selected_routine_id.as_deref(), Some("b"));
    }

    #[test]
    fn exercise_updates_land_in_place() {
        let mut state = loaded(&["a"]);
        let key = ExerciseKey::new("a", "d-1", "ex-1");
        let mut updated = state.exercise(&key).unwrap().clone();
        updated.weight = 15.0;
        state.reduce(RoutineAction::UpdateExercise {
            key: key.clone(),
            result: Lifecycle::Fulfilled(updated),
        });
        assert_eq!(state.exercise(&key).unwrap().weight, 15.0);

        state.reduce(RoutineAction::SetCompleted {
            key: key.clone(),
            result: Lifecycle::Fulfilled(true),
        });
        assert!(state.exercise(&key).unwrap().completed);
    }

    #[test]
    fn video_loading_is_tracked_per_exercise() {
        let mut state = loaded(&["a"]);
        let key = ExerciseKey::new("a", "d-1", "ex-1");
        state.reduce(RoutineAction::SetVideos { key: key.clone(), result: Lifecycle::Pending });
        assert!(state.is_loading_videos(&key));
        assert!(!state.loading);

        let videos = vec![Video { id: "v-1".into(), url: "https://v/1".into(), is_current: true }];
        state.reduce(RoutineAction::SetVideos {
            key: key.clone(),
            result: Lifecycle::Fulfilled(videos.clone()),
        });
        assert!(!state.is_loading_videos(&key));
        assert_eq!(state.exercise(&key).unwrap().videos, videos);
    }

    #[test]
    fn rejection_records_the_error() {
        let mut state = loaded(&["a"]);
        state.reduce(RoutineAction::Update(Lifecycle::Rejected(SliceError::new("boom"))));
        assert_eq!(state.error.as_ref().unwrap().message, "boom");
        assert_eq!(state.routines.len(), 1);
    }
}
