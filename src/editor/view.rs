use crate::editor::circuit::{group_by_circuit, CircuitGroups};
use crate::editor::expandable::Expandable;
use crate::editor::id::EntityId;
use crate::models::{Day, DayCompletion, Exercise, Routine};

/// Read-only screen over a saved routine: one selected day and its exercises
/// as expandable cards.
#[derive(Debug, Clone)]
pub struct RoutineView {
    routine: Routine,
    selected_day: Option<String>,
    exercises: Expandable<Exercise>,
}

impl RoutineView {
    /// Opens on `remembered_day` when the routine still has it, otherwise on
    /// the first day.
    pub fn new(routine: Routine, remembered_day: Option<&str>) -> Self {
        let mut view = Self {
            routine,
            selected_day: None,
            exercises: Expandable::new(),
        };
        let initial = remembered_day
            .filter(|id| view.routine.day(id).is_some())
            .map(str::to_string)
            .or_else(|| view.routine.days.first().map(|d| d.id.clone()));
        if let Some(day_id) = initial {
            view.select_day(&day_id);
        }
        view
    }

    pub fn routine(&self) -> &Routine {
        &self.routine
    }

    pub fn selected_day_id(&self) -> Option<&str> {
        self.selected_day.as_deref()
    }

    pub fn selected_day(&self) -> Option<&Day> {
        self.routine.day(self.selected_day.as_deref()?)
    }

    /// Returns false, leaving the selection alone, for an unknown day.
    pub fn select_day(&mut self, day_id: &str) -> bool {
        let Some(day) = self.routine.day(day_id) else {
            return false;
        };
        self.exercises = day
            .exercises
            .iter()
            .map(|e| (EntityId::persisted(e.id.clone()), e.clone(), false))
            .collect();
        self.selected_day = Some(day_id.to_string());
        true
    }

    pub fn exercises(&self) -> &Expandable<Exercise> {
        &self.exercises
    }

    pub fn toggle_exercise(&mut self, exercise_id: &str) -> Option<bool> {
        self.exercises.toggle(&EntityId::persisted(exercise_id))
    }

    pub fn completion(&self) -> Option<DayCompletion> {
        self.selected_day().map(Day::completion)
    }

    pub fn circuits(&self) -> CircuitGroups<'_, Exercise> {
        group_by_circuit(self.exercises.items())
    }

    /// Swaps in a fresher copy of the routine. The selection and every open
    /// card whose id survived are kept.
    pub fn refresh(&mut self, routine: Routine) {
        let open: Vec<EntityId> = self
            .exercises
            .iter()
            .filter(|(_, node)| node.is_open)
            .map(|(id, _)| id.clone())
            .collect();
        let selected = self.selected_day.take();
        *self = RoutineView::new(routine, selected.as_deref());
        for id in &open {
            self.exercises.set_open(id, true);
        }
    }
}
