use crate::editor::draft::{DayDraft, ExerciseDraft, RoutineDraft};
use crate::editor::id::EntityId;
use crate::models::{DayPayload, ExercisePayload, RoutinePayload};

/// Strips editor state from a draft. Only persisted ids survive; everything
/// created in this session goes out without `_id` for the backend to assign.
/// Every other field, names included, goes out exactly as typed.
pub fn clean(draft: &RoutineDraft) -> RoutinePayload {
    RoutinePayload {
        name: draft.name().to_string(),
        days: draft
            .days()
            .iter()
            .map(|(id, node)| clean_day(id, &node.item))
            .collect(),
    }
}

fn clean_day(id: &EntityId, day: &DayDraft) -> DayPayload {
    DayPayload {
        id: id.as_persisted().map(str::to_string),
        day_name: day.day_name.clone(),
        muscles_worked: day.muscles_worked.clone(),
        warmup_options: day.warmup_options.clone(),
        explanation: day.explanation.clone(),
        exercises: day
            .exercises
            .iter()
            .map(|(id, node)| clean_exercise(id, &node.item))
            .collect(),
    }
}

fn clean_exercise(id: &EntityId, exercise: &ExerciseDraft) -> ExercisePayload {
    ExercisePayload {
        id: id.as_persisted().map(str::to_string),
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
        videos: exercise.videos.to_payload(),
        notes: exercise.notes.clone(),
        circuit_id: exercise.circuit_id.clone(),
    }
}
