use crate::editor::draft::RoutineDraft;
use crate::editor::id::EntityId;

/// One blocking problem in a draft. Positions are 1-based, as shown on screen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationIssue {
    #[error("The routine needs a name")]
    MissingRoutineName,

    #[error("Day {position} needs a name")]
    MissingDayName { day: EntityId, position: usize },

    #[error("Exercise {position} in \"{day_name}\" needs a name")]
    MissingExerciseName {
        day: EntityId,
        day_name: String,
        exercise: EntityId,
        position: usize,
    },
}

/// Checks every name in the draft and reports all issues at once, in display
/// order. Whitespace-only names count as empty.
pub fn validate(draft: &RoutineDraft) -> Result<(), Vec<ValidationIssue>> {
    let mut issues = Vec::new();

    if is_blank(draft.name()) {
        issues.push(ValidationIssue::MissingRoutineName);
    }

    for (day_index, (day_id, day_node)) in draft.days().iter().enumerate() {
        let day = &day_node.item;
        let day_label = if is_blank(&day.day_name) {
            issues.push(ValidationIssue::MissingDayName {
                day: day_id.clone(),
                position: day_index + 1,
            });
            format!("Día {}", day_index + 1)
        } else {
            day.day_name.trim().to_string()
        };

        for (exercise_index, (exercise_id, exercise)) in day.exercises.iter().enumerate() {
            if is_blank(&exercise.item.name) {
                issues.push(ValidationIssue::MissingExerciseName {
                    day: day_id.clone(),
                    day_name: day_label.clone(),
                    exercise: exercise_id.clone(),
                    position: exercise_index + 1,
                });
            }
        }
    }

    if issues.is_empty() {
        Ok(())
    } else {
        Err(issues)
    }
}

fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}
