pub mod progress;
pub mod routine;
pub mod user;
pub mod video;

pub use progress::{NewProgressEntry, ProgressEntry};
pub use routine::{
    Day, DayCompletion, DayPayload, Equipment, Exercise, ExercisePayload, ExerciseSuggestion,
    ExerciseUpdate, RepsUnit, Routine, RoutineGenerationRequest, RoutinePayload, TrainingGoal,
    TrainingLevel, WeightUnit,
};
pub use user::{ClientUpdate, CoachRequest, CoachRequestStatus, ProfileUpdate, Role, User};
pub use video::{Video, VideoCandidate, VideoPayload};
