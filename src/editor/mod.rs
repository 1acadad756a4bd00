//! Routine editing: the draft tree, its circuits and videos, and the
//! validate/clean/submit pipeline that turns it back into a saved routine.

pub mod circuit;
pub mod clean;
pub mod draft;
pub mod expandable;
pub mod id;
pub mod submission;
pub mod validation;
pub mod videos;
pub mod view;

pub use circuit::{group_by_circuit, next_circuit_id, CircuitGroup, CircuitGroups, CircuitMember};
pub use clean::clean;
pub use draft::{
    DayDraft, DayField, DayList, DraftAction, DraftError, ExerciseDraft, ExerciseField,
    ExerciseList, RoutineDraft,
};
pub use expandable::{Expandable, Node};
pub use id::{DraftToken, EntityId};
pub use submission::{
    EditError, EditorMode, RoutineBackend, RoutineEditor, Saved, SubmissionState, SubmitError,
};
pub use validation::{validate, ValidationIssue};
pub use videos::{VideoSlot, VideoSlots};
pub use view::RoutineView;
