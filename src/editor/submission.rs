use async_trait::async_trait;

use crate::editor::clean::clean;
use crate::editor::draft::{DraftAction, DraftError, RoutineDraft};
use crate::editor::id::EntityId;
use crate::editor::validation::{validate, ValidationIssue};
use crate::models::{Routine, RoutinePayload};
use crate::routes::Route;
use crate::services::ApiError;

/// The three calls the editor needs from the backend.
#[async_trait]
pub trait RoutineBackend: Send + Sync {
    async fn create_routine(&self, payload: &RoutinePayload) -> Result<Routine, ApiError>;
    async fn update_routine(
        &self,
        routine_id: &str,
        payload: &RoutinePayload,
    ) -> Result<Routine, ApiError>;
    async fn delete_routine(&self, routine_id: &str) -> Result<(), ApiError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    Create,
    Edit { routine_id: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    /// `error` carries the message of the last failed request, if any.
    Editing { error: Option<String> },
    Invalid(Vec<ValidationIssue>),
    Submitting,
    Succeeded,
    SessionExpired,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error("The routine has {} problem(s) to fix", .0.len())]
    Invalid(Vec<ValidationIssue>),

    #[error("A request for this routine is already in progress")]
    AlreadyPending,

    #[error("Only saved routines can be deleted")]
    NotPersisted,

    #[error("Session expired")]
    SessionExpired,

    #[error("Could not reach the server, try again: {0}")]
    Failed(#[source] ApiError),
}

impl SubmitError {
    /// Where the user goes after this failure; `None` keeps them on the form.
    pub fn route(&self) -> Option<Route> {
        match self {
            SubmitError::SessionExpired => Some(Route::Login),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Saved {
    pub routine: Routine,
    pub route: Route,
}

/// One open routine form: the draft, what it will be saved as, and where the
/// last submission got to.
#[derive(Debug, Clone)]
pub struct RoutineEditor {
    mode: EditorMode,
    draft: RoutineDraft,
    state: SubmissionState,
}

impl RoutineEditor {
    pub fn create() -> Self {
        Self {
            mode: EditorMode::Create,
            draft: RoutineDraft::new(),
            state: SubmissionState::Editing { error: None },
        }
    }

    pub fn edit(routine: &Routine) -> Self {
        Self {
            mode: EditorMode::Edit {
                routine_id: routine.id.clone(),
            },
            draft: RoutineDraft::from_routine(routine),
            state: SubmissionState::Editing { error: None },
        }
    }

    pub fn mode(&self) -> &EditorMode {
        &self.mode
    }

    pub fn draft(&self) -> &RoutineDraft {
        &self.draft
    }

    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Edits stay open while a request is out; the next submit sends them.
    /// An editor whose session expired is closed for good.
    pub fn dispatch(&mut self, action: DraftAction) -> Result<Option<EntityId>, EditError> {
        if self.state == SubmissionState::SessionExpired {
            return Err(EditError::SessionExpired);
        }
        let created = self.draft.dispatch(action)?;
        if let SubmissionState::Invalid(_) = self.state {
            self.state = SubmissionState::Editing { error: None };
        }
        Ok(created)
    }

    /// Local check only; never touches the network.
    pub fn validate(&mut self) -> Result<(), Vec<ValidationIssue>> {
        validate(&self.draft).map_err(|issues| {
            self.state = SubmissionState::Invalid(issues.clone());
            issues
        })
    }

    /// Validates, cleans and sends the whole routine in one request.
    #[tracing::instrument(name = "Submit routine", skip(self, backend), fields(mode = ?self.mode))]
    pub async fn submit<B>(&mut self, backend: &B) -> Result<Saved, SubmitError>
    where
        B: RoutineBackend + ?Sized,
    {
        match self.state {
            SubmissionState::Submitting => return Err(SubmitError::AlreadyPending),
            SubmissionState::SessionExpired => return Err(SubmitError::SessionExpired),
            _ => {}
        }
        if let Err(issues) = self.validate() {
            tracing::debug!("Routine draft has {} validation issues", issues.len());
            return Err(SubmitError::Invalid(issues));
        }

        let payload = clean(&self.draft);
        self.state = SubmissionState::Submitting;
        let result = match &self.mode {
            EditorMode::Create => backend.create_routine(&payload).await,
            EditorMode::Edit { routine_id } => backend.update_routine(routine_id, &payload).await,
        };

        match result {
            Ok(routine) => {
                tracing::info!("✅ Routine {} saved", routine.id);
                self.mode = EditorMode::Edit {
                    routine_id: routine.id.clone(),
                };
                self.state = SubmissionState::Succeeded;
                Ok(Saved {
                    routine,
                    route: Route::Routines,
                })
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Deletes the routine being edited. Same failure handling as `submit`.
    #[tracing::instrument(name = "Delete routine from editor", skip(self, backend), fields(mode = ?self.mode))]
    pub async fn delete<B>(&mut self, backend: &B) -> Result<Route, SubmitError>
    where
        B: RoutineBackend + ?Sized,
    {
        match self.state {
            SubmissionState::Submitting => return Err(SubmitError::AlreadyPending),
            SubmissionState::SessionExpired => return Err(SubmitError::SessionExpired),
            _ => {}
        }
        let routine_id = match &self.mode {
            EditorMode::Edit { routine_id } => routine_id.clone(),
            EditorMode::Create => return Err(SubmitError::NotPersisted),
        };

        self.state = SubmissionState::Submitting;
        match backend.delete_routine(&routine_id).await {
            Ok(()) => {
                tracing::info!("✅ Routine {} deleted", routine_id);
                self.state = SubmissionState::Succeeded;
                Ok(Route::Routines)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Back to editing after a submission future was dropped mid-flight.
    pub fn abandon_submission(&mut self) {
        if self.state == SubmissionState::Submitting {
            self.state = SubmissionState::Editing { error: None };
        }
    }

    fn fail(&mut self, error: ApiError) -> SubmitError {
        if error.is_unauthorized() {
            tracing::warn!("❌ Session rejected while saving, discarding draft");
            // Closed for good: the blank draft must never go out as an update
            self.mode = EditorMode::Create;
            self.draft = RoutineDraft::new();
            self.state = SubmissionState::SessionExpired;
            SubmitError::SessionExpired
        } else {
            tracing::error!("❌ Failed to save routine: {}", error);
            self.state = SubmissionState::Editing {
                error: Some(error.to_string()),
            };
            SubmitError::Failed(error)
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum EditError {
    #[error("Session expired, open the routine again after logging in")]
    SessionExpired,

    #[error(transparent)]
    Draft(#[from] DraftError),
}
