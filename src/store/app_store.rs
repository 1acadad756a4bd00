use chrono::Utc;
use secrecy::SecretString;

use crate::config::Settings;
use crate::editor::{EditorMode, RoutineEditor, Saved, SubmitError};
use crate::models::user::{LoginRequest, RegistrationRequest};
use crate::models::{
    ClientUpdate, Exercise, ExerciseSuggestion, ExerciseUpdate, NewProgressEntry, ProfileUpdate,
    ProgressEntry, Routine, RoutineGenerationRequest, RoutinePayload, User, VideoCandidate,
};
use crate::routes::Route;
use crate::services::{ApiClient, ApiError, Session};
use crate::store::{
    CoachAction, CoachState, ExerciseKey, Lifecycle, ProgressAction, ProgressState, RoutineAction,
    RoutineState, SliceError, UserAction, UserState,
};

/// Screen a failed call sends the user to, if any.
pub fn error_route(error: &ApiError) -> Option<Route> {
    if error.is_unauthorized() {
        Some(Route::Login)
    } else {
        None
    }
}

/// Owns the API client and every slice. All backend traffic goes through
/// here so that a 401 from any call ends the session in one place.
pub struct AppStore {
    client: ApiClient,
    routine: RoutineState,
    progress: ProgressState,
    user: UserState,
    coach: CoachState,
}

impl AppStore {
    pub fn new(client: ApiClient) -> Self {
        Self {
            client,
            routine: RoutineState::default(),
            progress: ProgressState::default(),
            user: UserState::default(),
            coach: CoachState::default(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self, ApiError> {
        Ok(Self::new(ApiClient::from_settings(&settings.api)?))
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn routine(&self) -> &RoutineState {
        &self.routine
    }

    pub fn progress(&self) -> &ProgressState {
        &self.progress
    }

    pub fn user(&self) -> &UserState {
        &self.user
    }

    pub fn coach(&self) -> &CoachState {
        &self.coach
    }

    // Session

    #[tracing::instrument(name = "Register", skip(self, password))]
    pub async fn register(
        &mut self,
        username: &str,
        email: &str,
        password: SecretString,
    ) -> Result<User, ApiError> {
        self.user.reduce(UserAction::Register(Lifecycle::Pending));
        let request = RegistrationRequest {
            username: username.to_string(),
            email: email.to_string(),
            password,
        };
        let result = self.client.register(&request).await;
        self.settle(result, |store, l| store.user.reduce(UserAction::Register(l)))
    }

    /// Stores the session and returns the landing screen for the user's role.
    #[tracing::instrument(name = "Login", skip(self, password))]
    pub async fn login(&mut self, email: &str, password: SecretString) -> Result<Route, ApiError> {
        self.user.reduce(UserAction::Login(Lifecycle::Pending));
        let request = LoginRequest {
            email: email.to_string(),
            password,
        };
        match self.client.login(&request).await {
            Ok(response) => {
                let session = Session::new(response.token);
                self.client.set_session(session.clone());
                tracing::info!("✅ Logged in as {}", response.user.username);
                self.user
                    .reduce(UserAction::Login(Lifecycle::Fulfilled((response.user, session))));
                Ok(self.user.landing_route())
            }
            Err(e) => {
                tracing::error!("❌ Login failed: {}", e);
                self.user
                    .reduce(UserAction::Login(Lifecycle::Rejected(SliceError::from(&e))));
                Err(e)
            }
        }
    }

    /// Any failure drops the session, not only a 401.
    #[tracing::instrument(name = "Verify session", skip(self))]
    pub async fn verify(&mut self) -> Result<User, ApiError> {
        self.user.reduce(UserAction::Verify(Lifecycle::Pending));
        match self.client.verify().await {
            Ok(user) => {
                self.user
                    .reduce(UserAction::Verify(Lifecycle::Fulfilled(user.clone())));
                Ok(user)
            }
            Err(e) => {
                self.client.clear_session();
                self.user
                    .reduce(UserAction::Verify(Lifecycle::Rejected(SliceError::from(&e))));
                Err(e)
            }
        }
    }

    #[tracing::instrument(name = "Update profile", skip(self, update))]
    pub async fn update_profile(&mut self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.user.reduce(UserAction::UpdateProfile(Lifecycle::Pending));
        let result = self.client.update_profile(update).await;
        self.settle(result, |store, l| store.user.reduce(UserAction::UpdateProfile(l)))
    }

    pub fn logout(&mut self) {
        tracing::info!("Logging out");
        self.client.clear_session();
        self.user.reduce(UserAction::Logout);
        self.reset_data_slices();
    }

    // Routines

    #[tracing::instrument(name = "Load routines", skip(self))]
    pub async fn fetch_routines(&mut self) -> Result<Vec<Routine>, ApiError> {
        self.routine.reduce(RoutineAction::FetchAll(Lifecycle::Pending));
        let result = self.client.list_routines().await;
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::FetchAll(l)))
    }

    #[tracing::instrument(name = "Load routine", skip(self))]
    pub async fn fetch_routine(&mut self, routine_id: &str) -> Result<Routine, ApiError> {
        self.routine.reduce(RoutineAction::FetchOne(Lifecycle::Pending));
        let result = self.client.get_routine(routine_id).await;
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::FetchOne(l)))
    }

    #[tracing::instrument(name = "Store new routine", skip(self, payload))]
    pub async fn create_routine(&mut self, payload: &RoutinePayload) -> Result<Routine, ApiError> {
        self.routine.reduce(RoutineAction::Create(Lifecycle::Pending));
        let result = self.client.create_routine(payload).await;
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::Create(l)))
    }

    #[tracing::instrument(name = "Store routine changes", skip(self, payload))]
    pub async fn update_routine(
        &mut self,
        routine_id: &str,
        payload: &RoutinePayload,
    ) -> Result<Routine, ApiError> {
        self.routine.reduce(RoutineAction::Update(Lifecycle::Pending));
        let result = self.client.update_routine(routine_id, payload).await;
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::Update(l)))
    }

    #[tracing::instrument(name = "Remove routine", skip(self))]
    pub async fn delete_routine(&mut self, routine_id: &str) -> Result<(), ApiError> {
        self.routine.reduce(RoutineAction::Delete(Lifecycle::Pending));
        let result = self
            .client
            .delete_routine(routine_id)
            .await
            .map(|()| routine_id.to_string());
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::Delete(l)))
            .map(|_| ())
    }

    pub fn select_routine(&mut self, routine_id: &str) -> Result<(), SliceError> {
        self.routine.select(routine_id)
    }

    #[tracing::instrument(name = "Generate routine with AI", skip(self, request))]
    pub async fn generate_routine(
        &mut self,
        request: &RoutineGenerationRequest,
    ) -> Result<Routine, ApiError> {
        self.routine.reduce(RoutineAction::Generate(Lifecycle::Pending));
        let result = self.client.generate_routine(request).await;
        self.settle(result, |store, l| store.routine.reduce(RoutineAction::Generate(l)))
    }

    /// Submits an open editor and folds the saved routine into the routine
    /// slice. A rejected session ends it here as well.
    pub async fn save_routine(&mut self, editor: &mut RoutineEditor) -> Result<Saved, SubmitError> {
        let creating = *editor.mode() == EditorMode::Create;
        let result = editor.submit(&self.client).await;
        match result {
            Ok(saved) => {
                let lifecycle = Lifecycle::Fulfilled(saved.routine.clone());
                self.routine.reduce(if creating {
                    RoutineAction::Create(lifecycle)
                } else {
                    RoutineAction::Update(lifecycle)
                });
                Ok(saved)
            }
            Err(e) => Err(self.submission_failed(e)),
        }
    }

    pub async fn delete_from_editor(
        &mut self,
        editor: &mut RoutineEditor,
    ) -> Result<Route, SubmitError> {
        let routine_id = match editor.mode() {
            EditorMode::Edit { routine_id } => Some(routine_id.clone()),
            EditorMode::Create => None,
        };
        let result = editor.delete(&self.client).await;
        match (result, routine_id) {
            (Ok(route), Some(routine_id)) => {
                self.routine
                    .reduce(RoutineAction::Delete(Lifecycle::Fulfilled(routine_id)));
                Ok(route)
            }
            (Ok(route), None) => Ok(route),
            (Err(e), _) => Err(self.submission_failed(e)),
        }
    }

    // Exercises

    /// Saves an exercise edit from the routine screen. Unless only `rest`,
    /// `completed` or the videos changed, the result is also logged as
    /// progress.
    #[tracing::instrument(name = "Save exercise", skip(self, update), fields(exercise_id = %key.exercise_id))]
    pub async fn save_exercise(
        &mut self,
        key: &ExerciseKey,
        update: ExerciseUpdate,
    ) -> Result<Exercise, ApiError> {
        self.routine.reduce(RoutineAction::UpdateExercise {
            key: key.clone(),
            result: Lifecycle::Pending,
        });
        let result = self.client.update_exercise(&key.exercise_id, &update).await;
        let exercise = self.settle(result, |store, l| {
            store.routine.reduce(RoutineAction::UpdateExercise {
                key: key.clone(),
                result: l,
            })
        })?;

        if update.records_progress() {
            self.add_progress(&NewProgressEntry::from_exercise(&exercise, Utc::now()))
                .await?;
        }
        Ok(exercise)
    }

    #[tracing::instrument(name = "Toggle exercise completed", skip(self), fields(exercise_id = %key.exercise_id))]
    pub async fn toggle_completed(&mut self, key: &ExerciseKey) -> Result<bool, ApiError> {
        let completed = match self.routine.exercise(key) {
            Some(exercise) => !exercise.completed,
            None => return Err(not_loaded(key)),
        };
        self.routine.reduce(RoutineAction::SetCompleted {
            key: key.clone(),
            result: Lifecycle::Pending,
        });
        let update = ExerciseUpdate {
            completed: Some(completed),
            ..Default::default()
        };
        let result = self
            .client
            .update_exercise(&key.exercise_id, &update)
            .await
            .map(|exercise| exercise.completed);
        self.settle(result, |store, l| {
            store.routine.reduce(RoutineAction::SetCompleted {
                key: key.clone(),
                result: l,
            })
        })
    }

    /// Stores each candidate as a video, then points the exercise at them.
    #[tracing::instrument(name = "Set exercise videos", skip(self, videos), fields(exercise_id = %key.exercise_id, count = videos.len()))]
    pub async fn set_exercise_videos(
        &mut self,
        key: &ExerciseKey,
        videos: &[VideoCandidate],
    ) -> Result<Exercise, ApiError> {
        self.routine.reduce(RoutineAction::SetVideos {
            key: key.clone(),
            result: Lifecycle::Pending,
        });
        let result = self.store_videos(&key.exercise_id, videos).await;
        let exercise = self.settle(result, |store, l| {
            let videos = match l {
                Lifecycle::Fulfilled(exercise) => Lifecycle::Fulfilled(exercise.videos),
                Lifecycle::Rejected(e) => Lifecycle::Rejected(e),
                Lifecycle::Pending => Lifecycle::Pending,
            };
            store.routine.reduce(RoutineAction::SetVideos {
                key: key.clone(),
                result: videos,
            })
        })?;
        Ok(exercise)
    }

    /// Looks up videos for an exercise that has none yet. Returns the number
    /// of videos attached.
    pub async fn load_exercise_videos(&mut self, key: &ExerciseKey) -> Result<usize, ApiError> {
        let name = match self.routine.exercise(key) {
            Some(exercise) if !exercise.videos.is_empty() => return Ok(0),
            Some(exercise) => exercise.name.clone(),
            None => return Err(not_loaded(key)),
        };
        let result = self.client.search_videos(&name).await;
        let candidates = self.guard(result)?;
        if candidates.is_empty() {
            return Ok(0);
        }
        let exercise = self.set_exercise_videos(key, &candidates).await?;
        Ok(exercise.videos.len())
    }

    pub async fn suggest_alternatives(
        &mut self,
        key: &ExerciseKey,
    ) -> Result<Vec<ExerciseSuggestion>, ApiError> {
        let day_exercises = match self
            .routine
            .routine(&key.routine_id)
            .and_then(|r| r.day(&key.day_id))
        {
            Some(day) => day.exercises.clone(),
            None => return Err(not_loaded(key)),
        };
        let result = self
            .client
            .suggest_alternatives(&day_exercises, &key.exercise_id)
            .await;
        self.guard(result)
    }

    /// Replaces an exercise with a suggested alternative. Its videos are
    /// cleared so the new exercise can look up its own.
    pub async fn apply_suggestion(
        &mut self,
        key: &ExerciseKey,
        suggestion: &ExerciseSuggestion,
    ) -> Result<Exercise, ApiError> {
        let update = ExerciseUpdate {
            name: Some(suggestion.name.clone()),
            sets: suggestion.sets,
            reps: suggestion.reps,
            reps_unit: suggestion.reps_unit,
            weight: suggestion.weight,
            weight_unit: suggestion.weight_unit,
            videos: Some(Vec::new()),
            ..Default::default()
        };
        self.routine.reduce(RoutineAction::UpdateExercise {
            key: key.clone(),
            result: Lifecycle::Pending,
        });
        let result = self.client.update_exercise(&key.exercise_id, &update).await;
        self.settle(result, |store, l| {
            store.routine.reduce(RoutineAction::UpdateExercise {
                key: key.clone(),
                result: l,
            })
        })
    }

    // Progress

    #[tracing::instrument(name = "Load progress", skip(self))]
    pub async fn fetch_progress(&mut self) -> Result<Vec<ProgressEntry>, ApiError> {
        self.progress.reduce(ProgressAction::Fetch(Lifecycle::Pending));
        let result = self.client.list_progress().await;
        self.settle(result, |store, l| store.progress.reduce(ProgressAction::Fetch(l)))
    }

    #[tracing::instrument(name = "Log progress", skip(self, entry), fields(name = %entry.name))]
    pub async fn add_progress(
        &mut self,
        entry: &NewProgressEntry,
    ) -> Result<ProgressEntry, ApiError> {
        self.progress.reduce(ProgressAction::Add(Lifecycle::Pending));
        let result = self.client.add_progress(entry).await;
        self.settle(result, |store, l| store.progress.reduce(ProgressAction::Add(l)))
    }

    #[tracing::instrument(name = "Edit progress", skip(self, entry))]
    pub async fn edit_progress(
        &mut self,
        progress_id: &str,
        entry: &NewProgressEntry,
    ) -> Result<ProgressEntry, ApiError> {
        self.progress.reduce(ProgressAction::Edit(Lifecycle::Pending));
        let result = self.client.edit_progress(progress_id, entry).await;
        self.settle(result, |store, l| store.progress.reduce(ProgressAction::Edit(l)))
    }

    #[tracing::instrument(name = "Delete progress", skip(self))]
    pub async fn delete_progress(&mut self, progress_id: &str) -> Result<(), ApiError> {
        self.progress.reduce(ProgressAction::Delete(Lifecycle::Pending));
        let result = self
            .client
            .delete_progress(progress_id)
            .await
            .map(|()| progress_id.to_string());
        self.settle(result, |store, l| store.progress.reduce(ProgressAction::Delete(l)))
            .map(|_| ())
    }

    // Coaching

    #[tracing::instrument(name = "Load clients", skip(self))]
    pub async fn fetch_clients(&mut self) -> Result<Vec<User>, ApiError> {
        self.coach.reduce(CoachAction::FetchClients(Lifecycle::Pending));
        let result = self.client.list_clients().await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::FetchClients(l)))
    }

    #[tracing::instrument(name = "Load client profile", skip(self))]
    pub async fn fetch_client_profile(&mut self, client_id: &str) -> Result<User, ApiError> {
        self.coach.reduce(CoachAction::FetchClientProfile(Lifecycle::Pending));
        let result = self.client.get_client(client_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::FetchClientProfile(l)))
    }

    #[tracing::instrument(name = "Load client routines", skip(self))]
    pub async fn fetch_client_routines(
        &mut self,
        client_id: &str,
    ) -> Result<Vec<Routine>, ApiError> {
        self.coach.reduce(CoachAction::FetchClientRoutines(Lifecycle::Pending));
        let result = self.client.list_client_routines(client_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::FetchClientRoutines(l)))
    }

    #[tracing::instrument(name = "Assign routine", skip(self))]
    pub async fn assign_routine(
        &mut self,
        client_id: &str,
        routine_id: &str,
    ) -> Result<Routine, ApiError> {
        self.coach.reduce(CoachAction::AssignRoutine(Lifecycle::Pending));
        let result = self.client.assign_routine(client_id, routine_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::AssignRoutine(l)))
    }

    #[tracing::instrument(name = "Update client", skip(self, update))]
    pub async fn update_client(
        &mut self,
        client_id: &str,
        update: &ClientUpdate,
    ) -> Result<User, ApiError> {
        self.coach.reduce(CoachAction::UpdateClient(Lifecycle::Pending));
        let result = self.client.update_client(client_id, update).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::UpdateClient(l)))
    }

    #[tracing::instrument(name = "Load coaches", skip(self))]
    pub async fn fetch_coaches(&mut self) -> Result<Vec<User>, ApiError> {
        self.coach.reduce(CoachAction::FetchCoaches(Lifecycle::Pending));
        let result = self.client.list_coaches().await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::FetchCoaches(l)))
    }

    #[tracing::instrument(name = "Ask for a coach", skip(self))]
    pub async fn request_coach(&mut self, coach_id: &str) -> Result<(), ApiError> {
        self.coach.reduce(CoachAction::RequestCoach(Lifecycle::Pending));
        let result = self.client.request_coach(coach_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::RequestCoach(l)))
    }

    #[tracing::instrument(name = "Load coach requests", skip(self))]
    pub async fn fetch_coach_requests(&mut self) -> Result<(), ApiError> {
        self.coach.reduce(CoachAction::FetchRequests(Lifecycle::Pending));
        let result = self.client.list_coach_requests().await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::FetchRequests(l)))
            .map(|_| ())
    }

    #[tracing::instrument(name = "Accept coach request", skip(self))]
    pub async fn accept_coach_request(&mut self, user_id: &str) -> Result<User, ApiError> {
        self.coach.reduce(CoachAction::AcceptRequest(Lifecycle::Pending));
        let result = self.client.accept_coach_request(user_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::AcceptRequest(l)))
    }

    #[tracing::instrument(name = "Reject coach request", skip(self))]
    pub async fn reject_coach_request(&mut self, user_id: &str) -> Result<(), ApiError> {
        self.coach.reduce(CoachAction::RejectRequest(Lifecycle::Pending));
        let result = self.client.reject_coach_request(user_id).await;
        self.settle(result, |store, l| store.coach.reduce(CoachAction::RejectRequest(l)))
            .map(|_| ())
    }

    pub fn clear_client_data(&mut self) {
        self.coach.reduce(CoachAction::ClearClientData);
    }

    // Plumbing

    async fn store_videos(
        &self,
        exercise_id: &str,
        videos: &[VideoCandidate],
    ) -> Result<Exercise, ApiError> {
        let mut ids = Vec::with_capacity(videos.len());
        for video in videos {
            ids.push(self.client.create_video(video).await?.id);
        }
        let update = ExerciseUpdate {
            videos: Some(ids),
            ..Default::default()
        };
        self.client.update_exercise(exercise_id, &update).await
    }

    /// Hands the outcome to the slice, and ends the session on a 401.
    fn settle<T: Clone>(
        &mut self,
        result: Result<T, ApiError>,
        reduce: impl FnOnce(&mut Self, Lifecycle<T>),
    ) -> Result<T, ApiError> {
        match result {
            Ok(value) => {
                reduce(self, Lifecycle::Fulfilled(value.clone()));
                Ok(value)
            }
            Err(error) => {
                reduce(self, Lifecycle::Rejected(SliceError::from(&error)));
                if error.is_unauthorized() {
                    self.end_session(&error);
                }
                Err(error)
            }
        }
    }

    /// For calls that feed no slice.
    fn guard<T>(&mut self, result: Result<T, ApiError>) -> Result<T, ApiError> {
        if let Err(error) = &result {
            if error.is_unauthorized() {
                self.end_session(error);
            }
        }
        result
    }

    fn submission_failed(&mut self, error: SubmitError) -> SubmitError {
        match &error {
            SubmitError::SessionExpired => self.end_session(&ApiError::Unauthorized(None)),
            SubmitError::Failed(api) => self.routine.error = Some(SliceError::from(api)),
            _ => {}
        }
        error
    }

    fn end_session(&mut self, reason: &ApiError) {
        tracing::warn!("❌ Session rejected by the backend, signing out");
        self.client.clear_session();
        self.user.reduce(UserAction::SessionExpired {
            reason: SliceError::from(reason),
        });
        self.reset_data_slices();
    }

    fn reset_data_slices(&mut self) {
        self.routine.reduce(RoutineAction::Reset);
        self.progress.reduce(ProgressAction::Reset);
        self.coach.reduce(CoachAction::Reset);
    }
}

fn not_loaded(key: &ExerciseKey) -> ApiError {
    ApiError::Status {
        status: 404,
        message: format!(
            "Exercise {} is not part of a loaded routine",
            key.exercise_id
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn offline_store() -> AppStore {
        AppStore::new(ApiClient::new("http://127.0.0.1:9", Duration::from_secs(1)).unwrap())
    }

    #[tokio::test]
    async fn calls_without_a_session_end_up_at_login() {
        let mut store = offline_store();
        let error = store.fetch_routines().await.unwrap_err();
        assert!(error.is_unauthorized());
        assert_eq!(error_route(&error), Some(Route::Login));
        assert!(!store.user().is_authenticated());
        assert!(store.user().error.as_ref().unwrap().is_unauthorized());
        assert!(!store.routine().loading);
    }

    #[tokio::test]
    async fn unknown_exercise_is_refused_locally() {
        let mut store = offline_store();
        let key = ExerciseKey::new("r", "d", "e");
        let error = store.toggle_completed(&key).await.unwrap_err();
        assert_eq!(error.status(), Some(404));
        assert_eq!(error_route(&error), None);
    }

    #[test]
    fn selecting_needs_a_loaded_routine() {
        let mut store = offline_store();
        assert!(store.select_routine("r-1").is_err());
    }
}
