use async_trait::async_trait;
use reqwest::Method;
use serde::Serialize;

use crate::editor::submission::RoutineBackend;
use crate::models::{
    Exercise, ExerciseSuggestion, ExerciseUpdate, Routine, RoutineGenerationRequest,
    RoutinePayload, Video, VideoCandidate,
};
use crate::services::api_client::{ApiClient, ApiError};

// `PUT /api/routines/:id` expects the document wrapped as `routineData`
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UpdateRoutineBody<'a> {
    routine_data: RoutineDocument<'a>,
}

#[derive(Serialize)]
struct RoutineDocument<'a> {
    #[serde(rename = "_id")]
    id: &'a str,
    #[serde(flatten)]
    payload: &'a RoutinePayload,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlternativesRequest<'a> {
    day_exercises: &'a [Exercise],
    exercise_to_change_id: &'a str,
}

impl ApiClient {
    #[tracing::instrument(name = "Fetch routines", skip(self))]
    pub async fn list_routines(&self) -> Result<Vec<Routine>, ApiError> {
        let routines: Vec<Routine> = self.get_json("/api/routines").await?;
        tracing::debug!("Fetched {} routines", routines.len());
        Ok(routines)
    }

    #[tracing::instrument(name = "Fetch routine", skip(self))]
    pub async fn get_routine(&self, routine_id: &str) -> Result<Routine, ApiError> {
        self.get_json(&format!("/api/routines/{}", routine_id)).await
    }

    #[tracing::instrument(name = "Create routine", skip(self, payload), fields(name = %payload.name, days = payload.days.len()))]
    pub async fn create_routine(&self, payload: &RoutinePayload) -> Result<Routine, ApiError> {
        let routine: Routine = self.send_json(Method::POST, "/api/routines", payload).await?;
        tracing::info!("✅ Routine {} created", routine.id);
        Ok(routine)
    }

    #[tracing::instrument(name = "Update routine", skip(self, payload), fields(name = %payload.name, days = payload.days.len()))]
    pub async fn update_routine(
        &self,
        routine_id: &str,
        payload: &RoutinePayload,
    ) -> Result<Routine, ApiError> {
        let body = UpdateRoutineBody {
            routine_data: RoutineDocument { id: routine_id, payload },
        };
        let routine: Routine = self
            .send_json(Method::PUT, &format!("/api/routines/{}", routine_id), &body)
            .await?;
        tracing::info!("✅ Routine {} updated", routine.id);
        Ok(routine)
    }

    #[tracing::instrument(name = "Delete routine", skip(self))]
    pub async fn delete_routine(&self, routine_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/routines/{}", routine_id)).await
    }

    #[tracing::instrument(name = "Generate routine", skip(self, request), fields(days = request.days))]
    pub async fn generate_routine(
        &self,
        request: &RoutineGenerationRequest,
    ) -> Result<Routine, ApiError> {
        self.send_json(Method::POST, "/api/routines/generate", request).await
    }

    #[tracing::instrument(name = "Update exercise", skip(self, update))]
    pub async fn update_exercise(
        &self,
        exercise_id: &str,
        update: &ExerciseUpdate,
    ) -> Result<Exercise, ApiError> {
        self.send_json(Method::PUT, &format!("/api/exercises/{}", exercise_id), update)
            .await
    }

    #[tracing::instrument(name = "Suggest alternative exercises", skip(self, day_exercises))]
    pub async fn suggest_alternatives(
        &self,
        day_exercises: &[Exercise],
        exercise_id: &str,
    ) -> Result<Vec<ExerciseSuggestion>, ApiError> {
        let body = AlternativesRequest {
            day_exercises,
            exercise_to_change_id: exercise_id,
        };
        self.send_json(Method::POST, "/api/exercises/generate", &body).await
    }

    #[tracing::instrument(name = "Search exercise videos", skip(self))]
    pub async fn search_videos(
        &self,
        exercise_name: &str,
    ) -> Result<Vec<VideoCandidate>, ApiError> {
        let request = self
            .authorized(Method::GET, "/api/videos")?
            .query(&[("exerciseName", exercise_name)]);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(name = "Store video", skip(self, video), fields(url = %video.url))]
    pub async fn create_video(&self, video: &VideoCandidate) -> Result<Video, ApiError> {
        self.send_json(Method::POST, "/api/videos", video).await
    }
}

#[async_trait]
impl RoutineBackend for ApiClient {
    async fn create_routine(&self, payload: &RoutinePayload) -> Result<Routine, ApiError> {
        ApiClient::create_routine(self, payload).await
    }

    async fn update_routine(
        &self,
        routine_id: &str,
        payload: &RoutinePayload,
    ) -> Result<Routine, ApiError> {
        ApiClient::update_routine(self, routine_id, payload).await
    }

    async fn delete_routine(&self, routine_id: &str) -> Result<(), ApiError> {
        ApiClient::delete_routine(self, routine_id).await
    }
}
