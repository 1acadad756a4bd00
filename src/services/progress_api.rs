use reqwest::Method;

use crate::models::{NewProgressEntry, ProgressEntry};
use crate::services::api_client::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(name = "Fetch progress", skip(self))]
    pub async fn list_progress(&self) -> Result<Vec<ProgressEntry>, ApiError> {
        self.get_json("/api/progress").await
    }

    #[tracing::instrument(name = "Add progress", skip(self, entry), fields(exercise = %entry.name))]
    pub async fn add_progress(&self, entry: &NewProgressEntry) -> Result<ProgressEntry, ApiError> {
        self.send_json(Method::POST, "/api/progress", entry).await
    }

    #[tracing::instrument(name = "Edit progress", skip(self, entry))]
    pub async fn edit_progress(
        &self,
        progress_id: &str,
        entry: &NewProgressEntry,
    ) -> Result<ProgressEntry, ApiError> {
        self.send_json(Method::PUT, &format!("/api/progress/{}", progress_id), entry)
            .await
    }

    #[tracing::instrument(name = "Delete progress", skip(self))]
    pub async fn delete_progress(&self, progress_id: &str) -> Result<(), ApiError> {
        self.delete(&format!("/api/progress/{}", progress_id)).await
    }
}
