use reqwest::Method;
use serde_json::json;

use crate::models::{ClientUpdate, CoachRequest, Routine, User};
use crate::services::api_client::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(name = "Fetch clients", skip(self))]
    pub async fn list_clients(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/clients").await
    }

    #[tracing::instrument(name = "Fetch client profile", skip(self))]
    pub async fn get_client(&self, client_id: &str) -> Result<User, ApiError> {
        self.get_json(&format!("/api/clients/{}", client_id)).await
    }

    #[tracing::instrument(name = "Fetch client routines", skip(self))]
    pub async fn list_client_routines(&self, client_id: &str) -> Result<Vec<Routine>, ApiError> {
        self.get_json(&format!("/api/clients/{}/routines", client_id)).await
    }

    #[tracing::instrument(name = "Assign routine to client", skip(self))]
    pub async fn assign_routine(
        &self,
        client_id: &str,
        routine_id: &str,
    ) -> Result<Routine, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/api/clients/{}/routines", client_id),
            &json!({ "routineId": routine_id }),
        )
        .await
    }

    #[tracing::instrument(name = "Update client", skip(self, update))]
    pub async fn update_client(
        &self,
        client_id: &str,
        update: &ClientUpdate,
    ) -> Result<User, ApiError> {
        self.send_json(Method::PATCH, &format!("/api/clients/{}", client_id), update)
            .await
    }

    #[tracing::instrument(name = "Fetch coaches", skip(self))]
    pub async fn list_coaches(&self) -> Result<Vec<User>, ApiError> {
        self.get_json("/api/coaches").await
    }

    #[tracing::instrument(name = "Request coach", skip(self))]
    pub async fn request_coach(&self, coach_id: &str) -> Result<(), ApiError> {
        let request = self
            .authorized(Method::POST, "/api/coaches/request")?
            .json(&json!({ "id": coach_id }));
        self.send(request).await?;
        Ok(())
    }

    #[tracing::instrument(name = "Fetch coach requests", skip(self))]
    pub async fn list_coach_requests(&self) -> Result<Vec<CoachRequest>, ApiError> {
        self.get_json("/api/coaches/requests").await
    }

    /// Returns the user who became a client.
    #[tracing::instrument(name = "Accept coach request", skip(self))]
    pub async fn accept_coach_request(&self, user_id: &str) -> Result<User, ApiError> {
        self.send_json(Method::POST, "/api/coaches/accept", &json!({ "id": user_id }))
            .await
    }

    #[tracing::instrument(name = "Reject coach request", skip(self))]
    pub async fn reject_coach_request(&self, user_id: &str) -> Result<CoachRequest, ApiError> {
        self.send_json(
            Method::POST,
            &format!("/api/coaches/requests/{}/reject", user_id),
            &json!({}),
        )
        .await
    }
}
