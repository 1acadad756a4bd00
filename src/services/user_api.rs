use reqwest::Method;

use crate::models::user::{LoginRequest, LoginResponse, RegistrationRequest, VerifyResponse};
use crate::models::{ProfileUpdate, User};
use crate::services::api_client::{ApiClient, ApiError};

impl ApiClient {
    #[tracing::instrument(
        name = "Register user",
        skip(self, request),
        fields(username = %request.username, email = %request.email)
    )]
    pub async fn register(&self, request: &RegistrationRequest) -> Result<User, ApiError> {
        let request = self.request(Method::POST, "/api/register")?.json(request);
        Ok(self.send(request).await?.json().await?)
    }

    /// Does not store the session; the caller decides.
    #[tracing::instrument(name = "Login user attempt", skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let request = self.request(Method::POST, "/api/login")?.json(request);
        Ok(self.send(request).await?.json().await?)
    }

    #[tracing::instrument(name = "Verify session", skip(self))]
    pub async fn verify(&self) -> Result<User, ApiError> {
        let response: VerifyResponse = self.get_json("/api/verify").await?;
        Ok(response.user)
    }

    #[tracing::instrument(name = "Update profile", skip(self, update), fields(username = %update.username))]
    pub async fn update_profile(&self, update: &ProfileUpdate) -> Result<User, ApiError> {
        self.send_json(Method::PUT, "/api/user", update).await
    }
}
