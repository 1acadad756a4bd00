use std::fmt;
use std::time::Duration;
use chrono::{DateTime, Utc};
use jsonwebtoken::{decode, DecodingKey, Validation, Algorithm};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use url::Url;

use crate::config::settings::ApiSettings;
use crate::models::user::TokenClaims;

/// The three ways a backend call can fail, as far as callers care:
/// `Unauthorized` tears the session down, everything else is retryable.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Carries the backend's reason when the 401 came with one.
    #[error("Unauthorized: {}", .0.as_deref().unwrap_or("no valid session"))]
    Unauthorized(Option<String>),

    #[error("Backend returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Unauthorized(_) => Some(401),
            ApiError::Status { status, .. } => Some(*status),
            ApiError::Network(e) => e.status().map(|s| s.as_u16()),
            ApiError::InvalidUrl(_) => None,
        }
    }
}

/// Bearer token plus the expiry read from its `exp` claim.
#[derive(Clone)]
pub struct Session {
    token: SecretString,
    expires_at: Option<DateTime<Utc>>,
}

impl Session {
    pub fn new(token: SecretString) -> Self {
        let expires_at = read_expiry(token.expose_secret());
        Self { token, expires_at }
    }

    pub fn token(&self) -> &SecretString {
        &self.token
    }

    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    /// Tokens without a readable `exp` are left for the backend to judge.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.map(|exp| exp <= now).unwrap_or(false)
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"[REDACTED]")
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

// The signature is the backend's business; the client only reads `exp`.
fn read_expiry(token: &str) -> Option<DateTime<Utc>> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.validate_aud = false;
    validation.required_spec_claims.clear();

    let data = decode::<TokenClaims>(token, &DecodingKey::from_secret(&[]), &validation).ok()?;
    DateTime::from_timestamp(data.claims.exp as i64, 0)
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Typed client over the My Voice REST API.
#[derive(Clone)]
pub struct ApiClient {
    base_url: String,
    client: Client,
    session: Option<Session>,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        Url::parse(&base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            base_url,
            client,
            session: None,
        })
    }

    pub fn from_settings(settings: &ApiSettings) -> Result<Self, ApiError> {
        Self::new(&settings.base_url, settings.timeout())
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn set_session(&mut self, session: Session) {
        self.session = Some(session);
    }

    pub fn clear_session(&mut self) {
        self.session = None;
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn has_session(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| !s.is_expired(Utc::now()))
            .unwrap_or(false)
    }

    fn url(&self, path: &str) -> Result<Url, ApiError> {
        Ok(Url::parse(&format!("{}{}", self.base_url, path))?)
    }

    pub(crate) fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, ApiError> {
        Ok(self.client.request(method, self.url(path)?))
    }

    /// Same as `request` but with the bearer header. Fails without touching
    /// the network when there is no live session.
    pub(crate) fn authorized(
        &self,
        method: Method,
        path: &str,
    ) -> Result<RequestBuilder, ApiError> {
        let session = match &self.session {
            Some(session) if !session.is_expired(Utc::now()) => session,
            Some(_) => {
                tracing::info!("Session token expired, re-authentication required");
                return Err(ApiError::Unauthorized(Some("Session expired".to_string())));
            }
            None => return Err(ApiError::Unauthorized(None)),
        };
        Ok(self
            .request(method, path)?
            .bearer_auth(session.token().expose_secret()))
    }

    pub(crate) async fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message);

        if status == StatusCode::UNAUTHORIZED {
            tracing::warn!("Backend rejected the session (401): {:?}", reason);
            return Err(ApiError::Unauthorized(reason));
        }

        let message = reason.unwrap_or_else(|| {
            status.canonical_reason().unwrap_or("Unknown error").to_string()
        });
        tracing::error!("❌ Backend returned error {}: {}", status, message);
        Err(ApiError::Status {
            status: status.as_u16(),
            message,
        })
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let request = self.authorized(Method::GET, path)?;
        Ok(self.send(request).await?.json::<T>().await?)
    }

    pub(crate) async fn send_json<B, T>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = self.authorized(method, path)?.json(body);
        Ok(self.send(request).await?.json::<T>().await?)
    }

    pub(crate) async fn delete(&self, path: &str) -> Result<(), ApiError> {
        let request = self.authorized(Method::DELETE, path)?;
        self.send(request).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};

    fn token_expiring_at(exp: i64) -> SecretString {
        let claims = TokenClaims {
            sub: "u-1".into(),
            exp: exp as usize,
            iat: 0,
        };
        let token = encode(&Header::default(), &claims, &EncodingKey::from_secret(b"server-secret")).unwrap();
        SecretString::new(token.into_boxed_str())
    }

    #[test]
    fn session_reads_expiry_without_the_signing_key() {
        let exp = Utc::now().timestamp() + 3600;
        let session = Session::new(token_expiring_at(exp));
        assert_eq!(session.expires_at().unwrap().timestamp(), exp);
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn expired_session_is_detected() {
        let session = Session::new(token_expiring_at(Utc::now().timestamp() - 10));
        assert!(session.is_expired(Utc::now()));
    }

    #[test]
    fn opaque_tokens_never_expire_client_side() {
        let session = Session::new(SecretString::new("not-a-jwt".into()));
        assert!(session.expires_at().is_none());
        assert!(!session.is_expired(Utc::now()));
    }

    #[test]
    fn debug_output_hides_the_token() {
        let session = Session::new(SecretString::new("very-secret".into()));
        assert!(!format!("{:?}", session).contains("very-secret"));
    }

    #[test]
    fn authorized_requests_need_a_session() {
        let mut client = ApiClient::new("http://127.0.0.1:9/", Duration::from_secs(1)).unwrap();
        assert!(matches!(
            client.authorized(Method::GET, "/api/routines"),
            Err(ApiError::Unauthorized(None))
        ));

        client.set_session(Session::new(token_expiring_at(Utc::now().timestamp() - 1)));
        let expired = client.authorized(Method::GET, "/api/routines").unwrap_err();
        assert_eq!(expired.to_string(), "Unauthorized: Session expired");
        assert!(!client.has_session());

        client.set_session(Session::new(token_expiring_at(Utc::now().timestamp() + 60)));
        assert!(client.authorized(Method::GET, "/api/routines").is_ok());
    }

    #[test]
    fn base_url_must_parse() {
        assert!(matches!(
            ApiClient::new("not a url", Duration::from_secs(1)),
            Err(ApiError::InvalidUrl(_))
        ));
        let client = ApiClient::new("http://localhost:3000/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3000");
    }
}
