use std::fmt;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use secrecy::{ExposeSecret, SecretString};

use crate::routes::Route;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    User,
    Coach,
    Admin,
}

impl Role {
    /// Where a freshly authenticated user of this role lands.
    pub fn landing_route(&self) -> Route {
        match self {
            Role::Coach => Route::CoachDashboard,
            // no admin screens in this client
            Role::User | Role::Admin => Route::Routines,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id")]
    pub id: String,
    pub username: String,
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub goals: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coach_id: Option<String>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

impl User {
    /// Field-wise merge of a profile update response, the way the profile
    /// screen keeps whatever the server did not echo back.
    pub fn merge(&mut self, update: User) {
        self.username = update.username;
        self.email = update.email;
        self.role = update.role;
        if !update.goals.is_empty() {
            self.goals = update.goals;
        }
        if update.notes.is_some() {
            self.notes = update.notes;
        }
        if update.coach_id.is_some() {
            self.coach_id = update.coach_id;
        }
        if !update.specialties.is_empty() {
            self.specialties = update.specialties;
        }
        if update.bio.is_some() {
            self.bio = update.bio;
        }
    }
}

#[derive(Serialize, Deserialize)]
pub struct RegistrationRequest {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "serialize_exposed_secret", deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}

impl fmt::Display for RegistrationRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Username: {}, Email: {}", self.username, self.email)
    }
}

#[derive(Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    #[serde(serialize_with = "serialize_exposed_secret", deserialize_with = "deserialize_secret_string")]
    pub password: SecretString,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    #[serde(deserialize_with = "deserialize_secret_string")]
    pub token: SecretString,
    pub user: User,
}

#[derive(Debug, Deserialize)]
pub struct VerifyResponse {
    pub user: User,
}

/// Body of `PUT /api/user`. Goals travel as free text here, unlike the
/// list the coach edits.
#[derive(Serialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ProfileUpdate {
    pub username: String,
    pub email: String,
    #[serde(serialize_with = "serialize_optional_secret", skip_serializing_if = "Option::is_none")]
    pub password: Option<SecretString>,
    #[serde(serialize_with = "serialize_optional_secret", skip_serializing_if = "Option::is_none")]
    pub old_password: Option<SecretString>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bio: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Body of `PATCH /api/clients/:id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoachRequestStatus {
    Pending,
    Accepted,
    Rejected,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoachRequest {
    #[serde(rename = "_id")]
    pub id: String,
    /// The requesting user, embedded by the backend.
    pub user_id: User,
    pub coach_id: String,
    pub status: CoachRequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: usize,
    #[serde(default)]
    pub iat: usize,
}

pub fn serialize_exposed_secret<S>(secret: &SecretString, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_str(secret.expose_secret())
}

fn serialize_optional_secret<S>(
    secret: &Option<SecretString>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    match secret {
        Some(secret) => serializer.serialize_str(secret.expose_secret()),
        None => serializer.serialize_none(),
    }
}

pub fn deserialize_secret_string<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    Ok(SecretString::new(s.into_boxed_str()))
}
