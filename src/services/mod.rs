pub mod api_client;
pub mod coach_api;
pub mod progress_api;
pub mod routine_api;
pub mod user_api;

pub use api_client::{ApiClient, ApiError, Session};
