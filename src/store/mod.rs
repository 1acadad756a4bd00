//! Application state: one slice per concern, each driven by tagged actions,
//! and the `AppStore` that runs backend calls through them.

pub mod app_store;
pub mod coach_slice;
pub mod last_viewed;
pub mod progress_slice;
pub mod routine_slice;
pub mod user_slice;

use crate::services::ApiError;

pub use app_store::AppStore;
pub use coach_slice::{CoachAction, CoachState};
pub use last_viewed::{CacheError, LastViewed};
pub use progress_slice::{ProgressAction, ProgressQuery, ProgressSort, ProgressState, SortOrder};
pub use routine_slice::{ExerciseKey, RoutineAction, RoutineState};
pub use user_slice::{UserAction, UserState};

/// Where an async operation is, as seen by the slice that tracks it.
#[derive(Debug, Clone, PartialEq)]
pub enum Lifecycle<T> {
    Pending,
    Fulfilled(T),
    Rejected(SliceError),
}

/// State that tracks one request at a time through `loading` and `error`.
pub(crate) trait Slice: Sized {
    fn status_mut(&mut self) -> (&mut bool, &mut Option<SliceError>);

    /// Pending clears the last error, a settled request ends the loading flag
    /// and only a fulfilled one touches the data.
    fn settle<T>(&mut self, lifecycle: Lifecycle<T>, fulfil: impl FnOnce(&mut Self, T)) {
        match lifecycle {
            Lifecycle::Pending => {
                let (loading, error) = self.status_mut();
                *loading = true;
                *error = None;
            }
            Lifecycle::Fulfilled(value) => {
                *self.status_mut().0 = false;
                fulfil(self, value);
            }
            Lifecycle::Rejected(rejected) => {
                let (loading, error) = self.status_mut();
                *loading = false;
                *error = Some(rejected);
            }
        }
    }
}

/// Error as kept in a slice: plain data, clonable, comparable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct SliceError {
    pub message: String,
    pub status: Option<u16>,
}

impl SliceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            status: None,
        }
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status == Some(401)
    }
}

impl From<&ApiError> for SliceError {
    fn from(error: &ApiError) -> Self {
        let message = match error {
            ApiError::Status { message, .. } => message.clone(),
            ApiError::Unauthorized(Some(reason)) => reason.clone(),
            other => other.to_string(),
        };
        Self {
            message,
            status: error.status(),
        }
    }
}
