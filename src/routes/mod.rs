use std::fmt;

/// Screens an operation can send the user to once it settles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    Login,
    Routines,
    NewRoutine,
    GenerateRoutine,
    EditRoutine { routine_id: String },
    ExerciseVideos { routine_id: String, day_id: String, exercise_id: String },
    Progress,
    CoachDashboard,
    Coaches,
}

impl Route {
    pub fn path(&self) -> String {
        match self {
            Route::Login => "/login".to_string(),
            Route::Routines => "/routine".to_string(),
            Route::NewRoutine => "/routine-form".to_string(),
            Route::GenerateRoutine => "/routine-AI".to_string(),
            Route::EditRoutine { routine_id } => format!("/routine-edit/{}", routine_id),
            Route::ExerciseVideos { routine_id, day_id, exercise_id } => {
                format!("/routine-edit/{}/videos/{}/{}", routine_id, day_id, exercise_id)
            }
            Route::Progress => "/progress".to_string(),
            Route::CoachDashboard => "/coach".to_string(),
            Route::Coaches => "/coaches".to_string(),
        }
    }

    /// Whether reaching this screen needs a session.
    pub fn requires_session(&self) -> bool {
        !matches!(self, Route::Login)
    }

    /// Guard applied on every navigation: no session means login, an
    /// authenticated user asking for login goes to the routine list.
    pub fn guard(self, has_session: bool) -> Route {
        match (has_session, self) {
            (false, route) if route.requires_session() => Route::Login,
            (true, Route::Login) => Route::Routines,
            (_, route) => route,
        }
    }
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path())
    }
}
