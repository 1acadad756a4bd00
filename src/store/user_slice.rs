use crate::models::User;
use crate::routes::Route;
use crate::services::Session;
use crate::store::{Lifecycle, Slice, SliceError};

#[derive(Debug, Clone, Default)]
pub struct UserState {
    pub user: Option<User>,
    pub session: Option<Session>,
    pub loading: bool,
    pub error: Option<SliceError>,
}

#[derive(Debug, Clone)]
pub enum UserAction {
    Register(Lifecycle<User>),
    Login(Lifecycle<(User, Session)>),
    /// A failed verification drops the session.
    Verify(Lifecycle<User>),
    UpdateProfile(Lifecycle<User>),
    Logout,
    /// The backend answered 401; `reason` is kept as the slice error.
    SessionExpired { reason: SliceError },
}

impl UserState {
    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    /// Screen to open after login, by role.
    pub fn landing_route(&self) -> Route {
        match &self.user {
            Some(user) => user.role.landing_route(),
            None => Route::Login,
        }
    }

    pub fn reduce(&mut self, action: UserAction) {
        match action {
            UserAction::Register(lifecycle) => self.settle(lifecycle, |_, _| {}),
            UserAction::Login(lifecycle) => self.settle(lifecycle, |state, (user, session)| {
                state.user = Some(user);
                state.session = Some(session);
            }),
            UserAction::Verify(Lifecycle::Rejected(error)) => {
                self.loading = false;
                self.user = None;
                self.session = None;
                self.error = Some(error);
            }
            UserAction::Verify(lifecycle) => {
                self.settle(lifecycle, |state, user| state.user = Some(user))
            }
            UserAction::UpdateProfile(lifecycle) => self.settle(lifecycle, |state, user| {
                match state.user.as_mut() {
                    Some(existing) => existing.merge(user),
                    None => state.user = Some(user),
                }
            }),
            UserAction::Logout => {
                self.user = None;
                self.session = None;
            }
            UserAction::SessionExpired { reason } => {
                *self = UserState {
                    error: Some(reason),
                    ..UserState::default()
                };
            }
        }
    }
}

impl Slice for UserState {
    fn status_mut(&mut self) -> (&mut bool, &mut Option<SliceError>) {
        (&mut self.loading, &mut self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Role;
    use secrecy::SecretString;

    fn user(role: Role) -> User {
        serde_json::from_value(serde_json::json!({
            "_id": "u-1",
            "username": "ana",
            "email": "ana@example.com",
            "role": role,
        }))
        .unwrap()
    }

    fn session() -> Session {
        Session::new(SecretString::new("token".into()))
    }

    #[test]
    fn login_stores_user_and_session() {
        let mut state = UserState::default();
        state.reduce(UserAction::Login(Lifecycle::Pending));
        assert!(state.loading);
        state.reduce(UserAction::Login(Lifecycle::Fulfilled((user(Role::Coach), session()))));
        assert!(state.is_authenticated());
        assert_eq!(state.landing_route(), Route::CoachDashboard);
    }

    #[test]
    fn failed_verification_drops_the_session() {
        let mut state = UserState::default();
        state.reduce(UserAction::Login(Lifecycle::Fulfilled((user(Role::User), session()))));
        state.reduce(UserAction::Verify(Lifecycle::Rejected(SliceError::new("jwt expired"))));
        assert!(!state.is_authenticated());
        assert!(state.user.is_none());
        assert_eq!(state.landing_route(), Route::Login);
    }

    #[test]
    fn profile_update_merges_into_the_user() {
        let mut state = UserState::default();
        state.reduce(UserAction::Login(Lifecycle::Fulfilled((user(Role::User), session()))));
        let mut updated = user(Role::User);
        updated.username = "ana.g".into();
        state.reduce(UserAction::UpdateProfile(Lifecycle::Fulfilled(updated)));
        assert_eq!(state.user.as_ref().unwrap().username, "ana.g");
        assert!(state.is_authenticated());
    }

    #[test]
    fn expiry_clears_everything_but_the_reason() {
        let mut state = UserState::default();
        state.reduce(UserAction::Login(Lifecycle::Fulfilled((user(Role::Admin), session()))));
        state.reduce(UserAction::SessionExpired {
            reason: SliceError { message: "Unauthorized".into(), status: Some(401) },
        });
        assert!(state.user.is_none() && state.session.is_none());
        assert!(state.error.unwrap().is_unauthorized());
    }
}
