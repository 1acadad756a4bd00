use crate::models::{CoachRequest, Routine, User};
use crate::store::{Lifecycle, Slice, SliceError};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CoachState {
    pub clients: Vec<User>,
    pub selected_client: Option<User>,
    pub client_routines: Vec<Routine>,
    pub coaches: Vec<User>,
    pub requests: Vec<CoachRequest>,
    pub loading: bool,
    pub error: Option<SliceError>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CoachAction {
    FetchClients(Lifecycle<Vec<User>>),
    FetchClientProfile(Lifecycle<User>),
    FetchClientRoutines(Lifecycle<Vec<Routine>>),
    AssignRoutine(Lifecycle<Routine>),
    UpdateClient(Lifecycle<User>),
    FetchCoaches(Lifecycle<Vec<User>>),
    RequestCoach(Lifecycle<()>),
    FetchRequests(Lifecycle<Vec<CoachRequest>>),
    /// Carries the user who became a client.
    AcceptRequest(Lifecycle<User>),
    RejectRequest(Lifecycle<CoachRequest>),
    ClearClientData,
    ClearError,
    Reset,
}

impl CoachState {
    pub fn reduce(&mut self, action: CoachAction) {
        match action {
            CoachAction::FetchClients(lifecycle) => {
                self.settle(lifecycle, |state, clients| state.clients = clients)
            }
            CoachAction::FetchClientProfile(lifecycle) => {
                self.settle(lifecycle, |state, client| state.selected_client = Some(client))
            }
            CoachAction::FetchClientRoutines(lifecycle) => {
                self.settle(lifecycle, |state, routines| state.client_routines = routines)
            }
            CoachAction::AssignRoutine(lifecycle) => {
                self.settle(lifecycle, |state, routine| state.client_routines.push(routine))
            }
            CoachAction::UpdateClient(lifecycle) => self.settle(lifecycle, |state, client| {
                if let Some(listed) = state.clients.iter_mut().find(|c| c.id == client.id) {
                    *listed = client.clone();
                }
                state.selected_client = Some(client);
            }),
            CoachAction::FetchCoaches(lifecycle) => {
                self.settle(lifecycle, |state, coaches| state.coaches = coaches)
            }
            CoachAction::RequestCoach(lifecycle) => self.settle(lifecycle, |_, ()| {}),
            CoachAction::FetchRequests(lifecycle) => {
                self.settle(lifecycle, |state, requests| state.requests = requests)
            }
            CoachAction::AcceptRequest(lifecycle) => self.settle(lifecycle, |state, client| {
                state.requests.retain(|r| r.user_id.id != client.id);
                state.clients.push(client);
            }),
            CoachAction::RejectRequest(lifecycle) => self.settle(lifecycle, |state, rejected| {
                state.requests.retain(|r| r.id != rejected.id);
            }),
            CoachAction::ClearClientData => {
                self.selected_client = None;
                self.client_routines.clear();
            }
            CoachAction::ClearError => self.error = None,
            CoachAction::Reset => *self = CoachState::default(),
        }
    }
}

impl Slice for CoachState {
    fn status_mut(&mut self) -> (&mut bool, &mut Option<SliceError>) {
        (&mut self.loading, &mut self.error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::CoachRequestStatus;
    use serde_json::json;

    fn user(id: &str) -> User {
        serde_json::from_value(json!({ "_id": id, "username": id, "email": format!("{}@mail.com", id) }))
            .unwrap()
    }

    fn request(id: &str, from: &str) -> CoachRequest {
        CoachRequest {
            id: id.into(),
            user_id: user(from),
            coach_id: "coach-1".into(),
            status: CoachRequestStatus::Pending,
            created_at: None,
        }
    }

    #[test]
    fn accepting_moves_the_requester_to_clients() {
        let mut state = CoachState::default();
        state.reduce(CoachAction::FetchRequests(Lifecycle::Fulfilled(vec![
            request("req-1", "u-1"),
            request("req-2", "u-2"),
        ])));
        state.reduce(CoachAction::AcceptRequest(Lifecycle::Pending));
        assert!(state.loading);
        state.reduce(CoachAction::AcceptRequest(Lifecycle::Fulfilled(user("u-1"))));
        assert!(!state.loading);
        assert_eq!(state.clients.len(), 1);
        assert_eq!(state.requests.len(), 1);
        assert_eq!(state.requests[0].id, "req-2");
    }

    #[test]
    fn rejecting_removes_the_request_by_its_id() {
        let mut state = CoachState::default();
        state.reduce(CoachAction::FetchRequests(Lifecycle::Fulfilled(vec![
            request("req-1", "u-1"),
            request("req-2", "u-2"),
        ])));
        let mut rejected = request("req-2", "u-2");
        rejected.status = CoachRequestStatus::Rejected;
        state.reduce(CoachAction::RejectRequest(Lifecycle::Fulfilled(rejected)));
        assert_eq!(state.requests.len(), 1);
        assert_eq!(state.requests[0].id, "req-1");
        assert!(state.clients.is_empty());
    }

    #[test]
    fn client_update_refreshes_selection_and_list() {
        let mut state = CoachState::default();
        state.reduce(CoachAction::FetchClients(Lifecycle::Fulfilled(vec![user("u-1")])));
        let mut updated = user("u-1");
        updated.goals = vec!["perder peso".into()];
        state.reduce(CoachAction::UpdateClient(Lifecycle::Fulfilled(updated.clone())));
        assert_eq!(state.selected_client.as_ref(), Some(&updated));
        assert_eq!(state.clients[0].goals, vec!["perder peso"]);

        state.reduce(CoachAction::ClearClientData);
        assert!(state.selected_client.is_none());
    }

    #[test]
    fn failures_are_recorded_and_clearable() {
        let mut state = CoachState::default();
        state.reduce(CoachAction::FetchCoaches(Lifecycle::Rejected(SliceError::new("Error fetching coaches"))));
        assert_eq!(state.error.as_ref().unwrap().message, "Error fetching coaches");
        state.reduce(CoachAction::ClearError);
        assert!(state.error.is_none());
    }
}
