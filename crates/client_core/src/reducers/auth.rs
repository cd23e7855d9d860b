use shared::{domain::User, error::ApiFailure};
use tracing::info;

use crate::events::{LifecycleEvent, Operation, Payload, Phase, StoreEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AuthState {
    pub is_loading: bool,
    pub is_authenticated: bool,
    pub user_loaded: bool,
    pub error: Option<ApiFailure>,
    pub user: Option<User>,
}

pub fn reduce(state: &mut AuthState, event: &StoreEvent) {
    match event {
        StoreEvent::LogUserOut => {
            info!("auth: user logged out");
            *state = AuthState::default();
        }
        StoreEvent::Lifecycle(event) => reduce_lifecycle(state, event),
        StoreEvent::ClearCurrentCleaningJob => {}
    }
}

fn reduce_lifecycle(state: &mut AuthState, event: &LifecycleEvent) {
    match (event.operation, &event.phase) {
        (Operation::Login | Operation::Register | Operation::FetchUserFromToken, Phase::Request) => {
            state.is_loading = true;
            state.error = None;
        }
        (Operation::Login | Operation::Register, Phase::Success(_)) => {
            state.is_loading = false;
            state.error = None;
        }
        (Operation::Login | Operation::Register, Phase::Failure(error)) => {
            state.is_loading = false;
            state.error = Some(error.clone());
            state.user = None;
        }
        (Operation::FetchUserFromToken, Phase::Success(payload)) => {
            state.is_loading = false;
            state.error = None;
            state.user_loaded = true;
            if let Payload::User(user) = payload {
                info!(user_id = %user.id, "auth: user loaded from token");
                state.is_authenticated = true;
                state.user = Some(user.clone());
            }
        }
        (Operation::FetchUserFromToken, Phase::Failure(error)) => {
            state.is_loading = false;
            state.is_authenticated = false;
            state.user_loaded = true;
            state.error = Some(error.clone());
            state.user = None;
        }
        _ => {}
    }
}
