use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;
use tracing::debug;

use crate::{
    events::StoreEvent,
    reducers::{
        self, auth::AuthState, cleanings::CleaningsState, feed::FeedState, offers::OffersState,
    },
};

const EVENT_BUFFER: usize = 1024;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct AppState {
    pub auth: AuthState,
    pub cleanings: CleaningsState,
    pub offers: OffersState,
    pub feed: FeedState,
}

/// Single state container. All mutation goes through [`Store::dispatch`],
/// which applies events one at a time and then fans them out to subscribers.
pub struct Store {
    state: Mutex<AppState>,
    events: broadcast::Sender<StoreEvent>,
}

impl Store {
    pub fn new() -> Arc<Self> {
        Self::with_state(AppState::default())
    }

    pub fn with_state(state: AppState) -> Arc<Self> {
        let (events, _) = broadcast::channel(EVENT_BUFFER);
        Arc::new(Self {
            state: Mutex::new(state),
            events,
        })
    }

    pub fn dispatch(&self, event: StoreEvent) {
        debug!(event = event.name(), "store: dispatch");
        let mut guard = self.lock();
        reducers::reduce(&mut guard, &event);
        // Sent under the lock so subscribers observe apply order.
        let _ = self.events.send(event);
    }

    pub fn read<R>(&self, f: impl FnOnce(&AppState) -> R) -> R {
        f(&self.lock())
    }

    pub fn snapshot(&self) -> AppState {
        self.lock().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.events.subscribe()
    }

    fn lock(&self) -> MutexGuard<'_, AppState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
#[path = "tests/store_tests.rs"]
mod tests;
