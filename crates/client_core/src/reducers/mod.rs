//! Per-domain reducers. Each one only sees events addressed to its domain.

pub mod auth;
pub mod cleanings;
pub mod feed;
pub mod offers;

use crate::{
    events::{Domain, StoreEvent},
    store::AppState,
};

pub fn reduce(state: &mut AppState, event: &StoreEvent) {
    match event.domain() {
        Domain::Auth => auth::reduce(&mut state.auth, event),
        Domain::Cleanings => cleanings::reduce(&mut state.cleanings, event),
        Domain::Offers => offers::reduce(&mut state.offers, event),
        Domain::Feed => feed::reduce(&mut state.feed, event),
    }
}

#[cfg(test)]
#[path = "../tests/reducers_tests.rs"]
mod tests;
