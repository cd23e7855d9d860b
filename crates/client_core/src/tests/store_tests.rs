use super::*;
use crate::events::{Operation, Payload};

#[test]
fn starts_with_empty_domain_defaults() {
    let store = Store::new();
    let state = store.snapshot();
    assert_eq!(state, AppState::default());
    assert!(!state.auth.is_authenticated);
    assert!(state.cleanings.data.is_empty());
    assert!(state.feed.has_next.is_empty());
}

#[test]
fn dispatch_applies_then_broadcasts_in_order() {
    let store = Store::new();
    let mut rx = store.subscribe();

    store.dispatch(StoreEvent::request(Operation::Login));
    assert!(store.read(|state| state.auth.is_loading));
    store.dispatch(StoreEvent::success(Operation::Login, Payload::Empty));

    assert_eq!(
        rx.try_recv().expect("first").name(),
        "@@auth/REQUEST_LOGIN"
    );
    assert_eq!(
        rx.try_recv().expect("second").name(),
        "@@auth/REQUEST_LOGIN_SUCCESS"
    );
    assert!(rx.try_recv().is_err());
}

#[test]
fn instances_are_isolated() {
    let first = Store::new();
    let second = Store::new();

    first.dispatch(StoreEvent::request(Operation::FetchCleaningFeed));
    assert!(first.read(|state| state.feed.is_loading));
    assert!(!second.read(|state| state.feed.is_loading));
}

#[test]
fn dispatch_without_subscribers_still_applies() {
    let store = Store::new();
    store.dispatch(StoreEvent::LogUserOut);
    store.dispatch(StoreEvent::request(Operation::CreateOffer));
    assert!(store.read(|state| state.offers.is_updating));
}
