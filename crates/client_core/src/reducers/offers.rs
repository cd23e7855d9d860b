use std::collections::HashMap;

use shared::{
    domain::{CleaningId, Offer, OfferStatus, UserId},
    error::ApiFailure,
};

use crate::events::{LifecycleEvent, Operation, Payload, Phase, StoreEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OffersState {
    pub is_loading: bool,
    pub is_updating: bool,
    pub error: Option<ApiFailure>,
    /// Offers grouped by cleaning job, then by the offering user.
    pub data: HashMap<CleaningId, HashMap<UserId, Offer>>,
}

impl OffersState {
    fn upsert(&mut self, offer: &Offer) {
        self.data
            .entry(offer.cleaning_id.clone())
            .or_default()
            .insert(offer.user_id.clone(), offer.clone());
    }

    fn remove(&mut self, cleaning_id: &CleaningId, user_id: &UserId) {
        if let Some(offers) = self.data.get_mut(cleaning_id) {
            offers.remove(user_id);
            if offers.is_empty() {
                self.data.remove(cleaning_id);
            }
        }
    }

    /// Mirrors the server: one offer changes status and its siblings follow.
    fn restatus_siblings(&mut self, offer: &Offer, from: OfferStatus, to: OfferStatus) {
        let Some(offers) = self.data.get_mut(&offer.cleaning_id) else {
            return;
        };
        offers
            .values_mut()
            .filter(|other| other.user_id != offer.user_id && other.status == from)
            .for_each(|other| other.status = to);
    }
}

pub fn reduce(state: &mut OffersState, event: &StoreEvent) {
    if let StoreEvent::Lifecycle(event) = event {
        reduce_lifecycle(state, event);
    }
}

fn reduce_lifecycle(state: &mut OffersState, event: &LifecycleEvent) {
    let is_update = event.operation.is_update();
    match &event.phase {
        Phase::Request => {
            if is_update {
                state.is_updating = true;
            } else {
                state.is_loading = true;
            }
            state.error = None;
        }
        Phase::Failure(error) => {
            if is_update {
                state.is_updating = false;
            } else {
                state.is_loading = false;
            }
            state.error = Some(error.clone());
        }
        Phase::Success(payload) => {
            if is_update {
                state.is_updating = false;
            } else {
                state.is_loading = false;
            }
            state.error = None;
            match payload {
                Payload::Offer(offer) => {
                    state.upsert(offer);
                    match event.operation {
                        Operation::AcceptOffer => {
                            state.restatus_siblings(offer, OfferStatus::Pending, OfferStatus::Rejected)
                        }
                        Operation::CancelOffer => {
                            state.restatus_siblings(offer, OfferStatus::Rejected, OfferStatus::Pending)
                        }
                        _ => {}
                    }
                }
                Payload::Offers(offers) => offers.iter().for_each(|offer| state.upsert(offer)),
                Payload::OfferRemoved {
                    cleaning_id,
                    user_id,
                } => state.remove(cleaning_id, user_id),
                _ => {}
            }
        }
    }
}
