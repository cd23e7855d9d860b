use serde_json::Value;
use shared::domain::{CleaningId, Offer};

use super::MarketplaceClient;
use crate::{
    events::{Operation, Payload},
    pipeline::{Outcome, RequestDescriptor},
};

fn offers_path(cleaning_id: &CleaningId) -> String {
    format!("/cleanings/{cleaning_id}/offers/")
}

fn user_offer_path(cleaning_id: &CleaningId, username: &str) -> String {
    format!("/cleanings/{cleaning_id}/offers/{username}/")
}

impl MarketplaceClient {
    /// The offering user is taken from the bearer token.
    pub async fn create_offer_for_cleaning_job(&self, cleaning_id: &CleaningId) -> Outcome<Offer> {
        self.pipeline
            .run(RequestDescriptor::<Offer>::post(
                Operation::CreateOffer,
                offers_path(cleaning_id),
            ))
            .await
    }

    pub async fn fetch_all_offers_for_cleaning_job(
        &self,
        cleaning_id: &CleaningId,
    ) -> Outcome<Vec<Offer>> {
        self.pipeline
            .run(RequestDescriptor::<Vec<Offer>>::get(
                Operation::FetchOffersForCleaningJob,
                offers_path(cleaning_id),
            ))
            .await
    }

    pub async fn fetch_user_offer_for_cleaning_job(
        &self,
        cleaning_id: &CleaningId,
        username: &str,
    ) -> Outcome<Offer> {
        self.pipeline
            .run(RequestDescriptor::<Offer>::get(
                Operation::FetchUserOfferForCleaningJob,
                user_offer_path(cleaning_id, username),
            ))
            .await
    }

    /// Owner only. The server rejects every other pending offer on the job.
    pub async fn accept_users_offer_for_cleaning_job(
        &self,
        cleaning_id: &CleaningId,
        username: &str,
    ) -> Outcome<Offer> {
        self.pipeline
            .run(RequestDescriptor::<Offer>::put(
                Operation::AcceptOffer,
                user_offer_path(cleaning_id, username),
            ))
            .await
    }

    /// Cancels the caller's accepted offer; the other offers return to pending.
    pub async fn cancel_user_offer_for_cleaning_job(&self, cleaning_id: &CleaningId) -> Outcome<Offer> {
        self.pipeline
            .run(RequestDescriptor::<Offer>::put(
                Operation::CancelOffer,
                offers_path(cleaning_id),
            ))
            .await
    }

    /// Withdraws the caller's pending offer. The server deletes the row, so the
    /// cached entry is dropped rather than updated.
    pub async fn rescind_user_offer_for_cleaning_job(
        &self,
        cleaning_id: &CleaningId,
    ) -> Outcome<Value> {
        let user_id = self
            .store()
            .read(|state| state.auth.user.as_ref().map(|user| user.id.clone()));
        let cleaning = cleaning_id.clone();
        let descriptor =
            RequestDescriptor::<Value>::delete(Operation::RescindOffer, offers_path(cleaning_id))
                .on_success(move |_| {
                    Ok(match user_id {
                        Some(user_id) => Payload::OfferRemoved {
                            cleaning_id: cleaning,
                            user_id,
                        },
                        None => Payload::Empty,
                    })
                });
        self.pipeline.run(descriptor).await
    }
}
