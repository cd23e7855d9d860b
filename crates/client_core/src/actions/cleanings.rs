use serde_json::json;
use shared::{
    domain::{CleaningId, CleaningJob, Offer},
    protocol::{CleaningCreate, CleaningUpdate},
};
use tracing::info;

use super::MarketplaceClient;
use crate::{
    events::{Operation, StoreEvent},
    pipeline::{Outcome, RequestDescriptor},
};

impl MarketplaceClient {
    pub async fn create_cleaning_job(&self, new_job: &CleaningCreate) -> Outcome<CleaningJob> {
        self.pipeline
            .run(
                RequestDescriptor::<CleaningJob>::post(Operation::CreateCleaningJob, "/cleanings/")
                    .json(json!(new_job)),
            )
            .await
    }

    pub async fn fetch_cleaning_job_by_id(&self, id: &CleaningId) -> Outcome<CleaningJob> {
        self.pipeline
            .run(RequestDescriptor::<CleaningJob>::get(
                Operation::FetchCleaningJobById,
                format!("/cleanings/{id}/"),
            ))
            .await
    }

    pub async fn fetch_all_user_owned_cleaning_jobs(&self) -> Outcome<Vec<CleaningJob>> {
        self.pipeline
            .run(RequestDescriptor::<Vec<CleaningJob>>::get(
                Operation::FetchUserOwnedCleaningJobs,
                "/cleanings/",
            ))
            .await
    }

    pub async fn update_cleaning_job(
        &self,
        id: &CleaningId,
        update: &CleaningUpdate,
    ) -> Outcome<CleaningJob> {
        self.pipeline
            .run(
                RequestDescriptor::<CleaningJob>::put(
                    Operation::UpdateCleaningJob,
                    format!("/cleanings/{id}/"),
                )
                .json(json!(update)),
            )
            .await
    }

    pub fn clear_current_cleaning_job(&self) {
        self.store().dispatch(StoreEvent::ClearCurrentCleaningJob);
    }

    /// Detail view loader. When the cache already tells whether the viewer owns
    /// the job, the job and its offers are fetched concurrently; otherwise the
    /// job is fetched first so the offers request can be scoped by its owner.
    pub async fn load_cleaning_job_with_offers(
        &self,
        id: &CleaningId,
    ) -> (Outcome<CleaningJob>, Outcome<Vec<Offer>>) {
        let (job, offers) = match self.offer_scope(id) {
            Some(scope) => futures::join!(
                self.fetch_cleaning_job_by_id(id),
                self.fetch_offers_in_scope(id, scope)
            ),
            None => {
                let job = self.fetch_cleaning_job_by_id(id).await;
                let scope = self.offer_scope(id).unwrap_or(OfferScope::All);
                let offers = self.fetch_offers_in_scope(id, scope).await;
                (job, offers)
            }
        };
        info!(
            cleaning_id = %id,
            job_loaded = job.is_success(),
            offers_loaded = offers.is_success(),
            "cleanings: detail view loaded"
        );
        (job, offers)
    }

    /// `None` while the job's owner is still unknown for a signed-in viewer.
    fn offer_scope(&self, id: &CleaningId) -> Option<OfferScope> {
        self.store().read(|state| {
            let Some(user) = state.auth.user.as_ref() else {
                return Some(OfferScope::All);
            };
            state.cleanings.data.get(id).map(|job| {
                if job.owner.id() == &user.id {
                    OfferScope::All
                } else {
                    OfferScope::Own(user.username.clone())
                }
            })
        })
    }

    async fn fetch_offers_in_scope(&self, id: &CleaningId, scope: OfferScope) -> Outcome<Vec<Offer>> {
        match scope {
            OfferScope::All => self.fetch_all_offers_for_cleaning_job(id).await,
            OfferScope::Own(username) => {
                match self.fetch_user_offer_for_cleaning_job(id, &username).await {
                    Outcome::Success { status, data } => Outcome::Success {
                        status,
                        data: vec![data],
                    },
                    Outcome::Failure { status, error } => Outcome::Failure { status, error },
                }
            }
        }
    }
}

/// Owners see every offer on their job; anyone else only their own.
enum OfferScope {
    All,
    Own(String),
}
