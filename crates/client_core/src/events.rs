//! Typed lifecycle events folded by the store.

use serde_json::Value;
use shared::{
    domain::{CleaningFeedItem, CleaningId, CleaningJob, FeedKind, Offer, User, UserId},
    error::ApiFailure,
    protocol::{AccessToken, RegisteredUser},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Domain {
    Auth,
    Cleanings,
    Offers,
    Feed,
}

impl Domain {
    pub fn prefix(self) -> &'static str {
        match self {
            Self::Auth => "@@auth",
            Self::Cleanings => "@@cleanings",
            Self::Offers => "@@offers",
            Self::Feed => "@@feed",
        }
    }
}

/// Every network-backed operation. The owning domain and the three lifecycle
/// event names are fixed per variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Login,
    Register,
    FetchUserFromToken,
    CreateCleaningJob,
    FetchCleaningJobById,
    FetchUserOwnedCleaningJobs,
    UpdateCleaningJob,
    CreateOffer,
    FetchOffersForCleaningJob,
    FetchUserOfferForCleaningJob,
    AcceptOffer,
    CancelOffer,
    RescindOffer,
    FetchCleaningFeed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LifecycleNames {
    pub request: &'static str,
    pub success: &'static str,
    pub failure: &'static str,
}

macro_rules! lifecycle_names {
    ($prefix:literal, $base:literal) => {
        LifecycleNames {
            request: concat!($prefix, "/", $base),
            success: concat!($prefix, "/", $base, "_SUCCESS"),
            failure: concat!($prefix, "/", $base, "_FAILURE"),
        }
    };
}

impl Operation {
    pub fn domain(self) -> Domain {
        match self {
            Self::Login | Self::Register | Self::FetchUserFromToken => Domain::Auth,
            Self::CreateCleaningJob
            | Self::FetchCleaningJobById
            | Self::FetchUserOwnedCleaningJobs
            | Self::UpdateCleaningJob => Domain::Cleanings,
            Self::CreateOffer
            | Self::FetchOffersForCleaningJob
            | Self::FetchUserOfferForCleaningJob
            | Self::AcceptOffer
            | Self::CancelOffer
            | Self::RescindOffer => Domain::Offers,
            Self::FetchCleaningFeed => Domain::Feed,
        }
    }

    /// Operations that mutate an existing entity track progress in
    /// `is_updating` rather than `is_loading`.
    pub fn is_update(self) -> bool {
        matches!(
            self,
            Self::UpdateCleaningJob
                | Self::CreateOffer
                | Self::AcceptOffer
                | Self::CancelOffer
                | Self::RescindOffer
        )
    }

    pub fn names(self) -> LifecycleNames {
        match self {
            Self::Login => lifecycle_names!("@@auth", "REQUEST_LOGIN"),
            Self::Register => lifecycle_names!("@@auth", "REQUEST_USER_SIGN_UP"),
            Self::FetchUserFromToken => lifecycle_names!("@@auth", "FETCHING_USER_FROM_TOKEN"),
            Self::CreateCleaningJob => lifecycle_names!("@@cleanings", "CREATE_CLEANING_JOB"),
            Self::FetchCleaningJobById => {
                lifecycle_names!("@@cleanings", "FETCH_CLEANING_JOB_BY_ID")
            }
            Self::FetchUserOwnedCleaningJobs => {
                lifecycle_names!("@@cleanings", "FETCH_ALL_USER_OWNED_CLEANING_JOBS")
            }
            Self::UpdateCleaningJob => lifecycle_names!("@@cleanings", "REQUEST_CLEANING_JOB_UPDATE"),
            Self::CreateOffer => lifecycle_names!("@@offers", "CREATE_OFFER_FOR_CLEANING_JOB"),
            Self::FetchOffersForCleaningJob => {
                lifecycle_names!("@@offers", "FETCH_ALL_OFFERS_FOR_CLEANING_JOB")
            }
            Self::FetchUserOfferForCleaningJob => {
                lifecycle_names!("@@offers", "FETCH_USER_OFFER_FOR_CLEANING_JOB")
            }
            Self::AcceptOffer => lifecycle_names!("@@offers", "ACCEPT_USERS_OFFER_FOR_CLEANING_JOB"),
            Self::CancelOffer => lifecycle_names!("@@offers", "CANCEL_USER_OFFER_FOR_CLEANING_JOB"),
            Self::RescindOffer => lifecycle_names!("@@offers", "RESCIND_USER_OFFER_FOR_CLEANING_JOB"),
            Self::FetchCleaningFeed => lifecycle_names!("@@feed", "FETCH_CLEANING_FEED_ITEMS"),
        }
    }
}

/// Data carried by a SUCCESS event.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Empty,
    AccessToken(AccessToken),
    User(User),
    CleaningJob(CleaningJob),
    CleaningJobs(Vec<CleaningJob>),
    Offer(Offer),
    Offers(Vec<Offer>),
    OfferRemoved {
        cleaning_id: CleaningId,
        user_id: UserId,
    },
    Feed {
        kind: FeedKind,
        items: Vec<CleaningFeedItem>,
        has_next: bool,
    },
}

impl From<()> for Payload {
    fn from(_: ()) -> Self {
        Self::Empty
    }
}

/// Bodies the client acknowledges without interpreting.
impl From<Value> for Payload {
    fn from(_: Value) -> Self {
        Self::Empty
    }
}

impl From<AccessToken> for Payload {
    fn from(value: AccessToken) -> Self {
        Self::AccessToken(value)
    }
}

impl From<User> for Payload {
    fn from(value: User) -> Self {
        Self::User(value)
    }
}

impl From<RegisteredUser> for Payload {
    fn from(value: RegisteredUser) -> Self {
        Self::User(value.user)
    }
}

impl From<CleaningJob> for Payload {
    fn from(value: CleaningJob) -> Self {
        Self::CleaningJob(value)
    }
}

impl From<Vec<CleaningJob>> for Payload {
    fn from(value: Vec<CleaningJob>) -> Self {
        Self::CleaningJobs(value)
    }
}

impl From<Offer> for Payload {
    fn from(value: Offer) -> Self {
        Self::Offer(value)
    }
}

impl From<Vec<Offer>> for Payload {
    fn from(value: Vec<Offer>) -> Self {
        Self::Offers(value)
    }
}

impl From<Vec<CleaningFeedItem>> for Payload {
    fn from(items: Vec<CleaningFeedItem>) -> Self {
        Self::Feed {
            kind: FeedKind::Cleaning,
            items,
            has_next: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Request,
    Success(Payload),
    Failure(ApiFailure),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LifecycleEvent {
    pub operation: Operation,
    pub phase: Phase,
}

impl LifecycleEvent {
    pub fn name(&self) -> &'static str {
        let names = self.operation.names();
        match self.phase {
            Phase::Request => names.request,
            Phase::Success(_) => names.success,
            Phase::Failure(_) => names.failure,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum StoreEvent {
    Lifecycle(LifecycleEvent),
    LogUserOut,
    ClearCurrentCleaningJob,
}

impl StoreEvent {
    pub fn request(operation: Operation) -> Self {
        Self::Lifecycle(LifecycleEvent {
            operation,
            phase: Phase::Request,
        })
    }

    pub fn success(operation: Operation, payload: Payload) -> Self {
        Self::Lifecycle(LifecycleEvent {
            operation,
            phase: Phase::Success(payload),
        })
    }

    pub fn failure(operation: Operation, error: ApiFailure) -> Self {
        Self::Lifecycle(LifecycleEvent {
            operation,
            phase: Phase::Failure(error),
        })
    }

    pub fn domain(&self) -> Domain {
        match self {
            Self::Lifecycle(event) => event.operation.domain(),
            Self::LogUserOut => Domain::Auth,
            Self::ClearCurrentCleaningJob => Domain::Cleanings,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Lifecycle(event) => event.name(),
            Self::LogUserOut => "@@auth/REQUEST_LOG_USER_OUT",
            Self::ClearCurrentCleaningJob => "@@cleanings/CLEAR_CURRENT_CLEANING_JOB",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lifecycle_names_share_the_domain_prefix() {
        let ops = [
            Operation::Login,
            Operation::Register,
            Operation::FetchUserFromToken,
            Operation::CreateCleaningJob,
            Operation::FetchCleaningJobById,
            Operation::FetchUserOwnedCleaningJobs,
            Operation::UpdateCleaningJob,
            Operation::CreateOffer,
            Operation::FetchOffersForCleaningJob,
            Operation::FetchUserOfferForCleaningJob,
            Operation::AcceptOffer,
            Operation::CancelOffer,
            Operation::RescindOffer,
            Operation::FetchCleaningFeed,
        ];
        for op in ops {
            let names = op.names();
            let prefix = op.domain().prefix();
            assert!(names.request.starts_with(prefix), "{op:?}");
            assert_eq!(names.success, format!("{}_SUCCESS", names.request));
            assert_eq!(names.failure, format!("{}_FAILURE", names.request));
        }
    }

    #[test]
    fn login_event_names_match_wire_constants() {
        assert_eq!(
            StoreEvent::request(Operation::Login).name(),
            "@@auth/REQUEST_LOGIN"
        );
        assert_eq!(
            StoreEvent::success(Operation::FetchUserFromToken, Payload::Empty).name(),
            "@@auth/FETCHING_USER_FROM_TOKEN_SUCCESS"
        );
    }
}
