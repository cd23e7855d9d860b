use std::collections::{HashMap, HashSet};

use shared::{
    domain::{CleaningFeedItem, FeedKind},
    error::ApiFailure,
};

use crate::events::{Payload, Phase, StoreEvent};

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub is_loading: bool,
    pub error: Option<ApiFailure>,
    /// Newest event first, one entry per `(cleaning id, event type)`.
    pub data: HashMap<FeedKind, Vec<CleaningFeedItem>>,
    pub has_next: HashMap<FeedKind, bool>,
}

pub fn reduce(state: &mut FeedState, event: &StoreEvent) {
    let StoreEvent::Lifecycle(event) = event else {
        return;
    };

    match &event.phase {
        Phase::Request => {
            state.is_loading = true;
            state.error = None;
        }
        Phase::Failure(error) => {
            state.is_loading = false;
            state.error = Some(error.clone());
        }
        Phase::Success(Payload::Feed {
            kind,
            items,
            has_next,
        }) => {
            state.is_loading = false;
            state.error = None;
            merge_page(state.data.entry(*kind).or_default(), items);
            state.has_next.insert(*kind, *has_next);
        }
        Phase::Success(_) => {
            state.is_loading = false;
            state.error = None;
        }
    }
}

fn merge_page(existing: &mut Vec<CleaningFeedItem>, page: &[CleaningFeedItem]) {
    let incoming: HashSet<_> = page.iter().map(CleaningFeedItem::feed_key).collect();
    existing.retain(|item| !incoming.contains(&item.feed_key()));
    existing.extend(page.iter().cloned());
    existing.sort_by(|a, b| b.event_timestamp.cmp(&a.event_timestamp));
}
