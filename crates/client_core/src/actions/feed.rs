use chrono::{DateTime, SecondsFormat, Utc};
use shared::domain::{CleaningFeedItem, FeedKind};
use tracing::debug;

use super::MarketplaceClient;
use crate::{
    events::{Operation, Payload},
    pipeline::{Outcome, RequestDescriptor},
    selectors,
};

pub const DEFAULT_PAGE_CHUNK_SIZE: usize = 20;

impl MarketplaceClient {
    /// Loads one page of feed events older than `starting_date` (now by default).
    /// A full page means there may be more to fetch.
    pub async fn fetch_cleaning_feed_items(
        &self,
        starting_date: Option<DateTime<Utc>>,
        page_chunk_size: Option<usize>,
    ) -> Outcome<Vec<CleaningFeedItem>> {
        let starting_date = starting_date.unwrap_or_else(Utc::now);
        let page_chunk_size = page_chunk_size.unwrap_or(DEFAULT_PAGE_CHUNK_SIZE);

        let descriptor = RequestDescriptor::<Vec<CleaningFeedItem>>::get(
            Operation::FetchCleaningFeed,
            "/feed/cleanings/",
        )
        .query(
            "starting_date",
            starting_date.to_rfc3339_opts(SecondsFormat::Micros, true),
        )
        .query("page_chunk_size", page_chunk_size)
        .on_success(move |response| {
            let has_next = response.data.len() == page_chunk_size;
            debug!(items = response.data.len(), has_next, "feed: page received");
            Ok(Payload::Feed {
                kind: FeedKind::Cleaning,
                items: response.data.clone(),
                has_next,
            })
        });

        self.pipeline.run(descriptor).await
    }

    /// Continues from the oldest loaded event. `None` when the feed is exhausted.
    pub async fn fetch_next_feed_page(
        &self,
        page_chunk_size: Option<usize>,
    ) -> Option<Outcome<Vec<CleaningFeedItem>>> {
        let cursor = self
            .store()
            .read(|state| selectors::feed_next_cursor(state, FeedKind::Cleaning))?;
        Some(self.fetch_cleaning_feed_items(Some(cursor), page_chunk_size).await)
    }
}
