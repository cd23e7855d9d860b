//! Read-only projections over [`AppState`].

use std::collections::HashMap;

use shared::{
    domain::{CleaningFeedItem, CleaningId, CleaningJob, FeedKind, Offer, User, UserId},
    error::{ApiFailure, ErrorDetail, LocSegment, ValidationDetail},
};

use crate::store::AppState;

pub const GENERIC_ERROR_MESSAGE: &str = "Something went wrong. Contact support.";

/// Friendly text for body fields the server commonly rejects.
pub fn field_error_message(field: &str) -> Option<&'static str> {
    match field {
        "email" => Some("Please enter a valid email."),
        "username" => Some(
            "Please enter a username consisting of only letters, numbers, underscores, and dashes.",
        ),
        "password" => Some("Please choose a password with at least 7 characters."),
        _ => None,
    }
}

pub fn parse_error_detail(detail: &ValidationDetail) -> String {
    // path and query problems are not something the user can fix
    match detail.loc.first().and_then(LocSegment::as_name) {
        Some("body") => {}
        _ => return GENERIC_ERROR_MESSAGE.to_string(),
    }

    // loc is ["body", field] or ["body", embed_name, field]
    let field = detail.loc.iter().skip(1).filter_map(|s| s.as_name()).last();
    if let Some(message) = field.and_then(field_error_message) {
        return message.to_string();
    }
    match detail.msg.as_deref() {
        Some(msg) if !msg.is_empty() => msg.to_string(),
        _ => GENERIC_ERROR_MESSAGE.to_string(),
    }
}

pub fn extract_error_messages(error: Option<&ApiFailure>) -> Vec<String> {
    let Some(error) = error else {
        return Vec::new();
    };
    match &error.detail {
        ErrorDetail::Message(message) => vec![message.clone()],
        ErrorDetail::Validation(entries) => entries.iter().map(parse_error_detail).collect(),
        ErrorDetail::Empty => Vec::new(),
    }
}

pub fn user_is_owner_of_cleaning_job(job: Option<&CleaningJob>, user: Option<&User>) -> bool {
    match (job, user) {
        (Some(job), Some(user)) => job.owner.id() == &user.id,
        _ => false,
    }
}

pub fn is_authenticated(state: &AppState) -> bool {
    state.auth.is_authenticated
}

pub fn authenticated_user(state: &AppState) -> Option<&User> {
    state.auth.user.as_ref()
}

pub fn cleaning_job_by_id<'a>(state: &'a AppState, id: &CleaningId) -> Option<&'a CleaningJob> {
    state.cleanings.data.get(id)
}

pub fn user_owns_cleaning_job(state: &AppState, id: &CleaningId) -> bool {
    user_is_owner_of_cleaning_job(cleaning_job_by_id(state, id), authenticated_user(state))
}

pub fn offers_for_cleaning_job<'a>(
    state: &'a AppState,
    id: &CleaningId,
) -> Option<&'a HashMap<UserId, Offer>> {
    state.offers.data.get(id)
}

pub fn user_offer_for_cleaning_job<'a>(
    state: &'a AppState,
    cleaning_id: &CleaningId,
    user_id: &UserId,
) -> Option<&'a Offer> {
    offers_for_cleaning_job(state, cleaning_id).and_then(|offers| offers.get(user_id))
}

pub fn feed_items(state: &AppState, kind: FeedKind) -> &[CleaningFeedItem] {
    state.feed.data.get(&kind).map(Vec::as_slice).unwrap_or(&[])
}

pub fn feed_has_next(state: &AppState, kind: FeedKind) -> bool {
    state.feed.has_next.get(&kind).copied().unwrap_or(false)
}

/// Oldest loaded event timestamp: the `starting_date` for the next page.
pub fn feed_next_cursor(state: &AppState, kind: FeedKind) -> Option<chrono::DateTime<chrono::Utc>> {
    if !feed_has_next(state, kind) {
        return None;
    }
    feed_items(state, kind).last().map(|item| item.event_timestamp)
}

#[cfg(test)]
#[path = "tests/selectors_tests.rs"]
mod tests;
