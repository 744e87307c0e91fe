//! Announcement subscriptions.

use serde::{Deserialize, Serialize};

/// Chat identity of a subscriber. Group chats use negative identifiers.
pub type SubscriberId = i64;

/// A chat's filter for new-file announcements.
///
/// Presence in the subscription registry means "subscribed"; the pattern is
/// regex source that passed validation when it was stored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    /// Subscribing chat
    pub subscriber_id: SubscriberId,
    /// Regex source matched against new file names
    pub pattern: String,
}

impl Subscription {
    /// Creates a new subscription.
    pub fn new(subscriber_id: SubscriberId, pattern: impl Into<String>) -> Self {
        Self {
            subscriber_id,
            pattern: pattern.into(),
        }
    }
}
