//! Subscription registry: chat → announcement filter.

use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{info, instrument, warn};

use filedrop_core::error::{FiledropError, Result};
use filedrop_core::traits::SubscriptionStore;
use filedrop_core::types::{SubscriberId, Subscription};
use filedrop_pattern::PatternValidator;

use crate::{JsonSubscriptionStore, MemorySubscriptionStore};

/// Registry of announcement filters, one per chat.
///
/// Every mutation rewrites the whole snapshot before memory changes, so a
/// failed write leaves both sides at the previous state.
pub struct SubscriptionRegistry {
    store: Arc<dyn SubscriptionStore>,
    subscriptions: RwLock<BTreeMap<SubscriberId, String>>,
    validator: PatternValidator,
}

impl SubscriptionRegistry {
    /// Creates an empty registry over `store` without reading it.
    pub fn new(store: Arc<dyn SubscriptionStore>) -> Self {
        Self {
            store,
            subscriptions: RwLock::new(BTreeMap::new()),
            validator: PatternValidator::subscription(),
        }
    }

    /// Creates a registry over `store` and restores its snapshot.
    pub async fn open(store: Arc<dyn SubscriptionStore>) -> Self {
        let registry = Self::new(store);
        registry.load_all().await;
        registry
    }

    /// Opens the JSON snapshot at `path`.
    pub async fn at_path(path: impl AsRef<Path>) -> Self {
        Self::open(Arc::new(JsonSubscriptionStore::new(path))).await
    }

    /// Creates an empty registry that is never persisted.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemorySubscriptionStore::new()))
    }

    /// Restores the map from the stored snapshot.
    ///
    /// A missing, unreadable or corrupt snapshot starts the registry empty.
    /// Returns the number of subscriptions restored.
    #[instrument(skip(self))]
    pub async fn load_all(&self) -> usize {
        let restored = match self.store.load().await {
            Ok(map) => map,
            Err(e) => {
                warn!(error = %e, "Subscription snapshot unavailable, starting empty");
                BTreeMap::new()
            }
        };

        let count = restored.len();
        *self.subscriptions.write() = restored;
        info!(count, "Loaded subscriptions");
        count
    }

    /// Sets or replaces the filter of `subscriber`.
    ///
    /// The pattern must pass subscription validation (no `(`, at most 100
    /// characters, valid syntax).
    #[instrument(skip(self))]
    pub async fn set(&self, subscriber: SubscriberId, pattern: &str) -> Result<()> {
        self.validator.compile(pattern)?;

        let mut next = self.subscriptions.read().clone();
        next.insert(subscriber, pattern.to_owned());
        self.store.save(&next).await?;
        *self.subscriptions.write() = next;

        info!("Subscription set");
        Ok(())
    }

    /// Removes the filter of `subscriber`.
    ///
    /// Returns false, without touching the store, if there was none.
    #[instrument(skip(self))]
    pub async fn clear(&self, subscriber: SubscriberId) -> Result<bool> {
        let mut next = self.subscriptions.read().clone();
        if next.remove(&subscriber).is_none() {
            return Ok(false);
        }
        self.store.save(&next).await?;
        *self.subscriptions.write() = next;

        info!("Subscription cleared");
        Ok(true)
    }

    /// Returns the filter of `subscriber`.
    pub fn get(&self, subscriber: SubscriberId) -> Result<String> {
        self.subscriptions
            .read()
            .get(&subscriber)
            .cloned()
            .ok_or_else(|| FiledropError::KeyNotFound(format!("subscription for chat {}", subscriber)))
    }

    /// Returns true if `subscriber` has a filter.
    pub fn contains(&self, subscriber: SubscriberId) -> bool {
        self.subscriptions.read().contains_key(&subscriber)
    }

    /// Snapshot of every subscription, ordered by subscriber id.
    pub fn snapshot(&self) -> Vec<Subscription> {
        self.subscriptions
            .read()
            .iter()
            .map(|(id, pattern)| Subscription::new(*id, pattern.clone()))
            .collect()
    }

    /// Returns the number of subscribers.
    pub fn len(&self) -> usize {
        self.subscriptions.read().len()
    }

    /// Returns true if nobody is subscribed.
    pub fn is_empty(&self) -> bool {
        self.subscriptions.read().is_empty()
    }
}

impl std::fmt::Debug for SubscriptionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubscriptionRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}
