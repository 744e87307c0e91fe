//! The FileDrop service: registries, search and fan-out behind one boundary.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

use filedrop_core::constants::{
    GROUP_RESULT_LIMIT, INLINE_PAGE_SIZE, OFF_KEYWORD, PRIVATE_RESULT_LIMIT,
};
use filedrop_core::error::{FiledropError, Result};
use filedrop_core::types::{FileEntry, RegistryStats, SubscriberId};
use filedrop_registry::{FileRegistry, SubscriptionRegistry};

use crate::broadcast::{AnnounceBroadcaster, InvalidPatternPolicy};
use crate::cursor::{exact_name, InlineAnswer, PaginationCursor};
use crate::engine::SearchEngine;

/// Reply sent when a chat turns announcements off.
const ANNOUNCE_OFF_REPLY: &str = "Announcements off.";

/// Service configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDropConfig {
    /// Senders allowed to register files
    pub sources: Vec<SubscriberId>,
    /// Administrators; also allowed to register files
    pub admins: Vec<SubscriberId>,
    /// Result cap for searches from private chats
    pub private_limit: usize,
    /// Result cap for searches from group chats
    pub group_limit: usize,
    /// Inline results per page
    pub page_size: usize,
    /// Broadcaster behavior on invalid stored filters
    pub invalid_pattern_policy: InvalidPatternPolicy,
}

impl Default for FileDropConfig {
    fn default() -> Self {
        Self {
            sources: Vec::new(),
            admins: Vec::new(),
            private_limit: PRIVATE_RESULT_LIMIT,
            group_limit: GROUP_RESULT_LIMIT,
            page_size: INLINE_PAGE_SIZE,
            invalid_pattern_policy: InvalidPatternPolicy::default(),
        }
    }
}

impl FileDropConfig {
    /// Adds allowed sources.
    pub fn with_sources(mut self, sources: impl IntoIterator<Item = SubscriberId>) -> Self {
        self.sources.extend(sources);
        self
    }

    /// Adds administrators.
    pub fn with_admins(mut self, admins: impl IntoIterator<Item = SubscriberId>) -> Self {
        self.admins.extend(admins);
        self
    }

    /// Sets the inline page size.
    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Sets the broadcaster policy.
    pub fn with_policy(mut self, policy: InvalidPatternPolicy) -> Self {
        self.invalid_pattern_policy = policy;
        self
    }

    /// Returns true if `sender` may register files.
    pub fn is_authorized(&self, sender: SubscriberId) -> bool {
        self.sources.contains(&sender) || self.admins.contains(&sender)
    }

    /// Result cap for a command search.
    pub fn result_limit(&self, is_private: bool) -> usize {
        if is_private {
            self.private_limit
        } else {
            self.group_limit
        }
    }
}

/// Outcome of a successful registration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Entry as stored
    pub entry: FileEntry,
    /// Subscribers the transport should notify
    pub notify: Vec<SubscriberId>,
}

/// Service statistics.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDropStats {
    /// File registry statistics
    pub files: RegistryStats,
    /// Number of subscribed chats
    pub subscribers: usize,
}

/// The FileDrop service.
///
/// Reads run concurrently against registry snapshots. Mutations
/// (registration, subscription changes) are serialised by a writer lock so
/// log order and memory order always agree.
pub struct FileDrop {
    files: Arc<FileRegistry>,
    subscriptions: Arc<SubscriptionRegistry>,
    engine: SearchEngine,
    cursor: PaginationCursor,
    broadcaster: AnnounceBroadcaster,
    config: FileDropConfig,
    writer: Mutex<()>,
}

impl FileDrop {
    /// Creates a service over already loaded registries.
    pub fn new(
        files: Arc<FileRegistry>,
        subscriptions: Arc<SubscriptionRegistry>,
        config: FileDropConfig,
    ) -> Self {
        Self {
            files,
            subscriptions,
            engine: SearchEngine::new(),
            cursor: PaginationCursor::new(config.page_size),
            broadcaster: AnnounceBroadcaster::new(config.invalid_pattern_policy),
            config,
            writer: Mutex::new(()),
        }
    }

    /// Opens the file log and subscription snapshot on disk.
    ///
    /// Fails if the file log exists but cannot be read. An unreadable
    /// subscription snapshot starts empty.
    pub async fn open(
        files_path: impl AsRef<Path>,
        subscriptions_path: impl AsRef<Path>,
        config: FileDropConfig,
    ) -> Result<Self> {
        let files = FileRegistry::at_path(files_path).await?;
        let subscriptions = SubscriptionRegistry::at_path(subscriptions_path).await;
        Ok(Self::new(Arc::new(files), Arc::new(subscriptions), config))
    }

    /// Creates a service with nothing persisted.
    pub fn in_memory(config: FileDropConfig) -> Self {
        Self::new(
            Arc::new(FileRegistry::in_memory()),
            Arc::new(SubscriptionRegistry::in_memory()),
            config,
        )
    }

    /// Returns the file registry.
    pub fn files(&self) -> &FileRegistry {
        &self.files
    }

    /// Returns the subscription registry.
    pub fn subscriptions(&self) -> &SubscriptionRegistry {
        &self.subscriptions
    }

    /// Returns the configuration.
    pub fn config(&self) -> &FileDropConfig {
        &self.config
    }

    /// Registers a file sent by `sender` and works out who to announce it to.
    #[instrument(skip(self, file_id))]
    pub async fn register(
        &self,
        sender: SubscriberId,
        file_id: &str,
        file_name: &str,
    ) -> Result<Registration> {
        if !self.config.is_authorized(sender) {
            return Err(FiledropError::Unauthorized(sender));
        }

        let _guard = self.writer.lock().await;
        let entry = self.files.add(file_id, file_name).await?;
        let subscriptions = self.subscriptions.snapshot();
        let outcome = self.broadcaster.evaluate(&entry.name, &subscriptions);

        info!(notify = outcome.targets.len(), "File registered");
        Ok(Registration {
            entry,
            notify: outcome.targets,
        })
    }

    /// First file whose name matches `query`, in registry order.
    ///
    /// An anchored, escaped literal (the pattern inside an inline result's
    /// `/get` command) is resolved by exact name first, so it works for any
    /// registered name. Otherwise `query` is a search pattern; invalid
    /// patterns find nothing.
    pub fn lookup(&self, query: &str) -> Option<FileEntry> {
        if let Some(entry) = exact_name(query).and_then(|name| self.files.get(&name)) {
            return Some(entry);
        }
        self.engine.find_one(&self.files.all(), query)
    }

    /// Names matching `query`, capped by chat kind, then sorted.
    pub fn search(&self, query: &str, is_private: bool) -> Result<Vec<String>> {
        let limit = self.config.result_limit(is_private);
        let results = self.engine.find_sorted(&self.files.all(), query, limit)?;
        Ok(results.into_iter().map(|e| e.name).collect())
    }

    /// Answers an inline query for the page named by `offset`.
    pub fn inline(&self, query_id: &str, query: &str, offset: Option<&str>) -> Result<InlineAnswer> {
        let matcher = self.engine.validator().compile(query)?;
        let page = self.cursor.page(&self.files.all(), &matcher, offset)?;

        debug!(query_id, offset = page.offset, items = page.items.len(), "Inline query answered");
        Ok(InlineAnswer::from_page(query_id, &page))
    }

    /// Handles an announce command for `chat`.
    ///
    /// `"off"` clears the filter. Otherwise the pattern is stored and echoed
    /// back. A rejected pattern is not an error: the reply carries the reason.
    #[instrument(skip(self))]
    pub async fn set_subscription(&self, chat: SubscriberId, text: &str) -> Result<String> {
        let _guard = self.writer.lock().await;

        if text == OFF_KEYWORD {
            self.subscriptions.clear(chat).await?;
            return Ok(ANNOUNCE_OFF_REPLY.to_owned());
        }

        match self.subscriptions.set(chat, text).await {
            Ok(()) => Ok(text.to_owned()),
            Err(e) if e.is_user_facing() => Ok(e.to_string()),
            Err(e) => Err(e),
        }
    }

    /// Removes the filter of `chat`. Returns false if there was none.
    #[instrument(skip(self))]
    pub async fn clear_subscription(&self, chat: SubscriberId) -> Result<bool> {
        let _guard = self.writer.lock().await;
        self.subscriptions.clear(chat).await
    }

    /// Current filter of `chat`, if subscribed.
    pub fn subscription(&self, chat: SubscriberId) -> Option<String> {
        self.subscriptions.get(chat).ok()
    }

    /// Returns service statistics.
    pub fn stats(&self) -> FileDropStats {
        FileDropStats {
            files: self.files.stats(),
            subscribers: self.subscriptions.len(),
        }
    }
}

impl std::fmt::Debug for FileDrop {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileDrop")
            .field("files", &self.files)
            .field("subscriptions", &self.subscriptions)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
