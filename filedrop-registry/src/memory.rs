//! In-memory storage backends.
//!
//! Nothing survives the process; used by tests, benchmarks and the CLI's
//! scratch registries.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use filedrop_core::error::{FiledropError, Result};
use filedrop_core::traits::{LogStore, SubscriptionStore};
use filedrop_core::types::SubscriberId;

/// In-memory append-only log.
#[derive(Debug, Default)]
pub struct MemoryLog {
    lines: RwLock<Vec<String>>,
}

impl MemoryLog {
    /// Creates an empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a log pre-filled with `lines`, as if read from disk.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            lines: RwLock::new(lines.into_iter().map(Into::into).collect()),
        }
    }

    /// Returns a copy of every record.
    pub fn lines(&self) -> Vec<String> {
        self.lines.read().clone()
    }
}

#[async_trait]
impl LogStore for MemoryLog {
    async fn append(&self, line: &str) -> Result<()> {
        if line.contains(['\n', '\r']) {
            return Err(FiledropError::InvalidEntry(
                "log record must not contain line breaks".into(),
            ));
        }
        self.lines.write().push(line.to_owned());
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<String>> {
        Ok(self.lines())
    }
}

/// In-memory subscription snapshot.
#[derive(Debug, Default)]
pub struct MemorySubscriptionStore {
    snapshot: RwLock<BTreeMap<SubscriberId, String>>,
    saves: AtomicU64,
}

impl MemorySubscriptionStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store holding `snapshot`, as if saved by an earlier process.
    pub fn with_snapshot(snapshot: BTreeMap<SubscriberId, String>) -> Self {
        Self {
            snapshot: RwLock::new(snapshot),
            saves: AtomicU64::new(0),
        }
    }

    /// Returns the last saved snapshot.
    pub fn snapshot(&self) -> BTreeMap<SubscriberId, String> {
        self.snapshot.read().clone()
    }

    /// Number of times the snapshot was rewritten.
    pub fn save_count(&self) -> u64 {
        self.saves.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SubscriptionStore for MemorySubscriptionStore {
    async fn load(&self) -> Result<BTreeMap<SubscriberId, String>> {
        Ok(self.snapshot())
    }

    async fn save(&self, subscriptions: &BTreeMap<SubscriberId, String>) -> Result<()> {
        *self.snapshot.write() = subscriptions.clone();
        self.saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
