//! File registry: the authoritative name → identifier mapping.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info, instrument, warn};

use filedrop_core::error::Result;
use filedrop_core::traits::LogStore;
use filedrop_core::types::{FileEntry, RegistryStats};

use crate::{FileLog, MemoryLog};

/// Registry of known files, backed by an append-only log.
///
/// The in-memory index is rebuilt from the full log by [`load`](Self::load);
/// afterwards every [`add`](Self::add) appends one record and then updates
/// the index. A crash between the two steps leaves the log ahead of memory,
/// never the other way round, and the next load recovers the entry.
///
/// # Ordering
///
/// Entries iterate in first-insertion order of their name. Re-adding an
/// existing name replaces its identifier in place (last write wins) without
/// moving it.
///
/// # Writers
///
/// One writer at a time: concurrent `add` calls may reach the log and the
/// index in different orders.
pub struct FileRegistry {
    store: Arc<dyn LogStore>,
    index: RwLock<FileIndex>,
}

#[derive(Debug, Default)]
struct FileIndex {
    entries: Vec<FileEntry>,
    positions: HashMap<String, usize>,
    stats: RegistryStats,
}

impl FileIndex {
    fn upsert(&mut self, entry: FileEntry) {
        match self.positions.get(&entry.name) {
            Some(&pos) => self.entries[pos] = entry,
            None => {
                self.positions.insert(entry.name.clone(), self.entries.len());
                self.entries.push(entry);
            }
        }
        self.stats.total_files = self.entries.len() as u64;
        self.stats.log_records += 1;
    }
}

impl FileRegistry {
    /// Creates an empty registry over `store` without reading it.
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self {
            store,
            index: RwLock::new(FileIndex::default()),
        }
    }

    /// Creates a registry over `store` and loads its records.
    pub async fn open(store: Arc<dyn LogStore>) -> Result<Self> {
        let registry = Self::new(store);
        registry.load().await?;
        Ok(registry)
    }

    /// Opens the file log at `path`. A missing file is an empty registry.
    pub async fn at_path(path: impl AsRef<Path>) -> Result<Self> {
        Self::open(Arc::new(FileLog::new(path))).await
    }

    /// Creates an empty registry that is never persisted.
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryLog::new()))
    }

    /// Rebuilds the index from every record in the log.
    ///
    /// Returns the number of distinct file names. Fails only if the log
    /// exists but cannot be read; malformed records are skipped.
    #[instrument(skip(self))]
    pub async fn load(&self) -> Result<usize> {
        let lines = self.store.read_all().await?;

        let mut index = FileIndex::default();
        for (lineno, line) in lines.iter().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            match FileEntry::from_log_line(line) {
                Some(entry) => index.upsert(entry),
                None => {
                    warn!(line = lineno + 1, "Skipping malformed file log record");
                    index.stats.malformed_records += 1;
                }
            }
        }

        let count = index.entries.len();
        info!(
            count,
            records = index.stats.log_records,
            malformed = index.stats.malformed_records,
            "Loaded file registry"
        );
        *self.index.write() = index;

        Ok(count)
    }

    /// Registers a file: appends it to the log, then updates the index.
    #[instrument(skip(self, id))]
    pub async fn add(&self, id: &str, name: &str) -> Result<FileEntry> {
        let entry = FileEntry::new(id, name);
        entry.validate()?;

        self.store.append(&entry.to_log_line()).await?;
        self.index.write().upsert(entry.clone());

        debug!(id = %entry.id, "Registered file");
        Ok(entry)
    }

    /// Exact lookup by file name.
    pub fn get(&self, name: &str) -> Option<FileEntry> {
        let index = self.index.read();
        index
            .positions
            .get(name)
            .map(|&pos| index.entries[pos].clone())
    }

    /// Snapshot of every entry in registry order.
    pub fn all(&self) -> Vec<FileEntry> {
        self.index.read().entries.clone()
    }

    /// Returns the number of distinct file names.
    pub fn len(&self) -> usize {
        self.index.read().entries.len()
    }

    /// Returns true if no file is registered.
    pub fn is_empty(&self) -> bool {
        self.index.read().entries.is_empty()
    }

    /// Returns registry statistics.
    pub fn stats(&self) -> RegistryStats {
        self.index.read().stats.clone()
    }
}

impl std::fmt::Debug for FileRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRegistry")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use filedrop_core::error::FiledropError;
    use tempfile::tempdir;

    /// Log that replays fixed records but refuses every append.
    struct ReadOnlyLog {
        lines: Vec<String>,
    }

    #[async_trait]
    impl LogStore for ReadOnlyLog {
        async fn append(&self, _line: &str) -> Result<()> {
            Err(FiledropError::StoreError("disk full".into()))
        }

        async fn read_all(&self) -> Result<Vec<String>> {
            Ok(self.lines.clone())
        }
    }

    #[tokio::test]
    async fn test_new_empty_registry() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files.txt");

        let registry = FileRegistry::at_path(&path).await.unwrap();
        assert!(registry.is_empty());
        assert!(!path.exists()); // File not created until the first add
    }

    #[tokio::test]
    async fn test_add_then_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("files.txt");

        {
            let registry = FileRegistry::at_path(&path).await.unwrap();
            registry.add("id1", "Report.pdf").await.unwrap();
            registry.add("id2", "holiday photo.jpg").await.unwrap();
        }

        let registry = FileRegistry::at_path(&path).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("Report.pdf").unwrap().id, "id1");
        assert_eq!(registry.get("holiday photo.jpg").unwrap().id, "id2");
    }

    #[tokio::test]
    async fn test_last_write_wins_in_memory_and_on_reload() {
        let log = Arc::new(MemoryLog::new());
        let registry = FileRegistry::open(log.clone()).await.unwrap();

        registry.add("id1", "x").await.unwrap();
        registry.add("id2", "x").await.unwrap();
        assert_eq!(registry.get("x").unwrap().id, "id2");
        assert_eq!(registry.len(), 1);

        // The log keeps both records
        assert_eq!(log.lines().len(), 2);

        let reloaded = FileRegistry::open(log).await.unwrap();
        assert_eq!(reloaded.get("x").unwrap().id, "id2");
        assert_eq!(reloaded.len(), 1);
    }

    #[tokio::test]
    async fn test_overwrite_keeps_position() {
        let registry = FileRegistry::in_memory();
        registry.add("a1", "a.txt").await.unwrap();
        registry.add("b1", "b.txt").await.unwrap();
        registry.add("a2", "a.txt").await.unwrap();

        let names: Vec<_> = registry.all().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["a.txt", "b.txt"]);
        assert_eq!(registry.all()[0].id, "a2");
    }

    #[tokio::test]
    async fn test_load_skips_malformed_records() {
        let log = Arc::new(MemoryLog::with_lines([
            "id1 good.pdf",
            "",
            "garbage",
            "id2 also good.pdf   ",
        ]));

        let registry = FileRegistry::open(log).await.unwrap();
        assert_eq!(registry.len(), 2);
        assert_eq!(registry.get("also good.pdf").unwrap().id, "id2");

        let stats = registry.stats();
        assert_eq!(stats.total_files, 2);
        assert_eq!(stats.log_records, 2);
        assert_eq!(stats.malformed_records, 1);
    }

    #[tokio::test]
    async fn test_unreadable_log_is_fatal() {
        let dir = tempdir().unwrap();
        let result = FileRegistry::at_path(dir.path()).await;
        assert!(matches!(result, Err(FiledropError::IoError(_))));
    }

    #[tokio::test]
    async fn test_invalid_entry_not_persisted() {
        let log = Arc::new(MemoryLog::new());
        let registry = FileRegistry::open(log.clone()).await.unwrap();

        assert!(registry.add("id1", "two\nlines").await.is_err());
        assert!(registry.add("", "name.pdf").await.is_err());
        assert!(log.lines().is_empty());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_load_replaces_index() {
        let log = Arc::new(MemoryLog::with_lines(["id1 a.txt"]));
        let registry = FileRegistry::new(log.clone());
        assert!(registry.is_empty());

        assert_eq!(registry.load().await.unwrap(), 1);
        log.append("id2 b.txt").await.unwrap();
        assert_eq!(registry.load().await.unwrap(), 2);
        assert_eq!(registry.stats().log_records, 2);
    }

    #[tokio::test]
    async fn test_failed_append_leaves_index_untouched() {
        let log = Arc::new(ReadOnlyLog {
            lines: vec!["id1 a.txt".to_string()],
        });
        let registry = FileRegistry::open(log).await.unwrap();

        let err = registry.add("id2", "b.txt").await.unwrap_err();
        assert!(matches!(err, FiledropError::StoreError(_)));
        assert!(registry.get("b.txt").is_none());

        // Overwrite of an existing name must not apply either
        assert!(registry.add("id9", "a.txt").await.is_err());
        assert_eq!(registry.get("a.txt").unwrap().id, "id1");

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.stats().log_records, 1);
    }
}
