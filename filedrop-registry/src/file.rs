//! File-backed storage.
//!
//! The file log is a flat text file with one `<id> <name>` record per
//! line, appended to and never rewritten. The subscription snapshot is a
//! JSON object keyed by chat id, replaced atomically on every save.
//!
//! Both assume a single writing process.

use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use filedrop_core::error::{FiledropError, Result};
use filedrop_core::traits::{LogStore, SubscriptionStore};
use filedrop_core::types::SubscriberId;

// ═══════════════════════════════════════════════════════════════════════════════
// FILE LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only text log on disk.
#[derive(Clone, Debug)]
pub struct FileLog {
    path: PathBuf,
}

impl FileLog {
    /// Creates a log at `path`. The file is created on first append.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl LogStore for FileLog {
    #[instrument(skip(self, line), fields(path = ?self.path))]
    async fn append(&self, line: &str) -> Result<()> {
        if line.contains(['\n', '\r']) {
            return Err(FiledropError::InvalidEntry(
                "log record must not contain line breaks".into(),
            ));
        }

        let mut record = String::with_capacity(line.len() + 1);
        record.push_str(line);
        record.push('\n');

        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(record.as_bytes()).await?;
        file.sync_data().await?;

        debug!("Appended log record");
        Ok(())
    }

    async fn read_all(&self) -> Result<Vec<String>> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(FiledropError::IoError(std::io::Error::new(
                    e.kind(),
                    format!("Failed to read file log {}: {}", self.path.display(), e),
                )))
            }
        };

        Ok(String::from_utf8_lossy(&contents)
            .lines()
            .map(str::to_owned)
            .collect())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUBSCRIPTION SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Subscription snapshot stored as a JSON object.
///
/// # File Format
///
/// ```text
/// {
///   "12345": "pdf$",
///   "-100200": "report"
/// }
/// ```
#[derive(Clone, Debug)]
pub struct JsonSubscriptionStore {
    path: PathBuf,
}

impl JsonSubscriptionStore {
    /// Creates a store at `path`. The file is created on first save.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SubscriptionStore for JsonSubscriptionStore {
    async fn load(&self) -> Result<BTreeMap<SubscriberId, String>> {
        let contents = match fs::read(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(e) => return Err(e.into()),
        };

        if contents.iter().all(u8::is_ascii_whitespace) {
            return Ok(BTreeMap::new());
        }

        Ok(serde_json::from_slice(&contents)?)
    }

    #[instrument(skip(self, subscriptions), fields(path = ?self.path, count = subscriptions.len()))]
    async fn save(&self, subscriptions: &BTreeMap<SubscriberId, String>) -> Result<()> {
        let serialized = serde_json::to_vec_pretty(subscriptions)?;

        // Write atomically (write to temp, then rename)
        let temp_path = self.path.with_extension("tmp");
        let mut file = fs::File::create(&temp_path).await?;
        file.write_all(&serialized).await?;
        file.sync_all().await?;

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(FiledropError::StoreError(format!(
                "Failed to replace snapshot {}: {}",
                self.path.display(),
                e
            )));
        }

        debug!("Subscription snapshot saved");
        Ok(())
    }
}
