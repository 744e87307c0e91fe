//! DTOs for API requests and responses.

use serde::{Deserialize, Serialize};

use filedrop_core::types::{FileEntry, SubscriberId};
use filedrop_search::FileDropStats;

/// Request to register a file.
#[derive(Debug, Deserialize)]
pub struct RegisterFileRequest {
    /// Chat that sent the file
    pub sender_id: SubscriberId,
    /// Opaque file identifier
    pub file_id: String,
    /// File name
    pub file_name: String,
}

/// Response for file registration.
#[derive(Debug, Serialize)]
pub struct RegisterFileResponse {
    /// Entry as stored
    pub file: FileDto,
    /// Chats to announce the file to
    pub notify: Vec<SubscriberId>,
}

/// A registered file.
#[derive(Debug, Serialize)]
pub struct FileDto {
    /// Opaque file identifier
    pub id: String,
    /// File name
    pub name: String,
}

impl From<FileEntry> for FileDto {
    fn from(entry: FileEntry) -> Self {
        Self {
            id: entry.id,
            name: entry.name,
        }
    }
}

/// Query parameters for lookup.
#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    /// Pattern text
    pub q: String,
}

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    /// Pattern text
    pub q: String,
    /// Whether the request comes from a private chat
    #[serde(default = "default_private")]
    pub private: bool,
}

fn default_private() -> bool {
    true
}

/// Response for search.
#[derive(Debug, Serialize)]
pub struct SearchResponse {
    /// Matching names, sorted
    pub names: Vec<String>,
    /// Number of names returned
    pub count: usize,
}

/// Query parameters for an inline query.
#[derive(Debug, Deserialize)]
pub struct InlineParams {
    /// Inline query id, echoed back
    pub query_id: String,
    /// Pattern text
    #[serde(default)]
    pub q: String,
    /// Offset token from the previous answer
    pub offset: Option<String>,
}

/// Request to set an announcement filter.
#[derive(Debug, Deserialize)]
pub struct SetSubscriptionRequest {
    /// Pattern text, or `"off"`
    pub pattern: String,
}

/// Reply to a subscription command.
#[derive(Debug, Serialize)]
pub struct SubscriptionReplyResponse {
    /// Text to show the chat
    pub reply: String,
}

/// A chat's current filter.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    /// Chat id
    pub chat_id: SubscriberId,
    /// Stored pattern
    pub pattern: String,
}

/// Response for clearing a filter.
#[derive(Debug, Serialize)]
pub struct ClearSubscriptionResponse {
    /// Whether a filter was removed
    pub removed: bool,
}

/// Statistics response.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Distinct file names
    pub total_files: u64,
    /// Log records read or appended
    pub log_records: u64,
    /// Log records skipped on load
    pub malformed_records: u64,
    /// Subscribed chats
    pub subscribers: usize,
}

impl From<FileDropStats> for StatsResponse {
    fn from(stats: FileDropStats) -> Self {
        Self {
            total_files: stats.files.total_files,
            log_records: stats.files.log_records,
            malformed_records: stats.files.malformed_records,
            subscribers: stats.subscribers,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Status
    pub status: String,
    /// Version
    pub version: String,
    /// Uptime in seconds
    pub uptime_seconds: u64,
    /// Distinct file names in the registry
    pub files_count: u64,
}
