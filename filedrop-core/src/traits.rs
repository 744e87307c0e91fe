//! Storage traits for FileDrop.
//!
//! Registries own their in-memory state and delegate persistence to these
//! interfaces, so the same registry runs against a file on disk in
//! production and a plain buffer in tests.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::SubscriberId;

// ═══════════════════════════════════════════════════════════════════════════════
// FILE LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only line log backing the file registry.
///
/// Implementations might use:
/// - A flat text file (production)
/// - An in-memory buffer (tests)
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Appends a single record. The line must not contain a line break.
    ///
    /// Returns only after the record is durable.
    async fn append(&self, line: &str) -> Result<()>;

    /// Reads every record in append order.
    ///
    /// A store that was never written to yields an empty list.
    async fn read_all(&self) -> Result<Vec<String>>;
}

// ═══════════════════════════════════════════════════════════════════════════════
// SUBSCRIPTION SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Snapshot store backing the subscription registry.
///
/// Every save replaces the previous snapshot in full.
#[async_trait]
pub trait SubscriptionStore: Send + Sync {
    /// Loads the last saved snapshot.
    async fn load(&self) -> Result<BTreeMap<SubscriberId, String>>;

    /// Replaces the stored snapshot with `subscriptions`.
    async fn save(&self, subscriptions: &BTreeMap<SubscriberId, String>) -> Result<()>;
}
