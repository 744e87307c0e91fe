//! # FileDrop Registry
//!
//! The two stores of record for FileDrop:
//!
//! - [`FileRegistry`]: file name → file identifier, rebuilt from an
//!   append-only log at startup
//! - [`SubscriptionRegistry`]: chat → announcement filter, rewritten as a
//!   full snapshot on every change
//!
//! Persistence is injected through the [`LogStore`] and
//! [`SubscriptionStore`] traits. Two backends are provided for each:
//!
//! - **Memory**: Plain buffers for tests and benchmarks
//! - **File**: Flat files for single-process deployments
//!
//! ## Example
//!
//! ```rust,ignore
//! use filedrop_registry::FileRegistry;
//!
//! let registry = FileRegistry::at_path("files.txt").await?;
//! registry.add("BQADBAADJgAD", "report.pdf").await?;
//! assert_eq!(registry.get("report.pdf").unwrap().id, "BQADBAADJgAD");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod file;
mod files;
mod memory;
mod subscriptions;

pub use file::{FileLog, JsonSubscriptionStore};
pub use files::FileRegistry;
pub use memory::{MemoryLog, MemorySubscriptionStore};
pub use subscriptions::SubscriptionRegistry;

// Re-export the storage traits from core
pub use filedrop_core::traits::{LogStore, SubscriptionStore};
