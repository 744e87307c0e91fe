//! # FileDrop Core
//!
//! Core types, errors, and traits for the FileDrop file registry.
//!
//! This crate provides the foundational building blocks used by all other FileDrop crates:
//!
//! - **Types**: File entries, subscriptions, search queries and match modes
//! - **Errors**: A single error enum with user-facing classification
//! - **Constants**: Pattern limits, result caps, page sizes
//! - **Traits**: Storage interfaces so registries can run on disk or in memory
//!
//! ## Example
//!
//! ```rust
//! use filedrop_core::FileEntry;
//!
//! let entry = FileEntry::new("BQADBAADJgAD", "report.pdf");
//! assert_eq!(entry.to_log_line(), "BQADBAADJgAD report.pdf");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{FiledropError, Result};
pub use traits::*;
pub use types::*;
