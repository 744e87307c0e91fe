//! # FileDrop Search
//!
//! Query side of FileDrop, plus the service that ties the registries together.
//!
//! ## Components
//!
//! - [`SearchEngine`]: bounded, order-stable regex scans over registry snapshots
//! - [`PaginationCursor`]: stateless offset windows for inline queries
//! - [`AnnounceBroadcaster`]: which subscribers want a newly registered file
//! - [`FileDrop`]: the boundary the chat transport calls into
//!
//! ## Example
//!
//! ```rust,ignore
//! use filedrop_search::{FileDrop, FileDropConfig};
//!
//! let service = FileDrop::open("files.txt", "announce.json", FileDropConfig::default()).await?;
//!
//! let registration = service.register(sender_id, file_id, "report.pdf").await?;
//! for chat in registration.notify {
//!     transport.send_document(chat, &registration.entry.id).await?;
//! }
//!
//! let names = service.search("report", true)?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod broadcast;
mod cursor;
mod engine;
mod service;

pub use broadcast::{AnnounceBroadcaster, BroadcastOutcome, InvalidPatternPolicy};
pub use cursor::{
    exact_name, get_command, parse_offset, result_id, InlineAnswer, InlineArticle, Page, PaginationCursor,
};
pub use engine::{render_listing, SearchEngine};
pub use service::{FileDrop, FileDropConfig, FileDropStats, Registration};
