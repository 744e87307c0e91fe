//! Domain types for FileDrop.
//!
//! - [`FileEntry`]: A registered file (name + opaque identifier)
//! - [`Subscription`]: A chat's announcement filter
//! - [`SearchQuery`]: Pattern text, match mode and result cap

mod file;
mod query;
mod subscription;

pub use file::*;
pub use query::*;
pub use subscription::*;
