//! # FileDrop Pattern
//!
//! Turns user-supplied regular expressions into [`Matcher`]s.
//!
//! Every pattern that reaches the registry goes through [`compile`]:
//! searches, lookups, inline queries, subscription filters and the
//! broadcaster's re-check of stored filters. The rules are applied in order:
//!
//! 1. Any `(` is rejected, which rules out every group construct.
//! 2. The pattern may not exceed the ceiling of its [`PatternMode`]
//!    (30 characters for searches, 100 for subscriptions).
//! 3. The text is compiled case-insensitively with bounded program size and
//!    nesting depth. The engine runs in linear time, so no accepted pattern
//!    can backtrack catastrophically.
//!
//! ## Example
//!
//! ```rust
//! use filedrop_core::{MatchMode, PatternMode};
//! use filedrop_pattern::compile;
//!
//! let matcher = compile("report", PatternMode::Search).unwrap();
//! assert!(matcher.is_match("Q3 REPORT.pdf", MatchMode::Substring));
//! assert!(compile("(a+)+", PatternMode::Search).is_err());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod matcher;

pub use matcher::{compile, Matcher, PatternValidator};
