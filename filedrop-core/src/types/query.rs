//! Search query parameters.

use serde::{Deserialize, Serialize};

use crate::constants::{SEARCH_PATTERN_MAX_LEN, SUBSCRIPTION_PATTERN_MAX_LEN};

/// How a pattern is tested against a file name.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Pattern may match anywhere in the name
    #[default]
    Substring,
    /// Pattern must match the whole name
    Full,
}

/// Which caller a pattern is compiled for. Selects the length ceiling.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PatternMode {
    /// Lookups, searches and inline queries
    Search,
    /// Stored announcement filters
    Subscription,
}

impl PatternMode {
    /// Maximum accepted pattern length, in characters.
    pub const fn max_len(self) -> usize {
        match self {
            PatternMode::Search => SEARCH_PATTERN_MAX_LEN,
            PatternMode::Subscription => SUBSCRIPTION_PATTERN_MAX_LEN,
        }
    }
}

/// An ephemeral search request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    /// Raw pattern text
    pub pattern: String,
    /// Substring or full-name match
    #[serde(default)]
    pub mode: MatchMode,
    /// Maximum number of results
    pub limit: usize,
}

impl SearchQuery {
    /// Creates a substring query.
    pub fn new(pattern: impl Into<String>, limit: usize) -> Self {
        Self {
            pattern: pattern.into(),
            mode: MatchMode::Substring,
            limit,
        }
    }

    /// Requires the pattern to match the whole name.
    pub fn full_match(mut self) -> Self {
        self.mode = MatchMode::Full;
        self
    }
}
