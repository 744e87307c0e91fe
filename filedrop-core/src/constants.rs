//! Constants for FileDrop.
//!
//! Pattern limits and result caps are part of the user-visible contract:
//! changing them changes which queries are accepted and how many results
//! a chat sees.

// ═══════════════════════════════════════════════════════════════════════════════
// PATTERN LIMITS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum length (in characters) of a search or lookup pattern.
pub const SEARCH_PATTERN_MAX_LEN: usize = 30;

/// Maximum length (in characters) of a subscription filter.
pub const SUBSCRIPTION_PATTERN_MAX_LEN: usize = 100;

/// Character that is never accepted in a user pattern.
///
/// Rejecting it outright disables every group construct.
pub const FORBIDDEN_PATTERN_CHAR: char = '(';

/// Upper bound on the compiled size of a single regex, in bytes.
pub const REGEX_SIZE_LIMIT: usize = 1 << 20;

/// Upper bound on the DFA cache of a single regex, in bytes.
pub const REGEX_DFA_SIZE_LIMIT: usize = 1 << 20;

/// Maximum nesting depth accepted by the regex parser.
pub const REGEX_NEST_LIMIT: u32 = 16;

// ═══════════════════════════════════════════════════════════════════════════════
// RESULT CAPS
// ═══════════════════════════════════════════════════════════════════════════════

/// Result cap for command searches issued from a private chat.
pub const PRIVATE_RESULT_LIMIT: usize = 30;

/// Result cap for command searches issued from a group chat.
pub const GROUP_RESULT_LIMIT: usize = 10;

/// Number of results per inline-query page.
pub const INLINE_PAGE_SIZE: usize = 20;

// ═══════════════════════════════════════════════════════════════════════════════
// INLINE RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Number of digest bytes kept for an inline result ID (hex-encoded to 32 chars).
pub const RESULT_ID_BYTES: usize = 16;

/// Domain separator for inline result ID derivation.
pub const DOMAIN_RESULT_ID: &[u8] = b"FILEDROP_RESULT_ID_V1";

/// Result type reported for every inline article.
pub const INLINE_ARTICLE_TYPE: &str = "article";

/// Command prefix embedded in inline results so the chat can fetch the file.
pub const GET_COMMAND: &str = "/get";

// ═══════════════════════════════════════════════════════════════════════════════
// SUBSCRIPTIONS
// ═══════════════════════════════════════════════════════════════════════════════

/// Subscription text that clears a chat's filter instead of setting one.
pub const OFF_KEYWORD: &str = "off";

// ═══════════════════════════════════════════════════════════════════════════════
// STORAGE DEFAULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Default path of the append-only file log.
pub const DEFAULT_FILES_PATH: &str = "files.txt";

/// Default path of the subscription snapshot.
pub const DEFAULT_SUBSCRIPTIONS_PATH: &str = "announce.json";
