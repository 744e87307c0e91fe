//! Stateless pagination for inline queries.
//!
//! The client echoes back an offset token counting pages already consumed.
//! Nothing is kept between calls: every page re-scans the registry from the
//! start with a cap of `(offset + 1) * page_size` and returns the tail of
//! that capped scan beyond the first `offset * page_size` matches. Because
//! the scan order is the registry order, consecutive pages are disjoint and
//! concatenate to the plain capped scan.

use serde::{Deserialize, Serialize};
use sha3::digest::{ExtendableOutput, Update, XofReader};
use sha3::Shake256;
use tracing::debug;

use filedrop_core::constants::{
    DOMAIN_RESULT_ID, GET_COMMAND, INLINE_ARTICLE_TYPE, INLINE_PAGE_SIZE, RESULT_ID_BYTES,
};
use filedrop_core::error::{FiledropError, Result};
use filedrop_core::types::{FileEntry, MatchMode};
use filedrop_pattern::Matcher;

use crate::engine::SearchEngine;

/// One window of search results.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Page {
    /// Entries on this page, in scan order
    pub items: Vec<FileEntry>,
    /// Offset this page was computed for
    pub offset: u64,
    /// Offset to request next; always `offset + 1`
    pub next_offset: u64,
}

impl Page {
    /// Returns true if the window held no matches.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Parses an offset token. Absent or empty means the first page.
pub fn parse_offset(token: Option<&str>) -> Result<u64> {
    match token {
        None => Ok(0),
        Some(token) if token.is_empty() => Ok(0),
        Some(token) => token
            .parse::<u64>()
            .map_err(|_| FiledropError::QueryError(format!("invalid offset token {:?}", token))),
    }
}

/// Translates offset tokens into windows over search results.
#[derive(Clone, Copy, Debug)]
pub struct PaginationCursor {
    page_size: usize,
    engine: SearchEngine,
}

impl Default for PaginationCursor {
    fn default() -> Self {
        Self::new(INLINE_PAGE_SIZE)
    }
}

impl PaginationCursor {
    /// Creates a cursor with `page_size` results per page (at least one).
    pub fn new(page_size: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            engine: SearchEngine::new(),
        }
    }

    /// Returns the number of results per page.
    pub fn page_size(&self) -> usize {
        self.page_size
    }

    /// Computes the page for a raw offset token.
    pub fn page<'a, I>(&self, entries: I, matcher: &Matcher, token: Option<&str>) -> Result<Page>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let offset = parse_offset(token)?;
        self.window(entries, matcher, offset)
    }

    /// Computes the page at `offset`.
    pub fn window<'a, I>(&self, entries: I, matcher: &Matcher, offset: u64) -> Result<Page>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let out_of_range = || FiledropError::QueryError(format!("offset {} out of range", offset));

        let skip = usize::try_from(offset)
            .ok()
            .and_then(|o| o.checked_mul(self.page_size))
            .ok_or_else(out_of_range)?;
        let ceiling = skip.checked_add(self.page_size).ok_or_else(out_of_range)?;
        let next_offset = offset.checked_add(1).ok_or_else(out_of_range)?;

        let mut results = self.engine.search(entries, matcher, ceiling, MatchMode::Substring);
        let items = if results.len() > skip {
            results.split_off(skip)
        } else {
            Vec::new()
        };

        debug!(offset, page_size = self.page_size, items = items.len(), "Computed page");

        Ok(Page {
            items,
            offset,
            next_offset,
        })
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// INLINE RESULTS
// ═══════════════════════════════════════════════════════════════════════════════

/// An inline-query result in the shape the chat platform expects.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineArticle {
    /// Deterministic ID derived from the file name
    pub id: String,
    /// Always `"article"`
    #[serde(rename = "type")]
    pub kind: String,
    /// File name
    pub title: String,
    /// Command the chat sends when the result is picked
    pub message_text: String,
}

impl InlineArticle {
    /// Flattens a file entry into an article.
    pub fn from_entry(entry: &FileEntry) -> Self {
        Self {
            id: result_id(&entry.name),
            kind: INLINE_ARTICLE_TYPE.to_owned(),
            title: entry.name.clone(),
            message_text: get_command(&entry.name),
        }
    }
}

/// Answer to one inline query.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineAnswer {
    /// Query being answered
    pub query_id: String,
    /// Articles on this page
    pub results: Vec<InlineArticle>,
    /// Token for the next page; empty once results run out
    pub next_offset: String,
}

impl InlineAnswer {
    /// Builds the answer for a computed page.
    pub fn from_page(query_id: impl Into<String>, page: &Page) -> Self {
        if page.is_empty() {
            return Self::empty(query_id);
        }
        Self {
            query_id: query_id.into(),
            results: page.items.iter().map(InlineArticle::from_entry).collect(),
            next_offset: page.next_offset.to_string(),
        }
    }

    /// An answer with no results.
    pub fn empty(query_id: impl Into<String>) -> Self {
        Self {
            query_id: query_id.into(),
            results: Vec::new(),
            next_offset: String::new(),
        }
    }
}

/// Derives the inline result ID for a file name.
///
/// SHAKE256 over the domain-separated name, truncated to
/// [`RESULT_ID_BYTES`] and hex-encoded. Distinct names can collide; that is
/// accepted at this length.
pub fn result_id(name: &str) -> String {
    let mut hasher = Shake256::default();
    hasher.update(&(DOMAIN_RESULT_ID.len() as u32).to_le_bytes());
    hasher.update(DOMAIN_RESULT_ID);
    hasher.update(name.as_bytes());

    let mut reader = hasher.finalize_xof();
    let mut output = [0u8; RESULT_ID_BYTES];
    reader.read(&mut output);

    hex::encode(output)
}

/// Builds the `/get` command that fetches exactly `name`.
///
/// The name is regex-escaped and anchored, so the command matches this
/// file only. [`exact_name`] recovers the name from the pattern.
pub fn get_command(name: &str) -> String {
    format!("{} ^{}$", GET_COMMAND, regex::escape(name))
}

/// Characters `regex::escape` may prefix with a backslash.
const ESCAPABLE: &[char] = &[
    '\\', '.', '+', '*', '?', '(', ')', '|', '[', ']', '{', '}', '^', '$', '#', '&', '-', '~',
];

/// Recovers the literal name from an anchored, escaped pattern.
///
/// Returns `None` unless `pattern` is `^literal$` where every regex
/// metacharacter in `literal` is escaped. `#`, `&`, `-` and `~` are literal
/// outside classes, so they are accepted bare too.
pub fn exact_name(pattern: &str) -> Option<String> {
    let body = pattern.strip_prefix('^')?.strip_suffix('$')?;

    let mut name = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                let escaped = chars.next()?;
                if !ESCAPABLE.contains(&escaped) {
                    return None;
                }
                name.push(escaped);
            }
            '#' | '&' | '-' | '~' => name.push(c),
            c if ESCAPABLE.contains(&c) => return None,
            c => name.push(c),
        }
    }
    Some(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedrop_core::types::PatternMode;

    fn numbered(count: usize) -> Vec<FileEntry> {
        (0..count)
            .map(|i| FileEntry::new(format!("id{}", i), format!("file{:03}.pdf", i)))
            .collect()
    }

    fn matcher(text: &str) -> Matcher {
        filedrop_pattern::compile(text, PatternMode::Search).unwrap()
    }

    #[test]
    fn test_parse_offset() {
        assert_eq!(parse_offset(None).unwrap(), 0);
        assert_eq!(parse_offset(Some("")).unwrap(), 0);
        assert_eq!(parse_offset(Some("3")).unwrap(), 3);

        for bad in ["-1", "abc", "1.5", " 2"] {
            assert!(matches!(parse_offset(Some(bad)), Err(FiledropError::QueryError(_))));
        }
    }

    #[test]
    fn test_twenty_five_matches_in_two_pages() {
        let files = numbered(25);
        let cursor = PaginationCursor::new(20);
        let pdf = matcher("pdf");

        let first = cursor.window(&files, &pdf, 0).unwrap();
        assert_eq!(first.items.len(), 20);
        assert_eq!(first.next_offset, 1);

        let second = cursor.window(&files, &pdf, 1).unwrap();
        assert_eq!(second.items.len(), 5);
        assert_eq!(second.items[0].name, "file020.pdf");
        assert_eq!(second.next_offset, 2);

        let third = cursor.window(&files, &pdf, 2).unwrap();
        assert!(third.is_empty());
        assert_eq!(third.next_offset, 3);
    }

    #[test]
    fn test_pages_are_disjoint_and_ordered() {
        let files = numbered(50);
        let cursor = PaginationCursor::new(10);
        let pdf = matcher("pdf");

        let first = cursor.page(&files, &pdf, None).unwrap();
        let second = cursor.page(&files, &pdf, Some("1")).unwrap();

        let mut joined = first.items.clone();
        joined.extend(second.items.clone());
        assert_eq!(joined, files[..20].to_vec());
        assert!(first.items.iter().all(|e| !second.items.contains(e)));
    }

    #[test]
    fn test_page_skips_non_matching_entries() {
        let mut files = numbered(6);
        files.insert(1, FileEntry::new("x", "image.png"));
        let cursor = PaginationCursor::new(4);

        let second = cursor.window(&files, &matcher("pdf"), 1).unwrap();
        let names: Vec<_> = second.items.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["file004.pdf", "file005.pdf"]);
    }

    #[test]
    fn test_huge_offset_is_query_error() {
        let files = numbered(1);
        let cursor = PaginationCursor::new(20);
        let result = cursor.window(&files, &matcher("pdf"), u64::MAX);
        assert!(matches!(result, Err(FiledropError::QueryError(_))));
    }

    #[test]
    fn test_zero_page_size_clamped() {
        assert_eq!(PaginationCursor::new(0).page_size(), 1);
        assert_eq!(PaginationCursor::default().page_size(), INLINE_PAGE_SIZE);
    }

    #[test]
    fn test_result_id_is_deterministic() {
        let a = result_id("report.pdf");
        assert_eq!(a, result_id("report.pdf"));
        assert_ne!(a, result_id("report.pdf.bak"));
        assert_eq!(a.len(), RESULT_ID_BYTES * 2);
    }

    #[test]
    fn test_get_command_escapes_and_anchors() {
        let command = get_command("v1.2 [final]+.pdf");
        assert_eq!(command, r"/get ^v1\.2 \[final\]\+\.pdf$");

        let pattern = command.trim_start_matches("/get ");
        let m = filedrop_pattern::compile(pattern, PatternMode::Subscription).unwrap();
        assert!(m.search("v1.2 [final]+.pdf"));
        assert!(!m.search("v1.2 [final]+.pdf.bak"));
        assert!(!m.search("v1x2 [final]+.pdf"));
    }

    #[test]
    fn test_exact_name_inverts_get_command() {
        for name in [
            "short.pdf",
            "Quarterly Report 2024 v2.pdf",
            "notes (draft) {v2} a|b ^x$ 50%?.txt",
            r"back\slash-and~tilde#1&2.zip",
        ] {
            let command = get_command(name);
            let pattern = command.strip_prefix("/get ").unwrap();
            assert_eq!(exact_name(pattern).as_deref(), Some(name));
        }
    }

    #[test]
    fn test_exact_name_rejects_real_regexes() {
        for pattern in ["report", "^report", "report$", "^rep.rt$", r"^a\d$", r"^a\$", "^[ab]$"] {
            assert_eq!(exact_name(pattern), None, "{}", pattern);
        }
        assert_eq!(exact_name("^a-b$").as_deref(), Some("a-b"));
    }

    #[test]
    fn test_inline_article_shape() {
        let article = InlineArticle::from_entry(&FileEntry::new("id1", "notes.txt"));
        let json = serde_json::to_value(&article).unwrap();

        assert_eq!(json["type"], "article");
        assert_eq!(json["title"], "notes.txt");
        assert_eq!(json["message_text"], "/get ^notes\\.txt$");
        assert_eq!(json["id"], result_id("notes.txt"));
    }

    #[test]
    fn test_inline_answer_from_page() {
        let page = Page {
            items: vec![FileEntry::new("id1", "a.txt")],
            offset: 0,
            next_offset: 1,
        };
        let answer = InlineAnswer::from_page("q1", &page);
        assert_eq!(answer.results.len(), 1);
        assert_eq!(answer.next_offset, "1");

        let empty = Page {
            items: Vec::new(),
            offset: 4,
            next_offset: 5,
        };
        let answer = InlineAnswer::from_page("q1", &empty);
        assert!(answer.results.is_empty());
        assert!(answer.next_offset.is_empty());
    }
}
