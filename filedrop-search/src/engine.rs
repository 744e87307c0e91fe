//! Regex scans over registry snapshots.
//!
//! Scans walk entries in registry order and stop as soon as the cap is
//! reached, so later entries are never examined and earlier-registered
//! files win. There is no relevance ranking.

use tracing::debug;

use filedrop_core::error::Result;
use filedrop_core::types::{FileEntry, MatchMode, SearchQuery};
use filedrop_pattern::{Matcher, PatternValidator};

/// Bounded regex search over file entries.
#[derive(Clone, Copy, Debug)]
pub struct SearchEngine {
    validator: PatternValidator,
}

impl Default for SearchEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchEngine {
    /// Creates an engine using search-mode validation (30-character limit).
    pub fn new() -> Self {
        Self {
            validator: PatternValidator::search(),
        }
    }

    /// Returns the validator applied to raw query text.
    pub fn validator(&self) -> &PatternValidator {
        &self.validator
    }

    /// Collects up to `limit` entries whose name matches, in scan order.
    pub fn search<'a, I>(&self, entries: I, matcher: &Matcher, limit: usize, mode: MatchMode) -> Vec<FileEntry>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let mut results = Vec::new();
        if limit == 0 {
            return results;
        }

        for entry in entries {
            if matcher.is_match(&entry.name, mode) {
                results.push(entry.clone());
                if results.len() >= limit {
                    break;
                }
            }
        }

        debug!(pattern = matcher.as_str(), limit, found = results.len(), "Search complete");
        results
    }

    /// First substring match for `text`, or `None`.
    ///
    /// An invalid pattern is reported as "not found" rather than an error.
    pub fn find_one<'a, I>(&self, entries: I, text: &str) -> Option<FileEntry>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        match self.find_many(entries, text, 1, MatchMode::Substring) {
            Ok(mut results) => results.pop(),
            Err(e) => {
                debug!(error = %e, "Lookup pattern rejected");
                None
            }
        }
    }

    /// Validates `text`, then searches. Validation errors are returned.
    pub fn find_many<'a, I>(&self, entries: I, text: &str, limit: usize, mode: MatchMode) -> Result<Vec<FileEntry>>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let matcher = self.validator.compile(text)?;
        Ok(self.search(entries, &matcher, limit, mode))
    }

    /// Runs a [`SearchQuery`].
    pub fn execute<'a, I>(&self, entries: I, query: &SearchQuery) -> Result<Vec<FileEntry>>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        self.find_many(entries, &query.pattern, query.limit, query.mode)
    }

    /// Command search: substring matches, capped, then sorted by name.
    ///
    /// The cap applies before sorting, so the result is the first `limit`
    /// matches in registry order, presented alphabetically. Case is ignored
    /// except to break ties.
    pub fn find_sorted<'a, I>(&self, entries: I, text: &str, limit: usize) -> Result<Vec<FileEntry>>
    where
        I: IntoIterator<Item = &'a FileEntry>,
    {
        let mut results = self.find_many(entries, text, limit, MatchMode::Substring)?;
        results.sort_by_cached_key(|e| (e.name.to_lowercase(), e.name.clone()));
        Ok(results)
    }
}

/// Formats search results as a chat reply, one name per line.
pub fn render_listing(names: &[String]) -> String {
    names.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use filedrop_core::error::FiledropError;
    use filedrop_core::types::PatternMode;

    fn entries(names: &[&str]) -> Vec<FileEntry> {
        names
            .iter()
            .enumerate()
            .map(|(i, name)| FileEntry::new(format!("id{}", i), *name))
            .collect()
    }

    fn matcher(text: &str) -> Matcher {
        filedrop_pattern::compile(text, PatternMode::Search).unwrap()
    }

    #[test]
    fn test_report_scenario() {
        let files = entries(&["Report.pdf", "report_final.pdf", "image.png"]);
        let engine = SearchEngine::new();

        let results = engine.find_many(&files, "report", 10, MatchMode::Substring).unwrap();
        let names: Vec<_> = results.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Report.pdf", "report_final.pdf"]);
    }

    #[test]
    fn test_limit_short_circuits_in_scan_order() {
        let files = entries(&["a1", "b", "a2", "a3", "a4"]);
        let engine = SearchEngine::new();

        let results = engine.search(&files, &matcher("a"), 2, MatchMode::Substring);
        let names: Vec<_> = results.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a1", "a2"]);
    }

    #[test]
    fn test_limit_never_exceeded() {
        let files = entries(&["x1", "x2", "x3", "x4", "x5"]);
        let engine = SearchEngine::new();

        for limit in 0..7 {
            let results = engine.search(&files, &matcher("x"), limit, MatchMode::Substring);
            assert!(results.len() <= limit);
            assert!(results.iter().all(|e| files.contains(e)));
        }
    }

    #[test]
    fn test_full_match_mode() {
        let files = entries(&["report.pdf", "report.pdf.bak"]);
        let engine = SearchEngine::new();

        let results = engine.find_many(&files, r"report\.pdf", 10, MatchMode::Full).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "report.pdf");
    }

    #[test]
    fn test_find_one() {
        let files = entries(&["image.png", "report.pdf", "report2.pdf"]);
        let engine = SearchEngine::new();

        let found = engine.find_one(&files, "report").unwrap();
        assert_eq!(found.name, "report.pdf");
        assert_eq!(found.id, "id1");

        assert!(engine.find_one(&files, "nothing").is_none());
    }

    #[test]
    fn test_find_one_swallows_regex_errors() {
        let files = entries(&["(weird).pdf"]);
        let engine = SearchEngine::new();
        assert!(engine.find_one(&files, "(weird)").is_none());
        assert!(engine.find_one(&files, "[").is_none());
    }

    #[test]
    fn test_find_many_propagates_regex_errors() {
        let files = entries(&["a"]);
        let engine = SearchEngine::new();

        let err = engine.find_many(&files, "(a)", 10, MatchMode::Substring).unwrap_err();
        assert!(matches!(err, FiledropError::RegexError(_)));

        let long = "a".repeat(31);
        assert!(engine.find_many(&files, &long, 10, MatchMode::Substring).is_err());
    }

    #[test]
    fn test_find_sorted_caps_then_sorts() {
        let files = entries(&["zeta.txt", "beta.txt", "alpha.txt", "gamma.txt"]);
        let engine = SearchEngine::new();

        let results = engine.find_sorted(&files, "txt", 3).unwrap();
        let names: Vec<_> = results.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.txt", "beta.txt", "zeta.txt"]);
    }

    #[test]
    fn test_find_sorted_ignores_case() {
        let files = entries(&["Zeta.pdf", "alpha.pdf", "Beta.pdf", "beta.pdf"]);
        let engine = SearchEngine::new();

        let results = engine.find_sorted(&files, "pdf", 10).unwrap();
        let names: Vec<_> = results.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["alpha.pdf", "Beta.pdf", "beta.pdf", "Zeta.pdf"]);
    }

    #[test]
    fn test_execute_query() {
        let files = entries(&["a.txt", "b.txt"]);
        let engine = SearchEngine::new();

        let results = engine.execute(&files, &SearchQuery::new("txt", 1)).unwrap();
        assert_eq!(results.len(), 1);

        let results = engine.execute(&files, &SearchQuery::new("txt", 10).full_match()).unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn test_render_listing() {
        let names = vec!["a.txt".to_string(), "b.txt".to_string()];
        assert_eq!(render_listing(&names), "a.txt\nb.txt");
        assert_eq!(render_listing(&[]), "");
    }
}
