//! Pattern validation and compiled matchers.

use regex::{Regex, RegexBuilder};
use tracing::debug;

use filedrop_core::constants::{
    FORBIDDEN_PATTERN_CHAR, REGEX_DFA_SIZE_LIMIT, REGEX_NEST_LIMIT, REGEX_SIZE_LIMIT,
};
use filedrop_core::error::{FiledropError, Result};
use filedrop_core::types::{MatchMode, PatternMode};

/// A validated, compiled pattern.
///
/// Holds two programs built from the same source: an unanchored one for
/// substring search and an anchored one for whole-name matching. Both are
/// case-insensitive.
#[derive(Clone, Debug)]
pub struct Matcher {
    source: String,
    search: Regex,
    full: Regex,
}

impl Matcher {
    /// Returns the pattern source as supplied by the user.
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Tests `name` using the given match mode.
    pub fn is_match(&self, name: &str, mode: MatchMode) -> bool {
        match mode {
            MatchMode::Substring => self.search(name),
            MatchMode::Full => self.full_match(name),
        }
    }

    /// True if the pattern matches anywhere in `name`.
    pub fn search(&self, name: &str) -> bool {
        self.search.is_match(name)
    }

    /// True if the pattern matches all of `name`.
    pub fn full_match(&self, name: &str) -> bool {
        self.full.is_match(name)
    }
}

/// Compiles patterns for one caller.
#[derive(Clone, Copy, Debug)]
pub struct PatternValidator {
    mode: PatternMode,
}

impl PatternValidator {
    /// Creates a validator enforcing the limits of `mode`.
    pub fn new(mode: PatternMode) -> Self {
        Self { mode }
    }

    /// Validator for searches, lookups and inline queries.
    pub fn search() -> Self {
        Self::new(PatternMode::Search)
    }

    /// Validator for announcement filters.
    pub fn subscription() -> Self {
        Self::new(PatternMode::Subscription)
    }

    /// Returns the mode this validator enforces.
    pub fn mode(&self) -> PatternMode {
        self.mode
    }

    /// Validates and compiles `text`.
    ///
    /// Fails with [`FiledropError::RegexError`] carrying a message suitable
    /// for the requester.
    pub fn compile(&self, text: &str) -> Result<Matcher> {
        if text.contains(FORBIDDEN_PATTERN_CHAR) {
            return Err(FiledropError::RegexError(format!(
                "{} not allowed.",
                FORBIDDEN_PATTERN_CHAR
            )));
        }

        let max_len = self.mode.max_len();
        if text.chars().count() > max_len {
            return Err(FiledropError::RegexError(format!(
                "Regex too long (max {} characters).",
                max_len
            )));
        }

        let search = build(text)?;
        // `text` holds no `(`, so wrapping it cannot rebalance a stray `)`:
        // any such pattern was already rejected by the build above.
        let full = build(&format!(r"\A(?:{})\z", text))?;

        debug!(pattern = text, mode = ?self.mode, "Compiled pattern");

        Ok(Matcher {
            source: text.to_owned(),
            search,
            full,
        })
    }
}

/// Validates and compiles `text` for the given mode.
pub fn compile(text: &str, mode: PatternMode) -> Result<Matcher> {
    PatternValidator::new(mode).compile(text)
}

fn build(source: &str) -> Result<Regex> {
    RegexBuilder::new(source)
        .case_insensitive(true)
        .size_limit(REGEX_SIZE_LIMIT)
        .dfa_size_limit(REGEX_DFA_SIZE_LIMIT)
        .nest_limit(REGEX_NEST_LIMIT)
        .build()
        .map_err(regex_error)
}

fn regex_error(err: regex::Error) -> FiledropError {
    match err {
        regex::Error::Syntax(msg) if !msg.trim().is_empty() => FiledropError::RegexError(msg),
        regex::Error::CompiledTooBig(_) => FiledropError::RegexError("Regex too complex.".into()),
        _ => FiledropError::RegexError("Invalid regex.".into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use test_case::test_case;

    #[test]
    fn test_case_insensitive_substring() {
        let matcher = compile("report", PatternMode::Search).unwrap();
        assert!(matcher.search("Report.pdf"));
        assert!(matcher.search("final_REPORT.pdf"));
        assert!(!matcher.search("image.png"));
    }

    #[test]
    fn test_full_match_requires_whole_name() {
        let matcher = compile(r"report\.pdf", PatternMode::Search).unwrap();
        assert!(matcher.full_match("REPORT.pdf"));
        assert!(!matcher.full_match("old report.pdf"));
        assert!(matcher.search("old report.pdf"));
    }

    #[test]
    fn test_full_match_tries_every_alternative() {
        // Leftmost-first search would stop at "a"; full match must still accept "ab"
        let matcher = compile("a|ab", PatternMode::Search).unwrap();
        assert!(matcher.full_match("ab"));
        assert!(matcher.is_match("ab", MatchMode::Full));
    }

    #[test]
    fn test_source_is_preserved() {
        let matcher = compile("pdf$", PatternMode::Subscription).unwrap();
        assert_eq!(matcher.as_str(), "pdf$");
    }

    #[test_case("(a+)+" ; "capturing group")]
    #[test_case("(?:pdf)" ; "non-capturing group")]
    #[test_case(r"\(" ; "escaped paren")]
    #[test_case("(?i)x" ; "inline flags")]
    fn test_parenthesis_rejected(text: &str) {
        let err = compile(text, PatternMode::Subscription).unwrap_err();
        assert!(matches!(err, FiledropError::RegexError(ref msg) if msg == "( not allowed."));
    }

    #[test]
    fn test_length_depends_on_mode() {
        let text = "a".repeat(31);
        assert!(compile(&text, PatternMode::Search).is_err());
        assert!(compile(&text, PatternMode::Subscription).is_ok());

        let text = "a".repeat(101);
        assert!(compile(&text, PatternMode::Subscription).is_err());
    }

    #[test]
    fn test_length_counts_characters() {
        // 30 two-byte characters are within the search limit
        let text = "é".repeat(30);
        assert!(compile(&text, PatternMode::Search).is_ok());
    }

    #[test_case("[abc" ; "unclosed class")]
    #[test_case("a{2,1}" ; "inverted repetition")]
    #[test_case("pdf)" ; "stray close paren")]
    #[test_case("*pdf" ; "dangling star")]
    fn test_syntax_errors_carry_diagnostic(text: &str) {
        match compile(text, PatternMode::Search) {
            Err(FiledropError::RegexError(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected regex error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let matcher = compile("", PatternMode::Search).unwrap();
        assert!(matcher.search("anything.bin"));
    }

    #[test]
    fn test_validator_mode() {
        assert_eq!(PatternValidator::search().mode(), PatternMode::Search);
        assert_eq!(PatternValidator::subscription().mode(), PatternMode::Subscription);
    }

    proptest! {
        #[test]
        fn prop_any_text_with_paren_fails(prefix in ".{0,10}", suffix in ".{0,10}") {
            let text = format!("{}({}", prefix, suffix);
            for mode in [PatternMode::Search, PatternMode::Subscription] {
                let is_regex_error = matches!(compile(&text, mode), Err(FiledropError::RegexError(_)));
                prop_assert!(is_regex_error);
            }
        }

        #[test]
        fn prop_oversized_text_fails(text in "[a-z]{31,60}") {
            let is_regex_error = matches!(
                compile(&text, PatternMode::Search),
                Err(FiledropError::RegexError(_))
            );
            prop_assert!(is_regex_error);
        }

        #[test]
        fn prop_oversized_subscription_fails(text in "[a-z.]{101,150}") {
            let is_regex_error = matches!(
                compile(&text, PatternMode::Subscription),
                Err(FiledropError::RegexError(_))
            );
            prop_assert!(is_regex_error);
        }
    }
}
