//! Whole-word, case-insensitive keyword matching.

use regex::{RegexSet, RegexSetBuilder};
use watch_core::{CoreError, KeywordSet};

/// A [`KeywordSet`] compiled once into a single regex set.
#[derive(Debug, Clone)]
pub struct KeywordMatcher {
    patterns: RegexSet,
}

impl KeywordMatcher {
    pub fn new(keywords: &KeywordSet) -> Result<Self, CoreError> {
        let patterns = RegexSetBuilder::new(keywords.iter().map(word_pattern))
            .case_insensitive(true)
            .build()
            .map_err(|e| CoreError::InvalidKeywords {
                reason: e.to_string(),
            })?;
        Ok(Self { patterns })
    }

    /// True when any keyword appears in `text` as a whole word.
    pub fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.patterns.is_match(text)
    }
}

/// Both ends get `\b`, so a keyword ending in a symbol such as `c++` only
/// matches when a word character follows it.
fn word_pattern(keyword: &str) -> String {
    format!(r"\b{}\b", regex::escape(keyword))
}

/// One-shot form of [`KeywordMatcher::matches`]. Never fails; a keyword set
/// that cannot be compiled matches nothing.
pub fn matches(text: &str, keywords: &KeywordSet) -> bool {
    KeywordMatcher::new(keywords)
        .map(|matcher| matcher.matches(text))
        .unwrap_or(false)
}
