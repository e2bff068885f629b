use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder shown when an item's author account no longer exists.
pub const DELETED_AUTHOR: &str = "[deleted]";

/// Bodies longer than this many characters are cut down in reports.
pub const EXCERPT_MAX_CHARS: usize = 500;

pub const ELLIPSIS: &str = "...";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditPost {
    pub id: String,
    pub title: String,
    pub permalink: String,
    pub author: Option<String>,
    pub score: i64,
    pub created_utc: i64,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedditComment {
    pub id: String,
    pub permalink: String,
    pub author: Option<String>,
    pub score: i64,
    pub created_utc: i64,
    pub body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordKind {
    Post,
    Comment,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Post => f.write_str("post"),
            RecordKind::Comment => f.write_str("comment"),
        }
    }
}

/// A matched post or comment, shaped for reporting.
///
/// For comments `title` and `url` describe the parent post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormattedRecord {
    pub kind: RecordKind,
    pub title: String,
    pub url: String,
    pub author: String,
    pub score: i64,
    pub created_utc: i64,
    pub body_excerpt: String,
}

/// Keywords to look for. Entries are trimmed and never empty.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct KeywordSet {
    keywords: Vec<String>,
}

impl KeywordSet {
    pub fn new<I, S>(keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        Self { keywords }
    }

    /// Parses a comma-separated list such as `"rust, tokio,async"`.
    pub fn parse(input: &str) -> Self {
        Self::new(input.split(','))
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keywords.iter().map(String::as_str)
    }
}

impl From<Vec<String>> for KeywordSet {
    fn from(keywords: Vec<String>) -> Self {
        Self::new(keywords)
    }
}

impl From<KeywordSet> for Vec<String> {
    fn from(set: KeywordSet) -> Self {
        set.keywords
    }
}

impl fmt::Display for KeywordSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.keywords.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_parsing_trims_and_drops_empty_entries() {
        let set = KeywordSet::parse(" rust , tokio,, ,async ");
        assert_eq!(set.iter().collect::<Vec<_>>(), vec!["rust", "tokio", "async"]);
        assert_eq!(set.len(), 3);
    }

    #[test]
    fn test_empty_keyword_input() {
        assert!(KeywordSet::parse("").is_empty());
        assert!(KeywordSet::parse(" , ,").is_empty());
    }

    #[test]
    fn test_keyword_set_display() {
        let set = KeywordSet::new(["rust", "cargo"]);
        assert_eq!(set.to_string(), "rust, cargo");
    }

    #[test]
    fn test_record_kind_serializes_lowercase() {
        let json = serde_json::to_string(&RecordKind::Comment).unwrap();
        assert_eq!(json, "\"comment\"");
    }
}
