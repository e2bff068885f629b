use watch_core::{
    FormattedRecord, RecordKind, RedditComment, RedditPost, DELETED_AUTHOR, ELLIPSIS,
    EXCERPT_MAX_CHARS,
};

pub fn format_post(post: &RedditPost) -> FormattedRecord {
    FormattedRecord {
        kind: RecordKind::Post,
        title: post.title.clone(),
        url: post.permalink.clone(),
        author: author_or_placeholder(post.author.as_deref()),
        score: post.score,
        created_utc: post.created_utc,
        body_excerpt: excerpt(&post.body),
    }
}

pub fn format_comment(comment: &RedditComment, parent: &RedditPost) -> FormattedRecord {
    FormattedRecord {
        kind: RecordKind::Comment,
        title: parent.title.clone(),
        url: parent.permalink.clone(),
        author: author_or_placeholder(comment.author.as_deref()),
        score: comment.score,
        created_utc: comment.created_utc,
        body_excerpt: excerpt(&comment.body),
    }
}

/// First [`EXCERPT_MAX_CHARS`] characters plus an ellipsis, or the body itself
/// when it already fits.
pub fn excerpt(body: &str) -> String {
    match body.char_indices().nth(EXCERPT_MAX_CHARS) {
        Some((cut, _)) => format!("{}{}", &body[..cut], ELLIPSIS),
        None => body.to_string(),
    }
}

fn author_or_placeholder(author: Option<&str>) -> String {
    author.unwrap_or(DELETED_AUTHOR).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn post(body: &str, author: Option<&str>) -> RedditPost {
        RedditPost {
            id: "abc".to_string(),
            title: "Learning Rust basics".to_string(),
            permalink: "https://www.reddit.com/r/rust/comments/abc/learning_rust_basics/"
                .to_string(),
            author: author.map(str::to_string),
            score: 12,
            created_utc: 1700000000,
            body: body.to_string(),
        }
    }

    #[test]
    fn test_short_body_is_verbatim() {
        assert_eq!(excerpt(""), "");
        assert_eq!(excerpt("hello"), "hello");
    }

    #[test]
    fn test_boundary_lengths() {
        let exact = "a".repeat(500);
        assert_eq!(excerpt(&exact), exact);

        let over = "b".repeat(501);
        let cut = excerpt(&over);
        assert_eq!(cut.chars().count(), 503);
        assert_eq!(cut, format!("{}...", "b".repeat(500)));
    }

    #[test]
    fn test_truncation_counts_characters_not_bytes() {
        let body = "é".repeat(600);
        let cut = excerpt(&body);
        assert_eq!(cut.chars().count(), 503);
        assert!(cut.starts_with(&"é".repeat(500)));
        assert!(cut.ends_with("..."));

        let exact = "日".repeat(500);
        assert_eq!(excerpt(&exact), exact);
    }

    #[test]
    fn test_format_post() {
        let record = format_post(&post("body text", Some("ferris")));
        assert_eq!(record.kind, RecordKind::Post);
        assert_eq!(record.title, "Learning Rust basics");
        assert_eq!(record.author, "ferris");
        assert_eq!(record.score, 12);
        assert_eq!(record.created_utc, 1700000000);
        assert_eq!(record.body_excerpt, "body text");
    }

    #[test]
    fn test_deleted_author_placeholder() {
        let record = format_post(&post("", None));
        assert_eq!(record.author, "[deleted]");
    }

    #[test]
    fn test_format_comment_carries_parent() {
        let parent = post("", Some("op"));
        let comment = RedditComment {
            id: "c1".to_string(),
            permalink: "https://www.reddit.com/r/rust/comments/abc/x/c1/".to_string(),
            author: None,
            score: -4,
            created_utc: 1700000500,
            body: "I love rust".to_string(),
        };

        let record = format_comment(&comment, &parent);
        assert_eq!(record.kind, RecordKind::Comment);
        assert_eq!(record.title, parent.title);
        assert_eq!(record.url, parent.permalink);
        assert_eq!(record.author, "[deleted]");
        assert_eq!(record.score, -4);
        assert_eq!(record.body_excerpt, "I love rust");
    }
}
