mod support;

use std::sync::atomic::Ordering;
use std::time::Duration;
use support::{comment, post, FakeSource};
use watch_core::{
    CoreError, ErrorCategory, ErrorExt, KeywordSet, RecordKind, RedditApiError, ScanConfig,
};
use watch_service::{scan, Scanner};

fn config(keywords: &str) -> ScanConfig {
    ScanConfig::new("rust", KeywordSet::parse(keywords))
}

#[tokio::test]
async fn test_title_match_yields_one_post_record() {
    let source = FakeSource::new(vec![post("a", "Learning Rust basics", "")]);

    let outcome = scan(&source, &config("rust")).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.records.len(), 1);
    assert_eq!(outcome.records[0].kind, RecordKind::Post);
    assert_eq!(outcome.records[0].title, "Learning Rust basics");
    assert_eq!(outcome.records[0].body_excerpt, "");
}

#[tokio::test]
async fn test_substring_in_body_does_not_match() {
    let source = FakeSource::new(vec![post("a", "Weekly thread", "concatenation is fun")]);

    let outcome = scan(&source, &config("cat")).await;

    assert!(outcome.error.is_none());
    assert!(outcome.records.is_empty());
    assert_eq!(outcome.posts_scanned, 1);
}

#[tokio::test]
async fn test_matching_comment_references_parent() {
    let source = FakeSource::new(vec![post("a", "Weekly thread", "nothing here")])
        .with_comments("a", vec![comment("c1", "I love rust"), comment("c2", "me too")]);

    let outcome = scan(&source, &config("rust").with_include_comments(true)).await;

    assert!(outcome.error.is_none());
    assert_eq!(outcome.records.len(), 1);
    let record = &outcome.records[0];
    assert_eq!(record.kind, RecordKind::Comment);
    assert_eq!(record.title, "Weekly thread");
    assert_eq!(record.url, "https://www.reddit.com/r/rust/comments/a/post/");
    assert_eq!(record.body_excerpt, "I love rust");
    assert_eq!(outcome.comments_scanned, 2);
}

#[tokio::test]
async fn test_comments_skipped_unless_enabled() {
    let source = FakeSource::new(vec![post("a", "Weekly thread", "")])
        .with_comments("a", vec![comment("c1", "I love rust")]);

    let outcome = scan(&source, &config("rust")).await;

    assert!(outcome.records.is_empty());
    assert_eq!(source.comment_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_body_excerpt_boundaries() {
    let exact = format!("rust {}", "a".repeat(495));
    let over = format!("rust {}", "b".repeat(496));
    assert_eq!(exact.chars().count(), 500);
    assert_eq!(over.chars().count(), 501);

    let source = FakeSource::new(vec![post("a", "first", &exact), post("b", "second", &over)]);
    let outcome = scan(&source, &config("rust")).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[0].body_excerpt, exact);
    assert_eq!(outcome.records[1].body_excerpt.chars().count(), 503);
    assert!(outcome.records[1].body_excerpt.ends_with("..."));
}

#[tokio::test]
async fn test_order_is_preserved_and_post_precedes_its_comments() {
    let source = FakeSource::new(vec![
        post("new", "rust news", ""),
        post("old", "older rust post", ""),
    ])
    .with_comments("new", vec![comment("c1", "rust comment")]);

    let outcome = scan(&source, &config("rust").with_include_comments(true)).await;

    let kinds_and_titles: Vec<(RecordKind, &str)> = outcome
        .records
        .iter()
        .map(|r| (r.kind, r.title.as_str()))
        .collect();
    assert_eq!(
        kinds_and_titles,
        vec![
            (RecordKind::Post, "rust news"),
            (RecordKind::Comment, "rust news"),
            (RecordKind::Post, "older rust post"),
        ]
    );
}

#[tokio::test]
async fn test_item_limit_caps_posts_even_if_source_overdelivers() {
    let posts = (0..10)
        .map(|i| post(&format!("p{}", i), "rust", ""))
        .collect();
    let source = FakeSource::new(posts).ignoring_limit();

    let outcome = scan(&source, &config("rust").with_item_limit(3)).await;

    assert_eq!(outcome.posts_scanned, 3);
    assert_eq!(outcome.records.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_deadline_stops_traversal_without_error() {
    let posts = (0..5)
        .map(|i| post(&format!("p{}", i), "rust", ""))
        .collect();
    let source = FakeSource::new(posts).with_comment_delay(Duration::from_secs(10));
    let config = config("rust")
        .with_include_comments(true)
        .with_scan_timeout(Duration::from_secs(30));

    let started = tokio::time::Instant::now();
    let outcome = scan(&source, &config).await;

    assert!(outcome.error.is_none());
    assert!(outcome.timed_out);
    assert_eq!(outcome.posts_scanned, 3);
    assert_eq!(outcome.records.len(), 3);
    // One item's worth of overrun at most.
    assert!(started.elapsed() <= Duration::from_secs(40));
}

#[tokio::test]
async fn test_listing_failure_returns_error_and_no_records() {
    let source = FakeSource::new(vec![post("a", "rust", "")])
        .failing_first(vec![CoreError::RedditApi(RedditApiError::RequestTimeout)]);

    let outcome = scan(&source, &config("rust")).await;

    assert!(outcome.records.is_empty());
    let error = outcome.error.expect("listing failure should be reported");
    assert_eq!(error.category(), ErrorCategory::Transport);
}

#[tokio::test]
async fn test_comment_failure_keeps_partial_results() {
    let source = FakeSource::new(vec![
        post("a", "rust one", ""),
        post("b", "rust two", ""),
        post("c", "rust three", ""),
    ])
    .failing_comments_for("b", || {
        CoreError::RedditApi(RedditApiError::ServerError { status_code: 502 })
    });

    let outcome = scan(&source, &config("rust").with_include_comments(true)).await;

    assert_eq!(outcome.records.len(), 2);
    assert_eq!(outcome.records[1].title, "rust two");
    assert_eq!(outcome.posts_scanned, 2);
    let error = outcome.error.expect("comment failure should be reported");
    assert_eq!(error.category(), ErrorCategory::Service);
}

#[tokio::test]
async fn test_repeated_scans_report_the_same_items() {
    let source = FakeSource::new(vec![post("a", "rust", "")]);
    let scanner = Scanner::new(config("rust")).unwrap();

    let first = scanner.scan(&source).await;
    let second = scanner.scan(&source).await;

    assert_eq!(first.records, second.records);
    assert_eq!(source.list_calls.load(Ordering::SeqCst), 2);
}
