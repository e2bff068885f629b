//! One pass over the configured window of recent content.

use crate::formatter::{format_comment, format_post};
use crate::matcher::KeywordMatcher;
use tokio::time::Instant;
use tracing::{debug, error, info, warn};
use watch_core::{
    ContentSource, CoreError, ErrorCategory, ErrorExt, FormattedRecord, RedditPost, ScanConfig,
};

/// What a scan cycle produced.
///
/// `error` is set when the content source failed part-way; `records` then
/// holds the matches found before the failure. Running out of time is not an
/// error and only sets `timed_out`.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub records: Vec<FormattedRecord>,
    pub error: Option<CoreError>,
    pub timed_out: bool,
    pub posts_scanned: usize,
    pub comments_scanned: usize,
}

/// Scan configuration with its keywords already compiled.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    matcher: KeywordMatcher,
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Result<Self, CoreError> {
        let matcher = KeywordMatcher::new(&config.keywords)?;
        Ok(Self { config, matcher })
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    pub async fn scan<S>(&self, source: &S) -> ScanOutcome
    where
        S: ContentSource + ?Sized,
    {
        let config = &self.config;
        let deadline = Instant::now() + config.scan_timeout;
        let mut outcome = ScanOutcome::default();

        let posts = match source
            .list_recent_posts(&config.subreddit, config.item_limit)
            .await
        {
            Ok(posts) => posts,
            Err(e) => {
                log_source_failure(&e, "listing posts", &config.subreddit);
                outcome.error = Some(e);
                return outcome;
            }
        };
        debug!("Fetched {} posts from r/{}", posts.len(), config.subreddit);

        for post in posts.iter().take(config.item_limit as usize) {
            if Instant::now() >= deadline {
                warn!(
                    "Scan of r/{} hit its {:?} time limit after {} posts",
                    config.subreddit, config.scan_timeout, outcome.posts_scanned
                );
                outcome.timed_out = true;
                break;
            }

            outcome.posts_scanned += 1;
            if self.matcher.matches(&post.title) || self.matcher.matches(&post.body) {
                debug!("Post {} matched", post.id);
                outcome.records.push(format_post(post));
            }

            if config.include_comments {
                if let Err(e) = self.scan_comments(source, post, &mut outcome).await {
                    log_source_failure(&e, "loading comments", &config.subreddit);
                    outcome.error = Some(e);
                    break;
                }
            }
        }

        info!(
            "Scan of r/{} finished: {} posts, {} comments, {} matches",
            config.subreddit,
            outcome.posts_scanned,
            outcome.comments_scanned,
            outcome.records.len()
        );
        outcome
    }

    async fn scan_comments<S>(
        &self,
        source: &S,
        post: &RedditPost,
        outcome: &mut ScanOutcome,
    ) -> Result<(), CoreError>
    where
        S: ContentSource + ?Sized,
    {
        let comments = source.expanded_comments(post).await?;
        for comment in &comments {
            outcome.comments_scanned += 1;
            if self.matcher.matches(&comment.body) {
                debug!("Comment {} on post {} matched", comment.id, post.id);
                outcome.records.push(format_comment(comment, post));
            }
        }
        Ok(())
    }
}

/// Runs a single scan cycle with a freshly compiled keyword matcher.
pub async fn scan<S>(source: &S, config: &ScanConfig) -> ScanOutcome
where
    S: ContentSource + ?Sized,
{
    match Scanner::new(config.clone()) {
        Ok(scanner) => scanner.scan(source).await,
        Err(e) => {
            e.log_error();
            ScanOutcome {
                error: Some(e),
                ..ScanOutcome::default()
            }
        }
    }
}

fn log_source_failure(error: &CoreError, stage: &str, subreddit: &str) {
    let code = error.error_code();
    let category = error.category();
    match category {
        ErrorCategory::Transport => warn!(
            %code, %category,
            "Network failure while {} for r/{}: {}", stage, subreddit, error
        ),
        ErrorCategory::Service | ErrorCategory::Authentication => warn!(
            %code, %category,
            "Reddit reported a failure while {} for r/{}: {}", stage, subreddit, error
        ),
        ErrorCategory::Unclassified => error!(
            %code, %category,
            "Unexpected failure while {} for r/{}: {}", stage, subreddit, error
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use watch_core::{KeywordSet, RedditComment};

    struct QuietSubreddit;

    #[async_trait]
    impl ContentSource for QuietSubreddit {
        async fn list_recent_posts(
            &self,
            _subreddit: &str,
            _limit: u32,
        ) -> Result<Vec<RedditPost>, CoreError> {
            Ok(Vec::new())
        }

        async fn expanded_comments(
            &self,
            _post: &RedditPost,
        ) -> Result<Vec<RedditComment>, CoreError> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_empty_listing_is_a_clean_cycle() {
        let config = ScanConfig::new("rust", KeywordSet::parse("rust"));
        let outcome = tokio_test::block_on(scan(&QuietSubreddit, &config));

        assert!(outcome.records.is_empty());
        assert!(outcome.error.is_none());
        assert!(!outcome.timed_out);
        assert_eq!(outcome.posts_scanned, 0);
    }

    #[test]
    fn test_empty_keyword_set_matches_nothing() {
        let config = ScanConfig::new("rust", KeywordSet::parse(" , "));
        let outcome = tokio_test::block_on(scan(&QuietSubreddit, &config));

        assert!(outcome.error.is_none());
        assert!(outcome.records.is_empty());
    }
}
