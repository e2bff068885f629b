use crate::{CoreError, RedditComment, RedditPost};
use async_trait::async_trait;

/// Where scan cycles read posts and comments from.
///
/// Implementations own authentication, paging and rate limiting. Both calls
/// may fail with a transport or service error, which the caller classifies
/// through [`crate::ErrorExt::category`].
#[async_trait]
pub trait ContentSource: Send + Sync {
    /// Newest posts first, at most `limit` of them.
    async fn list_recent_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError>;

    /// The post's already-loaded comment tree, flattened depth-first.
    /// Collapsed "load more" stubs are not followed.
    async fn expanded_comments(&self, post: &RedditPost) -> Result<Vec<RedditComment>, CoreError>;
}
