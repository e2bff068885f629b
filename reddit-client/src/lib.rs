pub mod api;
pub mod auth;
pub mod rate_limiter;


pub use api::{RedditApiClient, REDDIT_API_BASE, REDDIT_WEB_BASE};
pub use auth::{PasswordAuthenticator, RedditCredentials, RedditToken, REDDIT_TOKEN_URL};

use async_trait::async_trait;
use tokio::sync::RwLock;
use tracing::{debug, warn};
use watch_core::{ContentSource, CoreError, RedditApiError, RedditComment, RedditPost};

/// Where the client talks to. Tests point these at a local mock server.
#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    pub api_base: String,
    pub token_url: String,
    pub web_base: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            api_base: REDDIT_API_BASE.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
            web_base: REDDIT_WEB_BASE.to_string(),
        }
    }
}

/// Authenticated Reddit handle, used by the monitor as its content source.
pub struct RedditClient {
    api: RedditApiClient,
    authenticator: PasswordAuthenticator,
    token: RwLock<Option<RedditToken>>,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        Self::with_endpoints(credentials, RedditEndpoints::default())
    }

    pub fn with_endpoints(
        credentials: RedditCredentials,
        endpoints: RedditEndpoints,
    ) -> Result<Self, CoreError> {
        let api = RedditApiClient::with_base_urls(
            credentials.user_agent.clone(),
            &endpoints.api_base,
            &endpoints.web_base,
        )?;
        let authenticator = PasswordAuthenticator::new(&credentials, &endpoints.token_url)?;

        Ok(Self {
            api,
            authenticator,
            token: RwLock::new(None),
        })
    }

    /// Obtains the first access token. Fails fast on bad credentials.
    pub async fn authenticate(&self) -> Result<(), CoreError> {
        let token = self.authenticator.request_token().await?;
        *self.token.write().await = Some(token);
        Ok(())
    }

    pub async fn is_authenticated(&self) -> bool {
        self.token
            .read()
            .await
            .as_ref()
            .map(|token| !token.is_expired())
            .unwrap_or(false)
    }

    async fn access_token(&self) -> Result<String, CoreError> {
        if let Some(token) = self.token.read().await.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        let mut guard = self.token.write().await;
        if let Some(token) = guard.as_ref() {
            if !token.is_expired() {
                return Ok(token.access_token.clone());
            }
        }

        debug!("Access token missing or expired, re-authenticating");
        let token = self.authenticator.request_token().await?;
        let access_token = token.access_token.clone();
        *guard = Some(token);
        Ok(access_token)
    }

    /// Drops the cached token after a 401 so the next call re-authenticates.
    async fn forget_token_on_rejection<T>(
        &self,
        result: Result<T, CoreError>,
    ) -> Result<T, CoreError> {
        if let Err(CoreError::RedditApi(RedditApiError::InvalidToken)) = &result {
            warn!("Reddit rejected the access token, it will be renewed on the next request");
            *self.token.write().await = None;
        }
        result
    }
}

#[async_trait]
impl ContentSource for RedditClient {
    async fn list_recent_posts(
        &self,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPost>, CoreError> {
        let access_token = self.access_token().await?;
        let result = self.api.get_new_posts(&access_token, subreddit, limit).await;
        let posts = self.forget_token_on_rejection(result).await?;
        Ok(posts.into_iter().map(|post| self.api.to_post(post)).collect())
    }

    async fn expanded_comments(&self, post: &RedditPost) -> Result<Vec<RedditComment>, CoreError> {
        let access_token = self.access_token().await?;
        let result = self.api.get_post_comments(&access_token, &post.id).await;
        let comments = self.forget_token_on_rejection(result).await?;
        Ok(comments
            .into_iter()
            .map(|comment| self.api.to_comment(comment))
            .collect())
    }
}
