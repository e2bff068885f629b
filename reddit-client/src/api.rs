use crate::rate_limiter::{RateLimitConfig, RateLimiter};
use reqwest::{Client, Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, info, warn};
use watch_core::{CoreError, RedditApiError, RedditComment, RedditPost, DELETED_AUTHOR};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

/// Largest page the listing endpoints hand out.
const LISTING_PAGE_MAX: u32 = 100;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListing<T> {
    pub kind: String,
    pub data: RedditListingData<T>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingData<T> {
    pub children: Vec<RedditListingChild<T>>,
    pub after: Option<String>,
    pub before: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditListingChild<T> {
    pub kind: String,
    pub data: T,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditPostData {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub selftext: String,
    pub author: String,
    pub subreddit: String,
    pub url: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    #[serde(default)]
    pub num_comments: u32,
    #[serde(default)]
    pub is_self: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditCommentData {
    pub id: String,
    pub author: String,
    pub body: String,
    pub permalink: String,
    pub created_utc: f64,
    pub score: i64,
    /// Either an empty string or a nested listing.
    #[serde(default)]
    pub replies: Value,
}

/// What a request was about, used to name 403/404 failures.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
    Subreddit(&'a str),
    Post(&'a str),
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    rate_limiter: RateLimiter,
    api_base: String,
    web_base: String,
}

impl RedditApiClient {
    pub fn with_base_urls(
        user_agent: String,
        api_base: &str,
        web_base: &str,
    ) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(&user_agent)
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            http_client,
            rate_limiter: RateLimiter::new(RateLimitConfig::reddit_oauth()),
            api_base: api_base.trim_end_matches('/').to_string(),
            web_base: web_base.trim_end_matches('/').to_string(),
        })
    }

    pub async fn make_request(
        &self,
        method: Method,
        endpoint: &str,
        access_token: &str,
        query_params: &[(&str, &str)],
        resource: Resource<'_>,
    ) -> Result<Response, CoreError> {
        let url = format!("{}{}", self.api_base, endpoint);

        let permit = self.rate_limiter.acquire_permit().await;
        debug!(
            "Acquired rate limit permit for {} {} after {:?}",
            method, endpoint, permit.queue_wait_time
        );

        let request_builder = self
            .http_client
            .request(method.clone(), &url)
            .bearer_auth(access_token)
            .query(query_params);

        debug!("Making Reddit API request: {} {}", method, endpoint);
        let response = match request_builder.send().await {
            Ok(response) => response,
            Err(e) => {
                error!("Network error for {} {}: {}", method, endpoint, e);
                if e.is_timeout() {
                    return Err(CoreError::RedditApi(RedditApiError::RequestTimeout));
                }
                return Err(CoreError::Network(e));
            }
        };

        let status = response.status();
        if status.is_success() {
            debug!("Request successful: {} {}", status, endpoint);
            return Ok(response);
        }

        error!("Request failed with status: {} for {}", status, endpoint);
        let error = match status {
            StatusCode::TOO_MANY_REQUESTS => {
                let retry_after = response
                    .headers()
                    .get("retry-after")
                    .and_then(|value| value.to_str().ok())
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(60);
                warn!("Rate limited, retry after {} seconds", retry_after);
                RedditApiError::RateLimitExceeded { retry_after }
            }
            StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
            StatusCode::FORBIDDEN => RedditApiError::Forbidden {
                resource: match resource {
                    Resource::Subreddit(name) => format!("r/{}", name),
                    Resource::Post(id) => format!("post {}", id),
                },
            },
            StatusCode::NOT_FOUND => match resource {
                Resource::Subreddit(name) => RedditApiError::SubredditNotFound {
                    subreddit: name.to_string(),
                },
                Resource::Post(id) => RedditApiError::PostNotFound {
                    post_id: id.to_string(),
                },
            },
            status if status.is_server_error() => RedditApiError::ServerError {
                status_code: status.as_u16(),
            },
            status => RedditApiError::InvalidResponse {
                details: format!("Unexpected status {} for {}", status, endpoint),
            },
        };
        Err(CoreError::RedditApi(error))
    }

    /// Newest posts of a subreddit, paging with `after` until `limit` posts are collected.
    pub async fn get_new_posts(
        &self,
        access_token: &str,
        subreddit: &str,
        limit: u32,
    ) -> Result<Vec<RedditPostData>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let mut posts: Vec<RedditPostData> = Vec::new();
        let mut after: Option<String> = None;

        while (posts.len() as u32) < limit {
            let page_size = (limit - posts.len() as u32).min(LISTING_PAGE_MAX).to_string();
            let mut params = vec![("limit", page_size.as_str()), ("raw_json", "1")];
            if let Some(ref after_val) = after {
                params.push(("after", after_val.as_str()));
            }

            let response = self
                .make_request(
                    Method::GET,
                    &endpoint,
                    access_token,
                    &params,
                    Resource::Subreddit(subreddit),
                )
                .await?;

            let listing: RedditListing<RedditPostData> = response.json().await.map_err(|e| {
                error!("Failed to parse subreddit posts: {}", e);
                CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Failed to parse posts for r/{}", subreddit),
                })
            })?;

            let page_len = listing.data.children.len();
            posts.extend(listing.data.children.into_iter().map(|child| child.data));
            after = listing.data.after;

            if page_len == 0 || after.is_none() {
                break;
            }
        }

        posts.truncate(limit as usize);
        info!("Retrieved {} posts from r/{}", posts.len(), subreddit);
        Ok(posts)
    }

    /// The comment tree the post page already carries, flattened depth-first.
    pub async fn get_post_comments(
        &self,
        access_token: &str,
        post_id: &str,
    ) -> Result<Vec<RedditCommentData>, CoreError> {
        let endpoint = format!("/comments/{}", post_id);
        let response = self
            .make_request(
                Method::GET,
                &endpoint,
                access_token,
                &[("raw_json", "1")],
                Resource::Post(post_id),
            )
            .await?;

        // The endpoint answers with [post listing, comment listing].
        let listings: Vec<RedditListing<Value>> = response.json().await.map_err(|e| {
            error!("Failed to parse comments: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse comments for post {}", post_id),
            })
        })?;

        let comments = match listings.into_iter().nth(1) {
            Some(listing) => flatten_comment_listing(listing),
            None => {
                return Err(CoreError::RedditApi(RedditApiError::InvalidResponse {
                    details: format!("Comment listing missing for post {}", post_id),
                }))
            }
        };

        debug!("Retrieved {} comments for post {}", comments.len(), post_id);
        Ok(comments)
    }

    pub fn to_post(&self, post_data: RedditPostData) -> RedditPost {
        RedditPost {
            id: post_data.id,
            title: post_data.title,
            permalink: format!("{}{}", self.web_base, post_data.permalink),
            author: author_name(post_data.author),
            score: post_data.score,
            created_utc: post_data.created_utc as i64,
            body: post_data.selftext,
        }
    }

    pub fn to_comment(&self, comment_data: RedditCommentData) -> RedditComment {
        RedditComment {
            id: comment_data.id,
            permalink: format!("{}{}", self.web_base, comment_data.permalink),
            author: author_name(comment_data.author),
            score: comment_data.score,
            created_utc: comment_data.created_utc as i64,
            body: comment_data.body,
        }
    }
}

fn author_name(author: String) -> Option<String> {
    if author.is_empty() || author == DELETED_AUTHOR {
        None
    } else {
        Some(author)
    }
}

/// Walks `t1` children depth-first. `more` stubs are skipped, never fetched.
fn flatten_comment_listing(listing: RedditListing<Value>) -> Vec<RedditCommentData> {
    let mut comments = Vec::new();
    for child in listing.data.children {
        if child.kind != "t1" {
            continue;
        }
        let mut comment: RedditCommentData = match serde_json::from_value(child.data) {
            Ok(comment) => comment,
            Err(e) => {
                warn!("Skipping malformed comment: {}", e);
                continue;
            }
        };
        let replies = std::mem::take(&mut comment.replies);
        comments.push(comment);

        if replies.is_object() {
            match serde_json::from_value::<RedditListing<Value>>(replies) {
                Ok(nested) => comments.extend(flatten_comment_listing(nested)),
                Err(e) => warn!("Skipping malformed reply listing: {}", e),
            }
        }
    }
    comments
}
