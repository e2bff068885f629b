//! Script-app authentication.
//!
//! A personal "script" app on Reddit authenticates with the OAuth2 resource
//! owner password grant. There is no refresh token in this flow; an expired
//! token is simply replaced by a fresh grant.

use oauth2::basic::BasicClient;
use oauth2::http::header::USER_AGENT;
use oauth2::http::HeaderValue;
use oauth2::reqwest::async_http_client;
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, RequestTokenError, ResourceOwnerPassword,
    ResourceOwnerUsername, Scope, TokenResponse, TokenUrl,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{Duration, SystemTime};
use tracing::{debug, info};
use watch_core::{ConfigError, CoreError, RedditApiError};

pub const REDDIT_AUTH_URL: &str = "https://www.reddit.com/api/v1/authorize";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const DEFAULT_USER_AGENT: &str = concat!("subwatch/", env!("CARGO_PKG_VERSION"));

/// Tokens are treated as expired this long before Reddit says they are.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);
const DEFAULT_TOKEN_LIFETIME: Duration = Duration::from_secs(3600);

#[derive(Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub username: String,
    pub password: String,
    pub user_agent: String,
}

impl RedditCredentials {
    /// Reads `REDDIT_CLIENT_ID`, `REDDIT_CLIENT_SECRET`, `REDDIT_USERNAME`,
    /// `REDDIT_PASSWORD` and the optional `REDDIT_USER_AGENT`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key))
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Result<String, std::env::VarError>,
    {
        let require = |var: &str| -> Result<String, ConfigError> {
            lookup(var)
                .ok()
                .filter(|value| !value.trim().is_empty())
                .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                    var_name: var.to_string(),
                })
        };

        Ok(Self {
            client_id: require("REDDIT_CLIENT_ID")?,
            client_secret: require("REDDIT_CLIENT_SECRET")?,
            username: require("REDDIT_USERNAME")?,
            password: require("REDDIT_PASSWORD")?,
            user_agent: lookup("REDDIT_USER_AGENT")
                .unwrap_or_else(|_| DEFAULT_USER_AGENT.to_string()),
        })
    }
}

impl fmt::Debug for RedditCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RedditCredentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedditToken {
    pub access_token: String,
    pub expires_at: SystemTime,
    pub scope: Vec<String>,
}

impl RedditToken {
    pub fn is_expired(&self) -> bool {
        SystemTime::now() + EXPIRY_MARGIN >= self.expires_at
    }
}

pub struct PasswordAuthenticator {
    oauth_client: BasicClient,
    username: ResourceOwnerUsername,
    password: ResourceOwnerPassword,
    user_agent: HeaderValue,
}

impl PasswordAuthenticator {
    pub fn new(credentials: &RedditCredentials, token_url: &str) -> Result<Self, CoreError> {
        let invalid = |field: &str, value: &str| {
            CoreError::Config(ConfigError::InvalidValue {
                field: field.to_string(),
                value: value.to_string(),
            })
        };

        let auth_url = AuthUrl::new(REDDIT_AUTH_URL.to_string())
            .map_err(|_| invalid("auth_url", REDDIT_AUTH_URL))?;
        let token_url =
            TokenUrl::new(token_url.to_string()).map_err(|_| invalid("token_url", token_url))?;
        let user_agent = HeaderValue::from_str(&credentials.user_agent)
            .map_err(|_| invalid("REDDIT_USER_AGENT", &credentials.user_agent))?;

        let oauth_client = BasicClient::new(
            ClientId::new(credentials.client_id.clone()),
            Some(ClientSecret::new(credentials.client_secret.clone())),
            auth_url,
            Some(token_url),
        );

        Ok(Self {
            oauth_client,
            username: ResourceOwnerUsername::new(credentials.username.clone()),
            password: ResourceOwnerPassword::new(credentials.password.clone()),
            user_agent,
        })
    }

    pub async fn request_token(&self) -> Result<RedditToken, CoreError> {
        debug!("Requesting Reddit access token for u/{}", self.username.as_str());

        let user_agent = self.user_agent.clone();
        let http_client = move |mut request: HttpRequest| {
            request.headers.insert(USER_AGENT, user_agent);
            async_http_client(request)
        };

        let response = self
            .oauth_client
            .exchange_password(&self.username, &self.password)
            .add_scope(Scope::new("read".to_string()))
            .request_async(http_client)
            .await
            .map_err(|e| {
                let reason = match e {
                    RequestTokenError::ServerResponse(response) => response.error().to_string(),
                    RequestTokenError::Request(e) => format!("token request failed: {}", e),
                    RequestTokenError::Parse(e, _) => format!("unreadable token response: {}", e),
                    RequestTokenError::Other(message) => message,
                };
                CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
            })?;

        let lifetime = response.expires_in().unwrap_or(DEFAULT_TOKEN_LIFETIME);
        let scope = response
            .scopes()
            .map(|scopes| scopes.iter().map(|s| s.as_str().to_owned()).collect())
            .unwrap_or_default();

        info!("Authenticated with Reddit, token valid for {:?}", lifetime);
        Ok(RedditToken {
            access_token: response.access_token().secret().clone(),
            expires_at: SystemTime::now() + lifetime,
            scope,
        })
    }
}
