use reqwest::header::{ACCEPT, AUTHORIZATION, RETRY_AFTER};
use reqwest::{Client, Response, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use subwatch_core::{CoreError, RawPost, RedditApiError, Session};
use tracing::{debug, error, info, warn};

pub const REDDIT_API_BASE: &str = "https://oauth.reddit.com";
pub const REDDIT_TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
pub const REDDIT_AUTHORIZE_URL: &str = "https://www.reddit.com/api/v1/authorize";

/// Fixed client identifier sent with every Reddit request.
pub const USER_AGENT: &str = concat!(
    "rust:subwatch.pushbullet.notifier:v",
    env!("CARGO_PKG_VERSION")
);

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct RedditEndpoints {
    pub api_base: String,
    pub token_url: String,
    pub authorize_url: String,
}

impl Default for RedditEndpoints {
    fn default() -> Self {
        Self {
            api_base: REDDIT_API_BASE.to_string(),
            token_url: REDDIT_TOKEN_URL.to_string(),
            authorize_url: REDDIT_AUTHORIZE_URL.to_string(),
        }
    }
}

impl RedditEndpoints {
    /// Serve every endpoint from one base URL, e.g. a local mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            api_base: base.to_string(),
            token_url: format!("{}/api/v1/access_token", base),
            authorize_url: format!("{}/api/v1/authorize", base),
        }
    }
}

/// Body of `/r/{subreddit}/new`: either a listing or an error report.
#[derive(Debug, Deserialize)]
pub struct ListingResponse {
    #[serde(default)]
    pub error: Option<serde_json::Value>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub data: Option<ListingData>,
}

#[derive(Debug, Deserialize)]
pub struct ListingData {
    #[serde(default)]
    pub children: Option<Vec<RawPost>>,
}

#[derive(Debug)]
pub struct RedditApiClient {
    http_client: Client,
    api_base: String,
}

impl RedditApiClient {
    pub fn new(endpoints: &RedditEndpoints, user_agent: &str) -> Result<Self, CoreError> {
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            http_client,
            api_base: endpoints.api_base.trim_end_matches('/').to_string(),
        })
    }

    /// Newest posts of `subreddit`, uninterpreted.
    ///
    /// A body carrying an `error` field is logged and treated as an empty
    /// listing; transport failures and non-success statuses are returned as errors.
    pub async fn get_new_posts(
        &self,
        session: &Session,
        subreddit: &str,
    ) -> Result<Vec<RawPost>, CoreError> {
        let endpoint = format!("/r/{}/new", subreddit);
        let url = format!("{}{}", self.api_base, endpoint);

        debug!("Making Reddit API request: GET {}", endpoint);
        let response = self
            .http_client
            .get(&url)
            .header(AUTHORIZATION, session.authorization_header())
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| {
                error!("Network error for GET {}: {}", endpoint, e);
                if e.is_timeout() {
                    CoreError::RedditApi(RedditApiError::RequestTimeout)
                } else {
                    CoreError::Network(e)
                }
            })?;

        let response = check_status(response, &endpoint, subreddit)?;

        let listing: ListingResponse = response.json().await.map_err(|e| {
            error!("Failed to parse subreddit posts: {}", e);
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Failed to parse posts for r/{}", subreddit),
            })
        })?;

        if let Some(reported) = listing.error {
            warn!(
                "Reddit reported an error for r/{}: {} {}",
                subreddit,
                reported,
                listing.message.unwrap_or_default()
            );
            return Ok(Vec::new());
        }

        let data = listing.data.ok_or_else(|| {
            CoreError::RedditApi(RedditApiError::InvalidResponse {
                details: format!("Listing for r/{} has no data", subreddit),
            })
        })?;

        let children = data.children.unwrap_or_default();
        info!("Retrieved {} posts from r/{}", children.len(), subreddit);
        Ok(children)
    }
}

fn check_status(response: Response, endpoint: &str, subreddit: &str) -> Result<Response, CoreError> {
    let status = response.status();
    if status.is_success() {
        debug!("Request successful: {} {}", status, endpoint);
        return Ok(response);
    }

    error!("Request failed with status: {} for {}", status, endpoint);
    let api_error = match status {
        StatusCode::TOO_MANY_REQUESTS => {
            let retry_after = response
                .headers()
                .get(RETRY_AFTER)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.parse::<u64>().ok())
                .unwrap_or(60);
            warn!("Rate limited, retry after {} seconds", retry_after);
            RedditApiError::RateLimitExceeded { retry_after }
        }
        StatusCode::UNAUTHORIZED => RedditApiError::InvalidToken,
        StatusCode::FORBIDDEN => RedditApiError::Forbidden {
            resource: endpoint.to_string(),
        },
        StatusCode::NOT_FOUND => RedditApiError::SubredditNotFound {
            subreddit: subreddit.to_string(),
        },
        status if status.is_server_error() => RedditApiError::ServerError {
            status_code: status.as_u16(),
        },
        status => RedditApiError::InvalidResponse {
            details: format!("Unexpected status {} for {}", status, endpoint),
        },
    };

    Err(CoreError::RedditApi(api_error))
}
