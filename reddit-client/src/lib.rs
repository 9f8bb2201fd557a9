pub mod api;
pub mod auth;

#[cfg(test)]
mod tests;

pub use api::{ListingData, ListingResponse, RedditApiClient, RedditEndpoints, USER_AGENT};
pub use auth::{RedditAuthenticator, RedditCredentials};

use subwatch_core::{CoreError, RawPost, Session};

/// Password-grant authentication plus the `/new` listing, sharing one set of endpoints.
pub struct RedditClient {
    authenticator: RedditAuthenticator,
    api: RedditApiClient,
}

impl RedditClient {
    pub fn new(credentials: RedditCredentials) -> Result<Self, CoreError> {
        Self::with_endpoints(credentials, RedditEndpoints::default())
    }

    pub fn with_endpoints(
        credentials: RedditCredentials,
        endpoints: RedditEndpoints,
    ) -> Result<Self, CoreError> {
        Ok(Self {
            authenticator: RedditAuthenticator::new(credentials, &endpoints, USER_AGENT)?,
            api: RedditApiClient::new(&endpoints, USER_AGENT)?,
        })
    }

    pub async fn authenticate(&self) -> Result<Session, CoreError> {
        self.authenticator.authenticate().await
    }

    pub async fn fetch_new(
        &self,
        session: &Session,
        subreddit: &str,
    ) -> Result<Vec<RawPost>, CoreError> {
        self.api.get_new_posts(session, subreddit).await
    }
}
