//! Script-app authentication against Reddit's token endpoint.
//!
//! Reddit "script" apps exchange the owner's username and password for a
//! bearer token (OAuth2 resource owner password grant), with the app's client
//! id and secret sent as HTTP basic auth. Reddit answers a bad login with
//! `200 OK` and `{"error": "invalid_grant"}`, so a token body that fails to
//! parse is inspected for an `error` field before giving up.

use chrono::Utc;
use oauth2::basic::{BasicClient, BasicErrorResponse};
use oauth2::{
    AuthUrl, ClientId, ClientSecret, HttpRequest, HttpResponse, RequestTokenError,
    ResourceOwnerPassword, ResourceOwnerUsername, TokenResponse, TokenUrl,
};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use std::time::Duration;
use subwatch_core::{ConfigError, CoreError, RedditApiError, Session};
use tracing::{debug, error, info};

pub const ENV_REDDIT_USERNAME: &str = "REDDIT_USERNAME";
pub const ENV_REDDIT_PASSWORD: &str = "REDDIT_PASSWORD";
pub const ENV_REDDIT_CLIENT_ID: &str = "REDDIT_CLIENT_ID";
pub const ENV_REDDIT_SECRET: &str = "REDDIT_SECRET";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct RedditCredentials {
    pub username: String,
    pub password: SecretString,
    pub client_id: String,
    pub client_secret: SecretString,
}

impl RedditCredentials {
    pub fn new(
        username: impl Into<String>,
        password: impl Into<String>,
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            password: SecretString::from(password.into()),
            client_id: client_id.into(),
            client_secret: SecretString::from(client_secret.into()),
        }
    }

    /// Read `REDDIT_USERNAME`, `REDDIT_PASSWORD`, `REDDIT_CLIENT_ID` and `REDDIT_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::new(
            required_env(ENV_REDDIT_USERNAME)?,
            required_env(ENV_REDDIT_PASSWORD)?,
            required_env(ENV_REDDIT_CLIENT_ID)?,
            required_env(ENV_REDDIT_SECRET)?,
        ))
    }
}

fn required_env(var_name: &str) -> Result<String, ConfigError> {
    std::env::var(var_name)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
            var_name: var_name.to_string(),
        })
}

pub struct RedditAuthenticator {
    credentials: RedditCredentials,
    auth_url: AuthUrl,
    token_url: TokenUrl,
    http_client: Client,
}

impl RedditAuthenticator {
    pub fn new(
        credentials: RedditCredentials,
        endpoints: &crate::RedditEndpoints,
        user_agent: &str,
    ) -> Result<Self, CoreError> {
        let auth_url = AuthUrl::new(endpoints.authorize_url.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "authorize_url".to_string(),
                value: format!("{} ({})", endpoints.authorize_url, e),
            }
        })?;
        let token_url = TokenUrl::new(endpoints.token_url.clone()).map_err(|e| {
            ConfigError::InvalidValue {
                field: "token_url".to_string(),
                value: format!("{} ({})", endpoints.token_url, e),
            }
        })?;

        // Token requests must not follow redirects
        let http_client = Client::builder()
            .user_agent(user_agent)
            .timeout(REQUEST_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            credentials,
            auth_url,
            token_url,
            http_client,
        })
    }

    pub fn username(&self) -> &str {
        &self.credentials.username
    }

    /// Exchange the configured credentials for a fresh [`Session`].
    pub async fn authenticate(&self) -> Result<Session, CoreError> {
        info!("Authenticating with Reddit as {}", self.credentials.username);

        let oauth_client = BasicClient::new(
            ClientId::new(self.credentials.client_id.clone()),
            Some(ClientSecret::new(
                self.credentials.client_secret.expose_secret().to_string(),
            )),
            self.auth_url.clone(),
            Some(self.token_url.clone()),
        );

        let username = ResourceOwnerUsername::new(self.credentials.username.clone());
        let password =
            ResourceOwnerPassword::new(self.credentials.password.expose_secret().to_string());

        let token = oauth_client
            .exchange_password(&username, &password)
            .request_async(|request| self.send(request))
            .await
            .map_err(|e| {
                let reason = failure_reason(e);
                error!("Reddit authentication failed: {}", reason);
                CoreError::RedditApi(RedditApiError::AuthenticationFailed { reason })
            })?;

        let token_type: &str = token.token_type().as_ref();
        let mut session = Session::new(token_type, token.access_token().secret().clone());

        if let Some(expires_in) = token.expires_in() {
            if let Ok(expires_in) = chrono::Duration::from_std(expires_in) {
                session = session.with_expiry(Utc::now() + expires_in);
            }
        }

        if let Some(scopes) = token.scopes() {
            session = session.with_scope(scopes.iter().map(|s| s.as_str().to_string()).collect());
        }

        info!(
            "Authenticated with Reddit (token type: {}, expires: {:?})",
            session.token_type, session.expires_at
        );
        Ok(session)
    }

    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, reqwest::Error> {
        debug!("Requesting token: {} {}", request.method, request.url);

        let response = self
            .http_client
            .request(request.method, request.url.as_str())
            .headers(request.headers)
            .body(request.body)
            .send()
            .await?;

        let status_code = response.status();
        let headers = response.headers().clone();
        let body = response.bytes().await?.to_vec();

        Ok(HttpResponse {
            status_code,
            headers,
            body,
        })
    }
}

fn failure_reason(err: RequestTokenError<reqwest::Error, BasicErrorResponse>) -> String {
    match err {
        RequestTokenError::ServerResponse(response) => response.to_string(),
        RequestTokenError::Request(e) => format!("token request failed: {}", e),
        RequestTokenError::Parse(parse_error, body) => error_field(&body)
            .unwrap_or_else(|| format!("unexpected token response: {}", parse_error)),
        RequestTokenError::Other(message) => message,
    }
}

/// The `error` field of a JSON body, if there is one.
pub(crate) fn error_field(body: &[u8]) -> Option<String> {
    let value: serde_json::Value = serde_json::from_slice(body).ok()?;
    match value.get("error")? {
        serde_json::Value::Null => None,
        serde_json::Value::String(reason) => Some(reason.clone()),
        other => Some(other.to_string()),
    }
}
