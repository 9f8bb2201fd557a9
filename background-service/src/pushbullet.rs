//! Pushbullet link pushes.
//!
//! Pushes are created with `POST /v2/pushes`. Leaving out every target field
//! (`device_iden`, `email`, `channel_tag`, `client_iden`) delivers the push to
//! all of the account's devices.

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use subwatch_core::{ConfigError, CoreError, NotifyError};
use tracing::debug;

use crate::notifier::{LinkPush, PushChannel};

/// Environment variable holding the Pushbullet access token.
pub const ENV_PUSHBULLET_ACCESS_TOKEN: &str = "PUSHBULLET_ACCESS_TOKEN";

pub const PUSHBULLET_API_BASE: &str = "https://api.pushbullet.com";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Serialize)]
struct PushRequest<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    title: &'a str,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    #[serde(default)]
    message: Option<String>,
    #[serde(default, rename = "type")]
    kind: Option<String>,
}

pub struct PushbulletChannel {
    access_token: SecretString,
    api_base: String,
    client: Client,
}

impl PushbulletChannel {
    pub fn new(access_token: impl Into<String>) -> Result<Self, NotifyError> {
        Self::with_base_url(access_token, PUSHBULLET_API_BASE)
    }

    pub fn with_base_url(
        access_token: impl Into<String>,
        api_base: &str,
    ) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(REQUEST_TIMEOUT).build()?;

        Ok(Self {
            access_token: SecretString::from(access_token.into()),
            api_base: api_base.trim_end_matches('/').to_string(),
            client,
        })
    }

    pub fn from_env() -> Result<Self, CoreError> {
        let access_token = std::env::var(ENV_PUSHBULLET_ACCESS_TOKEN)
            .ok()
            .filter(|token| !token.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvironmentVariable {
                var_name: ENV_PUSHBULLET_ACCESS_TOKEN.to_string(),
            })?;
        Ok(Self::new(access_token)?)
    }
}

#[async_trait]
impl PushChannel for PushbulletChannel {
    fn name(&self) -> &'static str {
        "pushbullet"
    }

    async fn send(&self, push: &LinkPush) -> Result<(), NotifyError> {
        let body = PushRequest {
            kind: "link",
            title: &push.title,
            url: &push.url,
        };

        let response = self
            .client
            .post(format!("{}/v2/pushes", self.api_base))
            .header("Access-Token", self.access_token.expose_secret())
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            debug!(url = %push.url, "Pushbullet accepted push");
            return Ok(());
        }

        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .ok()
            .and_then(|body| body.error.message.or(body.error.kind))
            .unwrap_or(text);

        Err(NotifyError::Rejected {
            status: status.as_u16(),
            message,
        })
    }
}
