use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Base used to turn a post's relative permalink into a shareable link.
pub const REDDIT_WEB_BASE: &str = "https://www.reddit.com";

/// A listing child exactly as the API returned it.
///
/// The fetcher hands these over untouched; turning one into a [`Post`] is the
/// selection step's job, so a single malformed entry never fails a whole batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RawPost(pub serde_json::Value);

#[derive(Debug, Deserialize)]
struct PostFields {
    title: String,
    created_utc: f64,
    permalink: String,
}

impl RawPost {
    pub fn to_post(&self) -> Result<Post, CoreError> {
        let data = self
            .0
            .get("data")
            .filter(|data| data.is_object())
            .ok_or_else(|| CoreError::InvalidPost {
                reason: "missing data object".to_string(),
            })?;

        let fields: PostFields =
            serde_json::from_value(data.clone()).map_err(|e| CoreError::InvalidPost {
                reason: e.to_string(),
            })?;

        Ok(Post {
            title: fields.title,
            created_ms: (fields.created_utc * 1000.0) as i64,
            permalink: fields.permalink,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub title: String,
    /// Creation time in milliseconds since the epoch.
    pub created_ms: i64,
    pub permalink: String,
}

impl Post {
    /// Creation time in whole seconds.
    pub fn created_utc(&self) -> i64 {
        self.created_ms.div_euclid(1000)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Match {
    pub title: String,
    pub url: String,
}

impl Match {
    pub fn from_post(post: &Post, web_base: &str) -> Self {
        Self {
            title: post.title.clone(),
            url: format!("{}{}", web_base.trim_end_matches('/'), post.permalink),
        }
    }
}

/// Bearer credentials for the listing API.
///
/// Owned by whoever drives the polling cycles and replaced wholesale on
/// re-authentication; readers only ever borrow it.
#[derive(Debug)]
pub struct Session {
    pub token_type: String,
    access_token: SecretString,
    pub expires_at: Option<DateTime<Utc>>,
    pub scope: Vec<String>,
}

impl Session {
    pub fn new(token_type: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            token_type: token_type.into(),
            access_token: SecretString::from(access_token.into()),
            expires_at: None,
            scope: Vec::new(),
        }
    }

    pub fn with_expiry(mut self, expires_at: DateTime<Utc>) -> Self {
        self.expires_at = Some(expires_at);
        self
    }

    pub fn with_scope(mut self, scope: Vec<String>) -> Self {
        self.scope = scope;
        self
    }

    pub fn access_token(&self) -> &str {
        self.access_token.expose_secret()
    }

    /// Value for the `Authorization` header: `{token_type} {access_token}`.
    pub fn authorization_header(&self) -> String {
        format!("{} {}", self.token_type, self.access_token.expose_secret())
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now >= expires_at)
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}
