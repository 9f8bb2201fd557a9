use std::time::Duration;

use crate::error::ConfigError;
use crate::matcher::RuleSets;

pub const DEFAULT_INTERVAL_SECS: u64 = 5;
pub const MIN_INTERVAL_SECS: u64 = 1;

/// What to watch and how often.
///
/// Only constructible through [`MatchConfigBuilder::build`], which enforces
/// that the subreddit is set, the interval is at least one second and at least
/// one phrase set is non-empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    subreddit: String,
    rules: RuleSets,
    interval_secs: u64,
}

impl MatchConfig {
    pub fn builder(subreddit: impl Into<String>) -> MatchConfigBuilder {
        MatchConfigBuilder {
            subreddit: subreddit.into(),
            rules: RuleSets::default(),
            interval_secs: DEFAULT_INTERVAL_SECS,
        }
    }

    pub fn subreddit(&self) -> &str {
        &self.subreddit
    }

    pub fn rules(&self) -> &RuleSets {
        &self.rules
    }

    pub fn interval_secs(&self) -> u64 {
        self.interval_secs
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

#[derive(Debug, Clone)]
pub struct MatchConfigBuilder {
    subreddit: String,
    rules: RuleSets,
    interval_secs: u64,
}

impl MatchConfigBuilder {
    /// Comma-separated phrases tested against the whole title.
    pub fn post(mut self, phrases: &str) -> Self {
        self.rules = self.rules.with_post(phrases.split(','));
        self
    }

    /// Comma-separated phrases tested against the `[H]` part of the title.
    pub fn have(mut self, phrases: &str) -> Self {
        self.rules = self.rules.with_have(phrases.split(','));
        self
    }

    /// Comma-separated phrases tested against the `[W]` part of the title.
    pub fn want(mut self, phrases: &str) -> Self {
        self.rules = self.rules.with_want(phrases.split(','));
        self
    }

    pub fn interval_secs(mut self, interval_secs: u64) -> Self {
        self.interval_secs = interval_secs;
        self
    }

    pub fn build(self) -> Result<MatchConfig, ConfigError> {
        let subreddit = self.subreddit.trim().trim_start_matches("r/").to_string();
        if subreddit.is_empty() {
            return Err(ConfigError::MissingField {
                field: "subreddit".to_string(),
            });
        }
        if subreddit.contains('/') || subreddit.contains(char::is_whitespace) {
            return Err(ConfigError::InvalidValue {
                field: "subreddit".to_string(),
                value: subreddit,
            });
        }

        if self.interval_secs < MIN_INTERVAL_SECS {
            return Err(ConfigError::InvalidValue {
                field: "interval".to_string(),
                value: self.interval_secs.to_string(),
            });
        }

        if self.rules.is_empty() {
            return Err(ConfigError::ValidationFailed {
                reason: "at least one of post, have or want phrases is required".to_string(),
            });
        }

        Ok(MatchConfig {
            subreddit,
            rules: self.rules,
            interval_secs: self.interval_secs,
        })
    }
}
