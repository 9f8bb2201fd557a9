use clap::Parser;
use subwatch_core::{ConfigError, MatchConfig, DEFAULT_INTERVAL_SECS};

/// Push a Pushbullet link for every new Reddit post whose title matches.
///
/// Reddit and Pushbullet credentials are read from the environment (or a
/// `.env` file): REDDIT_USERNAME, REDDIT_PASSWORD, REDDIT_CLIENT_ID,
/// REDDIT_SECRET and PUSHBULLET_ACCESS_TOKEN.
#[derive(Parser, Debug)]
#[command(name = "subwatch", version, about, long_about)]
pub struct Cli {
    /// Subreddit you want to match within
    #[arg(short, long)]
    pub subreddit: String,

    /// Comma-separated phrases matched against the entire post title
    #[arg(short, long)]
    pub post: Option<String>,

    /// Comma-separated phrases matched against the [H] part of marketplace titles
    #[arg(long)]
    pub have: Option<String>,

    /// Comma-separated phrases matched against the [W] part of marketplace titles
    #[arg(long)]
    pub want: Option<String>,

    /// Seconds between checks for new posts (minimum 1)
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_INTERVAL_SECS,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub interval: u64,
}

impl Cli {
    pub fn match_config(&self) -> Result<MatchConfig, ConfigError> {
        let mut builder = MatchConfig::builder(&self.subreddit).interval_secs(self.interval);
        if let Some(post) = &self.post {
            builder = builder.post(post);
        }
        if let Some(have) = &self.have {
            builder = builder.have(have);
        }
        if let Some(want) = &self.want {
            builder = builder.want(want);
        }
        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parses_marketplace_query() {
        let cli = Cli::try_parse_from([
            "subwatch",
            "--subreddit",
            "hardwareswap",
            "--have",
            "3080,3090",
            "--want",
            "PayPal",
            "-i",
            "30",
        ])
        .unwrap();

        let config = cli.match_config().unwrap();
        assert_eq!(config.subreddit(), "hardwareswap");
        assert_eq!(config.interval_secs(), 30);
        assert_eq!(config.rules().have(), ["3080", "3090"]);
        assert_eq!(config.rules().want(), ["paypal"]);
    }

    #[test]
    fn test_interval_defaults_to_five_seconds() {
        let cli = Cli::try_parse_from(["subwatch", "-s", "mechmarket", "-p", "gmk"]).unwrap();
        assert_eq!(cli.interval, 5);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let err = Cli::try_parse_from(["subwatch", "-s", "mechmarket", "-p", "gmk", "-i", "0"])
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_requires_a_phrase_set() {
        let cli = Cli::try_parse_from(["subwatch", "-s", "mechmarket"]).unwrap();
        assert!(matches!(
            cli.match_config(),
            Err(ConfigError::ValidationFailed { .. })
        ));
    }

    #[test]
    fn test_requires_subreddit() {
        let err = Cli::try_parse_from(["subwatch", "-p", "gmk"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }
}
