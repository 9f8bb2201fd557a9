mod cli;

use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use background_service::{BackgroundService, Notifier, PushbulletChannel};
use clap::error::ErrorKind;
use clap::Parser;
use cli::Cli;
use reddit_client::{RedditClient, RedditCredentials};
use subwatch_core::ErrorExt;

const DEFAULT_LOG_FILTER: &str =
    "subwatch=info,background_service=info,reddit_client=info,subwatch_core=info";

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .init();

    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            e.exit()
        }
        Err(e) => {
            let _ = e.print();
            return ExitCode::FAILURE;
        }
    };

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = cli.match_config().map_err(|e| {
        tracing::error!("{}", e.user_friendly_message());
        e
    })?;

    let credentials = RedditCredentials::from_env().context("Reddit credentials")?;
    let pushbullet = PushbulletChannel::from_env().context("Pushbullet credentials")?;

    let reddit = Arc::new(RedditClient::new(credentials)?);
    let notifier = Notifier::new(Arc::new(pushbullet));

    tracing::info!("Starting subwatch for r/{}", config.subreddit());

    let service = BackgroundService::bootstrap(config, reddit.clone(), reddit, notifier)
        .await
        .map_err(|e| {
            e.log_error();
            e
        })
        .context("could not sign in to Reddit")?;

    service
        .run_until(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!("Failed to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    tracing::info!("subwatch stopped");
    Ok(())
}
