//! Authenticate with the credentials in the environment and print the newest
//! posts of a subreddit.
//!
//! ```bash
//! REDDIT_USERNAME=... REDDIT_PASSWORD=... REDDIT_CLIENT_ID=... REDDIT_SECRET=... \
//!     cargo run -p reddit-client --example check_credentials -- hardwareswap
//! ```

use reddit_client::{RedditClient, RedditCredentials};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt::init();

    let subreddit = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "hardwareswap".to_string());

    let credentials = RedditCredentials::from_env()?;
    let client = RedditClient::new(credentials)?;

    let session = client.authenticate().await?;
    println!("✅ Authenticated (token type: {})", session.token_type);
    if let Some(expires_at) = session.expires_at {
        println!("   Token expires at {}", expires_at);
    }

    let posts = client.fetch_new(&session, &subreddit).await?;
    println!("\n📋 {} newest posts in r/{}:", posts.len(), subreddit);
    for raw in &posts {
        match raw.to_post() {
            Ok(post) => println!("  [{}] {}", post.created_utc(), post.title),
            Err(e) => println!("  ⚠️  {}", e),
        }
    }

    Ok(())
}
