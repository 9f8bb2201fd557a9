use tracing::debug;

use crate::error_utils::ErrorExt;
use crate::matcher::{matches, RuleSets};
use crate::types::{Match, Post, RawPost};

/// Keeps the posts created within `interval_secs` of `now_ms`, inclusive.
///
/// `now_ms` should be taken once, before the fetch, and reused for the whole
/// batch. Entries that cannot be read as a post are logged and skipped.
pub fn select_recent(posts: &[RawPost], now_ms: i64, interval_secs: u64) -> Vec<Post> {
    let interval_ms = i64::try_from(interval_secs)
        .unwrap_or(i64::MAX)
        .saturating_mul(1000);
    let cutoff_ms = now_ms.saturating_sub(interval_ms);

    posts
        .iter()
        .filter_map(|raw| match raw.to_post() {
            Ok(post) => Some(post),
            Err(e) => {
                e.log_warn();
                debug!("Skipped listing child: {}", raw.0);
                None
            }
        })
        .filter(|post| is_recent(post, cutoff_ms))
        .collect()
}

fn is_recent(post: &Post, cutoff_ms: i64) -> bool {
    post.created_ms >= cutoff_ms
}

/// Turns the posts whose titles satisfy `rules` into matches, in input order.
pub fn find_matches(posts: &[Post], rules: &RuleSets, web_base: &str) -> Vec<Match> {
    posts
        .iter()
        .filter(|post| matches(rules, &post.title))
        .map(|post| {
            debug!("Post matched: {}", post.title);
            Match::from_post(post, web_base)
        })
        .collect()
}
