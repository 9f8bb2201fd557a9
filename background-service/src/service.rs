use async_trait::async_trait;
use chrono::Utc;
use reddit_client::RedditClient;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use subwatch_core::{
    find_matches, select_recent, CoreError, ErrorExt, MatchConfig, RawPost,
    Session, REDDIT_WEB_BASE,
};
use tokio::sync::RwLock;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::notifier::{DispatchReport, Notifier};

/// Produces a fresh [`Session`].
#[async_trait]
pub trait SessionProvider: Send + Sync {
    async fn authenticate(&self) -> Result<Session, CoreError>;
}

/// Returns the newest posts of a subreddit, uninterpreted.
#[async_trait]
pub trait PostSource: Send + Sync {
    async fn fetch_new(&self, session: &Session, subreddit: &str)
        -> Result<Vec<RawPost>, CoreError>;
}

#[async_trait]
impl SessionProvider for RedditClient {
    async fn authenticate(&self) -> Result<Session, CoreError> {
        RedditClient::authenticate(self).await
    }
}

#[async_trait]
impl PostSource for RedditClient {
    async fn fetch_new(
        &self,
        session: &Session,
        subreddit: &str,
    ) -> Result<Vec<RawPost>, CoreError> {
        RedditClient::fetch_new(self, session, subreddit).await
    }
}

/// How a single polling cycle ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Another cycle was still running.
    Skipped,
    /// The listing came back empty.
    NoPosts,
    /// Posts were fetched but none was both recent and matching.
    NoMatches { fetched: usize, recent: usize },
    Notified {
        matches: usize,
        report: DispatchReport,
    },
    /// The cycle stopped on an error; `code` is its [`ErrorExt::error_code`].
    Failed { code: String },
}

/// Clears the in-progress flag when the cycle ends, however it ends.
struct CycleGuard<'a>(&'a AtomicBool);

impl<'a> CycleGuard<'a> {
    fn try_acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for CycleGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

pub struct BackgroundService {
    config: MatchConfig,
    auth: Arc<dyn SessionProvider>,
    source: Arc<dyn PostSource>,
    notifier: Notifier,
    session: RwLock<Session>,
    cycle_in_progress: AtomicBool,
    web_base: String,
}

impl BackgroundService {
    /// Authenticate once and return a service ready to poll.
    ///
    /// An authentication failure is returned as-is; no cycle can run without a session.
    pub async fn bootstrap(
        config: MatchConfig,
        auth: Arc<dyn SessionProvider>,
        source: Arc<dyn PostSource>,
        notifier: Notifier,
    ) -> Result<Self, CoreError> {
        let session = auth.authenticate().await?;
        info!(
            subreddit = config.subreddit(),
            interval_secs = config.interval_secs(),
            "Authenticated, ready to poll"
        );

        Ok(Self {
            config,
            auth,
            source,
            notifier,
            session: RwLock::new(session),
            cycle_in_progress: AtomicBool::new(false),
            web_base: REDDIT_WEB_BASE.to_string(),
        })
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Replace the current session with a freshly authenticated one.
    pub async fn reauthenticate(&self) -> Result<(), CoreError> {
        let session = self.auth.authenticate().await?;
        *self.session.write().await = session;
        info!("Session refreshed");
        Ok(())
    }

    /// Run one fetch → select → match → notify pass.
    ///
    /// Never fails: errors are logged and reported through the outcome.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let Some(_guard) = CycleGuard::try_acquire(&self.cycle_in_progress) else {
            warn!("Previous cycle still running, skipping this one");
            return CycleOutcome::Skipped;
        };

        match self.poll().await {
            Ok(outcome) => outcome,
            Err(e) => {
                e.log_error();
                error!(code = %e.error_code(), "Cycle failed: {}", e.user_friendly_message());
                CycleOutcome::Failed {
                    code: e.error_code(),
                }
            }
        }
    }

    async fn poll(&self) -> Result<CycleOutcome, CoreError> {
        let subreddit = self.config.subreddit();
        let now_ms = Utc::now().timestamp_millis();

        let posts = {
            let session = self.session.read().await;
            self.source.fetch_new(&session, subreddit).await?
        };

        if posts.is_empty() {
            debug!("No posts in r/{}", subreddit);
            return Ok(CycleOutcome::NoPosts);
        }

        let recent = select_recent(&posts, now_ms, self.config.interval_secs());
        let matches = find_matches(&recent, self.config.rules(), &self.web_base);

        if matches.is_empty() {
            debug!(
                fetched = posts.len(),
                recent = recent.len(),
                "No matching posts in r/{}",
                subreddit
            );
            return Ok(CycleOutcome::NoMatches {
                fetched: posts.len(),
                recent: recent.len(),
            });
        }

        info!("Found {} matching posts in r/{}", matches.len(), subreddit);
        let report = self.notifier.notify(&matches).await;

        Ok(CycleOutcome::Notified {
            matches: matches.len(),
            report,
        })
    }

    /// Run a cycle now, then every interval, until `shutdown` resolves.
    pub async fn run_until<F>(&self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        let mut timer = interval(self.config.interval());
        timer.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tokio::pin!(shutdown);

        info!(
            "Watching r/{} every {}s",
            self.config.subreddit(),
            self.config.interval_secs()
        );

        loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!("Shutdown requested, stopping");
                    break;
                }
                // The first tick completes immediately.
                _ = timer.tick() => {
                    let outcome = self.run_cycle().await;
                    debug!(?outcome, "Cycle finished");
                }
            }
        }
    }

    /// Poll until the process exits.
    pub async fn run(&self) {
        self.run_until(std::future::pending()).await
    }
}
