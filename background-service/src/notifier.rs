use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use subwatch_core::{ErrorExt, Match, NotifyError};
use tracing::{debug, error, info};

/// A link push: the post title plus where to read it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkPush {
    pub title: String,
    pub url: String,
}

impl From<&Match> for LinkPush {
    fn from(found: &Match) -> Self {
        Self {
            title: found.title.clone(),
            url: found.url.clone(),
        }
    }
}

/// Trait for push services that deliver links to the user's devices.
#[async_trait]
pub trait PushChannel: Send + Sync {
    fn name(&self) -> &'static str;

    async fn send(&self, push: &LinkPush) -> Result<(), NotifyError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub sent: usize,
    pub failed: usize,
}

impl DispatchReport {
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

pub struct Notifier {
    channel: Arc<dyn PushChannel>,
}

impl Notifier {
    pub fn new(channel: Arc<dyn PushChannel>) -> Self {
        Self { channel }
    }

    /// Push every match in order, one attempt each.
    ///
    /// A failed send is logged and counted; it never stops the rest of the batch.
    pub async fn notify(&self, matches: &[Match]) -> DispatchReport {
        let channel_name = self.channel.name();
        let mut report = DispatchReport::default();

        for found in matches {
            let push = LinkPush::from(found);
            match self.channel.send(&push).await {
                Ok(()) => {
                    debug!(channel = channel_name, url = %push.url, "Notification sent");
                    report.sent += 1;
                }
                Err(e) => {
                    error!(
                        channel = channel_name,
                        url = %push.url,
                        error = %e,
                        code = %e.error_code(),
                        "Failed to send notification"
                    );
                    report.failed += 1;
                }
            }
        }

        info!(
            channel = channel_name,
            sent = report.sent,
            failed = report.failed,
            "Dispatched notifications"
        );
        report
    }
}
