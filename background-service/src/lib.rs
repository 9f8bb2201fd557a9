//! Polling and push delivery.
//!
//! - [`BackgroundService`]: authenticates once, then runs fetch → select →
//!   match → notify cycles on a fixed interval
//! - [`Notifier`]: sends one push per match, isolating per-item failures
//! - [`PushbulletChannel`]: link pushes to every device of a Pushbullet account

pub mod notifier;
pub mod pushbullet;
pub mod service;

pub use notifier::{DispatchReport, LinkPush, Notifier, PushChannel};
pub use pushbullet::PushbulletChannel;
pub use service::{BackgroundService, CycleOutcome, PostSource, SessionProvider};
