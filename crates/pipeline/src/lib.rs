//! Feed-moderation pipeline for quietfeed
//!
//! Composes the scanner, change watcher, moderation applier, and manual
//! report control over a [`FeedAdapter`](quietfeed_core::FeedAdapter),
//! a [`Transport`](quietfeed_gateway::Transport), and a durable
//! [`KvStore`](quietfeed_storage::KvStore). Everything is best-effort
//! and idempotent: a failed step degrades to "try again on the next
//! scan trigger", never to an inconsistent feed.

mod applier;
mod control;
mod moderator;
mod pending;
mod scanner;
mod watcher;

pub use applier::{Applier, ApplyOutcome};
pub use control::ReportControl;
pub use moderator::Moderator;
pub use pending::PendingWork;
pub use scanner::Scanner;
pub use watcher::Watcher;
