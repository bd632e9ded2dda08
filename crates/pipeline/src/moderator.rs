use std::sync::{Arc, Mutex};

use quietfeed_core::{FeedAdapter, ModerationState, ModeratorConfig};
use quietfeed_gateway::{Gateway, Transport};
use quietfeed_storage::{DecisionCache, KvStore};

use crate::applier::Applier;
use crate::control::ReportControl;
use crate::pending::PendingWork;
use crate::scanner::Scanner;
use crate::watcher::Watcher;

/// The assembled pipeline: one instance per page lifetime.
///
/// Construction loads the durable decision set; [`run`](Self::run)
/// drives the watcher until the host closes its event stream. All
/// state is built here and threaded through the components explicitly.
pub struct Moderator<A: FeedAdapter> {
    scanner: Arc<Scanner<A>>,
    watcher: Watcher<A>,
    applier: Arc<Applier<A>>,
    control: Arc<ReportControl<A>>,
    pending: Arc<PendingWork>,
}

impl<A: FeedAdapter> Moderator<A> {
    /// Build the pipeline over an adapter, a transport, and a durable
    /// store.
    ///
    /// # Errors
    /// Returns an error if the durable store cannot be read at all;
    /// a readable-but-corrupt decision set degrades to empty instead.
    pub async fn new(
        adapter: Arc<A>,
        transport: Arc<dyn Transport>,
        store: Arc<dyn KvStore>,
        config: ModeratorConfig,
    ) -> anyhow::Result<Self> {
        let cache = Arc::new(DecisionCache::new(store, config.mode));
        let decided = cache.load().await?;
        tracing::info!(count = decided.len(), key = cache.key(), "loaded durable decisions");

        let state = Arc::new(Mutex::new(ModerationState::new(decided)));
        let gateway = Arc::new(Gateway::new(transport));
        let applier = Arc::new(Applier::new(
            Arc::clone(&adapter),
            Arc::clone(&state),
            cache,
            config.clone(),
        ));
        let control = Arc::new(ReportControl::new(
            Arc::clone(&adapter),
            Arc::clone(&gateway),
            Arc::clone(&applier),
            config.control_cooldown,
        ));
        let pending = Arc::new(PendingWork::new());
        let scanner = Arc::new(Scanner::new(
            Arc::clone(&adapter),
            gateway,
            state,
            Arc::clone(&applier),
            Arc::clone(&control),
            Arc::clone(&pending),
        ));
        let watcher = Watcher::new(
            adapter,
            Arc::clone(&scanner),
            Arc::clone(&applier),
            Arc::clone(&control),
            Arc::clone(&pending),
            config.feed_poll,
        );

        Ok(Self { scanner, watcher, applier, control, pending })
    }

    /// Watch the feed until the host closes its event stream.
    pub async fn run(&self) {
        self.watcher.run().await;
    }

    /// Trigger a single scan pass directly.
    pub async fn scan(&self) {
        self.scanner.scan().await;
    }

    /// Await all dispatched lookups and report submissions.
    pub async fn drain_pending(&self) {
        self.pending.drain().await;
    }

    #[must_use]
    pub fn applier(&self) -> &Applier<A> {
        &self.applier
    }

    #[must_use]
    pub fn control(&self) -> &ReportControl<A> {
        &self.control
    }
}
