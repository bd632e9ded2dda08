use std::sync::Arc;

use quietfeed_core::{FeedAdapter, FeedEvent, FeedPollConfig};
use tokio::sync::broadcast::error::RecvError;

use crate::applier::Applier;
use crate::control::ReportControl;
use crate::pending::PendingWork;
use crate::scanner::Scanner;

/// Consumes the host document's event stream and keeps the scanner
/// running against it.
///
/// Structural mutations, attribute changes, and scrolls all funnel into
/// `scan()`; user interactions are routed to the applier (reveal) and
/// the report control (submit). A navigation tears the subscription
/// down and re-initializes, since the host replaced the feed subtree
/// without a reload.
pub struct Watcher<A: FeedAdapter> {
    adapter: Arc<A>,
    scanner: Arc<Scanner<A>>,
    applier: Arc<Applier<A>>,
    control: Arc<ReportControl<A>>,
    pending: Arc<PendingWork>,
    poll: FeedPollConfig,
}

impl<A: FeedAdapter> Watcher<A> {
    pub fn new(
        adapter: Arc<A>,
        scanner: Arc<Scanner<A>>,
        applier: Arc<Applier<A>>,
        control: Arc<ReportControl<A>>,
        pending: Arc<PendingWork>,
        poll: FeedPollConfig,
    ) -> Self {
        Self { adapter, scanner, applier, control, pending, poll }
    }

    /// Run until the host closes its event stream.
    pub async fn run(&self) {
        loop {
            let mut events = self.adapter.subscribe();
            self.startup().await;
            if !self.pump(&mut events).await {
                return;
            }
            tracing::debug!("navigation, reinitializing feed subscription");
        }
    }

    /// Wait for the feed to render, then run the initial scan. Gives up
    /// for this navigation if the feed never appears; mutation events
    /// will still trigger scans if it shows up later.
    async fn startup(&self) {
        let mut attempts = 0;
        while self.adapter.post_containers().is_empty() {
            attempts += 1;
            if attempts >= self.poll.max_attempts {
                tracing::warn!(attempts, "feed posts not found, skipping initial scan");
                return;
            }
            tokio::time::sleep(self.poll.interval).await;
        }
        self.scanner.scan().await;
    }

    /// Pump events until a navigation (returns `true`) or channel close
    /// (returns `false`).
    async fn pump(
        &self,
        events: &mut tokio::sync::broadcast::Receiver<FeedEvent<A::Node>>,
    ) -> bool {
        loop {
            match events.recv().await {
                Ok(FeedEvent::ChildList { added }) => {
                    if added.iter().any(|node| self.adapter.contains_post(node)) {
                        self.scanner.scan().await;
                    }
                }
                Ok(FeedEvent::Attributes | FeedEvent::Scroll) => {
                    self.scanner.scan().await;
                }
                Ok(FeedEvent::Navigation) => return true,
                Ok(FeedEvent::Reveal(id)) => self.applier.reveal(&id),
                Ok(FeedEvent::Report(id)) => {
                    let control = Arc::clone(&self.control);
                    // Submission sleeps through its failure cooldown;
                    // keep the event loop responsive meanwhile.
                    self.pending.spawn(async move {
                        control.submit(&id).await;
                    });
                }
                Err(RecvError::Lagged(missed)) => {
                    tracing::warn!(missed, "event stream lagged, rescanning");
                    self.scanner.scan().await;
                }
                Err(RecvError::Closed) => return false,
            }
        }
    }
}
