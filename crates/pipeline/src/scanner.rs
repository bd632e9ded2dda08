use std::sync::{Arc, Mutex, PoisonError};

use quietfeed_core::{FeedAdapter, ModerationState, PostId};
use quietfeed_gateway::Gateway;

use crate::applier::Applier;
use crate::control::ReportControl;
use crate::pending::PendingWork;

/// One pass over the rendered feed.
///
/// Partitions every visible post into already-decided (apply inline, no
/// network), already-seen-this-session (skip), or new (claim and
/// dispatch an independent lookup). Scans are cheap and idempotent, so
/// redundant triggers are accepted rather than debounced.
pub struct Scanner<A: FeedAdapter> {
    adapter: Arc<A>,
    gateway: Arc<Gateway>,
    state: Arc<Mutex<ModerationState>>,
    applier: Arc<Applier<A>>,
    control: Arc<ReportControl<A>>,
    pending: Arc<PendingWork>,
}

enum Disposition {
    ApplyDecided,
    Skip,
    Lookup,
}

impl<A: FeedAdapter> Scanner<A> {
    pub fn new(
        adapter: Arc<A>,
        gateway: Arc<Gateway>,
        state: Arc<Mutex<ModerationState>>,
        applier: Arc<Applier<A>>,
        control: Arc<ReportControl<A>>,
        pending: Arc<PendingWork>,
    ) -> Self {
        Self { adapter, gateway, state, applier, control, pending }
    }

    pub async fn scan(&self) {
        for node in self.adapter.post_containers() {
            // Containers without a permalink id are feed chrome, not an
            // error.
            let Some(id) = self.adapter.extract_post_id(&node) else { continue };

            let disposition = {
                let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
                if state.is_decided(&id) {
                    Disposition::ApplyDecided
                } else if !state.begin_check(&id) {
                    Disposition::Skip
                } else {
                    Disposition::Lookup
                }
            };

            match disposition {
                Disposition::ApplyDecided => {
                    self.applier.apply(&id).await;
                }
                Disposition::Skip => {}
                Disposition::Lookup => self.dispatch_lookup(id),
            }
        }
    }

    /// Classify one post in its own task. Failure isolation is per
    /// post: nothing here can block or corrupt another post's path.
    fn dispatch_lookup(&self, id: PostId) {
        let gateway = Arc::clone(&self.gateway);
        let state = Arc::clone(&self.state);
        let applier = Arc::clone(&self.applier);
        let control = Arc::clone(&self.control);

        self.pending.spawn(async move {
            match gateway.lookup(&id).await {
                Ok(true) => {
                    applier.apply(&id).await;
                }
                Ok(false) => {
                    tracing::debug!(%id, "no verdict, attaching report control");
                    control.attach(&id);
                }
                Err(e) => {
                    tracing::warn!(%id, error = %e, "lookup failed, will retry on next scan");
                    state.lock().unwrap_or_else(PoisonError::into_inner).abandon_check(&id);
                }
            }
        });
    }
}
