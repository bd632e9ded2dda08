use std::sync::{Arc, Mutex, PoisonError};

use quietfeed_core::{ApplyMode, FeedAdapter, Marker, ModerationState, ModeratorConfig, PostId};
use quietfeed_storage::DecisionCache;

/// What an apply attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// Transformation performed and the decision recorded.
    Applied,
    /// The element already carries a marker; nothing to do.
    AlreadyApplied,
    /// No element for this id is rendered right now; nothing to do.
    Missing,
}

/// Applies the configured moderation transformation to a post and
/// records the decision durably.
///
/// Idempotent by construction: the element marker guards re-application
/// and the decision set guards re-persisting. An apply for an id whose
/// element has vanished is a silent no-op.
pub struct Applier<A: FeedAdapter> {
    adapter: Arc<A>,
    state: Arc<Mutex<ModerationState>>,
    cache: Arc<DecisionCache>,
    config: ModeratorConfig,
    /// Serializes persists so concurrent applies cannot overwrite a
    /// newer decision set with an older snapshot.
    persist_lock: tokio::sync::Mutex<()>,
}

impl<A: FeedAdapter> Applier<A> {
    pub fn new(
        adapter: Arc<A>,
        state: Arc<Mutex<ModerationState>>,
        cache: Arc<DecisionCache>,
        config: ModeratorConfig,
    ) -> Self {
        Self { adapter, state, cache, config, persist_lock: tokio::sync::Mutex::new(()) }
    }

    /// Apply the configured transformation to the post identified by
    /// `id`, re-deriving the element handle first.
    pub async fn apply(&self, id: &PostId) -> ApplyOutcome {
        let Some(node) = self.adapter.find_post(id) else {
            tracing::debug!(%id, "apply skipped, post not rendered");
            return ApplyOutcome::Missing;
        };
        if self.adapter.marker(&node).is_some() {
            return ApplyOutcome::AlreadyApplied;
        }
        self.adapter.set_marker(&node, Marker::Moderated);

        match self.config.mode {
            ApplyMode::Collapse => {
                self.adapter.snapshot(&node);
                for region in self.adapter.regions_to_hide(&node) {
                    self.adapter.set_hidden(&region, true);
                }
                self.adapter.insert_banner(&node, &self.config.banner_text);
            }
            ApplyMode::Remove => {
                self.adapter.begin_fade(&node);
                tokio::time::sleep(self.config.fade).await;
                // The handle may have gone stale during the fade.
                if let Some(node) = self.adapter.find_post(id) {
                    self.adapter.detach(&node);
                }
            }
        }

        self.record(id).await;
        ApplyOutcome::Applied
    }

    /// Presentation-only restore of a collapsed post. The durable
    /// decision stays; the `Revealed` marker keeps the element from
    /// re-collapsing while it survives.
    pub fn reveal(&self, id: &PostId) {
        let Some(node) = self.adapter.find_post(id) else {
            tracing::debug!(%id, "reveal skipped, post not rendered");
            return;
        };
        self.adapter.restore(&node);
        self.adapter.set_marker(&node, Marker::Revealed);
        tracing::info!(%id, "post revealed by user");
    }

    /// Record the decision and persist it immediately. A persist
    /// failure is logged, not propagated: the visual state is already
    /// applied and the next successful apply will persist the full set.
    async fn record(&self, id: &PostId) {
        let is_new = {
            let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
            state.mark_decided(id.clone())
        };
        if !is_new {
            return;
        }
        let _guard = self.persist_lock.lock().await;
        let snapshot =
            self.state.lock().unwrap_or_else(PoisonError::into_inner).decided().clone();
        match self.cache.persist(&snapshot).await {
            Ok(()) => tracing::info!(%id, mode = ?self.config.mode, "moderation decision recorded"),
            Err(e) => tracing::warn!(%id, error = %e, "failed to persist decision"),
        }
    }
}
