use std::sync::Arc;
use std::time::Duration;

use quietfeed_core::{ControlState, FeedAdapter, PostId};
use quietfeed_gateway::Gateway;

use crate::applier::Applier;

/// Per-post manual report button.
///
/// State machine: `Idle → Submitting → {Success, Failed}`, with
/// `Failed → Idle` after a fixed cooldown. A successful report applies
/// moderation locally right away instead of paying for a follow-up
/// lookup.
pub struct ReportControl<A: FeedAdapter> {
    adapter: Arc<A>,
    gateway: Arc<Gateway>,
    applier: Arc<Applier<A>>,
    cooldown: Duration,
}

impl<A: FeedAdapter> ReportControl<A> {
    pub fn new(
        adapter: Arc<A>,
        gateway: Arc<Gateway>,
        applier: Arc<Applier<A>>,
        cooldown: Duration,
    ) -> Self {
        Self { adapter, gateway, applier, cooldown }
    }

    /// Install the control on a post with no known verdict, idle and
    /// enabled. Installing twice is a no-op.
    pub fn attach(&self, id: &PostId) {
        let Some(node) = self.adapter.find_post(id) else { return };
        self.adapter.attach_control(&node);
    }

    /// Drive one report submission through the state machine.
    ///
    /// Ignored unless the control is currently `Idle`, so a double
    /// click cannot issue two reports.
    pub async fn submit(&self, id: &PostId) {
        {
            let Some(node) = self.adapter.find_post(id) else { return };
            match self.adapter.control_state(&node) {
                Some(ControlState::Idle) => {}
                other => {
                    tracing::debug!(%id, state = ?other, "report ignored, control not idle");
                    return;
                }
            }
            self.adapter.set_control_state(&node, ControlState::Submitting);
        }

        match self.gateway.report(id).await {
            Ok(_ack) => {
                tracing::info!(%id, "post reported");
                if let Some(node) = self.adapter.find_post(id) {
                    self.adapter.set_control_state(&node, ControlState::Success);
                    self.adapter.remove_control(&node);
                }
                self.applier.apply(id).await;
            }
            Err(e) => {
                tracing::warn!(%id, error = %e, "report failed");
                if let Some(node) = self.adapter.find_post(id) {
                    self.adapter.set_control_state(&node, ControlState::Failed);
                }
                tokio::time::sleep(self.cooldown).await;
                if let Some(node) = self.adapter.find_post(id) {
                    if self.adapter.control_state(&node) == Some(ControlState::Failed) {
                        self.adapter.set_control_state(&node, ControlState::Idle);
                    }
                }
            }
        }
    }
}
