use std::collections::HashSet;

use crate::PostId;

/// Session-plus-durable moderation bookkeeping, constructed at startup and
/// threaded through the scanner and applier explicitly.
///
/// `session_seen` records ids with a check in flight or an inconclusive
/// verdict this session; it dies with the pipeline instance. `decided`
/// mirrors the durable store and is the set that must never trigger a
/// network lookup again.
#[derive(Debug, Default)]
pub struct ModerationState {
    session_seen: HashSet<PostId>,
    decided: HashSet<PostId>,
}

impl ModerationState {
    /// Build state around the decision set loaded from the durable store.
    #[must_use]
    pub fn new(decided: HashSet<PostId>) -> Self {
        Self { session_seen: HashSet::new(), decided }
    }

    #[must_use]
    pub fn is_decided(&self, id: &PostId) -> bool {
        self.decided.contains(id)
    }

    /// Record a terminal decision. Returns `true` if the id was new.
    pub fn mark_decided(&mut self, id: PostId) -> bool {
        self.decided.insert(id)
    }

    #[must_use]
    pub fn decided(&self) -> &HashSet<PostId> {
        &self.decided
    }

    /// Claim an id for a classification check.
    ///
    /// Returns `false` if the id was already claimed this session, in
    /// which case the caller must not dispatch another lookup.
    pub fn begin_check(&mut self, id: &PostId) -> bool {
        self.session_seen.insert(id.clone())
    }

    /// Release an id whose check failed at the transport, so the next
    /// scan trigger retries it.
    pub fn abandon_check(&mut self, id: &PostId) {
        self.session_seen.remove(id);
    }

    #[must_use]
    pub fn seen_this_session(&self, id: &PostId) -> bool {
        self.session_seen.contains(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_check_claims_once() {
        let mut state = ModerationState::default();
        let id = PostId::from("1");
        assert!(state.begin_check(&id));
        assert!(!state.begin_check(&id));
    }

    #[test]
    fn test_abandon_check_allows_retry() {
        let mut state = ModerationState::default();
        let id = PostId::from("1");
        assert!(state.begin_check(&id));
        assert!(state.seen_this_session(&id));
        state.abandon_check(&id);
        assert!(!state.seen_this_session(&id));
        assert!(state.begin_check(&id));
    }

    #[test]
    fn test_preloaded_decisions() {
        let state = ModerationState::new(HashSet::from([PostId::from("5")]));
        assert!(state.is_decided(&PostId::from("5")));
        assert!(!state.is_decided(&PostId::from("6")));
    }

    #[test]
    fn test_mark_decided_reports_novelty() {
        let mut state = ModerationState::default();
        assert!(state.mark_decided(PostId::from("9")));
        assert!(!state.mark_decided(PostId::from("9")));
    }
}
