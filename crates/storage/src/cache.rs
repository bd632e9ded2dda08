use std::collections::HashSet;
use std::sync::Arc;

use quietfeed_core::{ApplyMode, PostId};

use crate::error::Result;
use crate::kv::KvStore;

/// Storage key for decisions applied as collapses.
pub const COLLAPSED_IDS_KEY: &str = "collapsedTweetIds";
/// Storage key for decisions applied as removals.
pub const REMOVED_IDS_KEY: &str = "removedTweetIds";

/// Durable record of which posts already received a terminal moderation
/// outcome.
///
/// Loaded once at initialization and written through on every new
/// decision, not batched, so a crash or navigation right after an apply
/// does not lose it. Entries are never deleted.
pub struct DecisionCache {
    store: Arc<dyn KvStore>,
    key: &'static str,
}

impl DecisionCache {
    #[must_use]
    pub fn new(store: Arc<dyn KvStore>, mode: ApplyMode) -> Self {
        let key = match mode {
            ApplyMode::Collapse => COLLAPSED_IDS_KEY,
            ApplyMode::Remove => REMOVED_IDS_KEY,
        };
        Self { store, key }
    }

    /// Load the persisted decision set.
    ///
    /// A missing key is an empty set; a corrupt value is logged and
    /// treated as empty rather than poisoning startup.
    pub async fn load(&self) -> Result<HashSet<PostId>> {
        let Some(raw) = self.store.get(self.key).await? else {
            return Ok(HashSet::new());
        };
        match serde_json::from_str::<Vec<PostId>>(&raw) {
            Ok(ids) => Ok(ids.into_iter().collect()),
            Err(e) => {
                tracing::warn!(key = self.key, error = %e, "corrupt decision set, starting empty");
                Ok(HashSet::new())
            }
        }
    }

    /// Write the full decision set back under this cache's key.
    ///
    /// Ids are sorted so repeated persists of the same set produce
    /// identical stored bytes.
    pub async fn persist(&self, decided: &HashSet<PostId>) -> Result<()> {
        let mut ids: Vec<&PostId> = decided.iter().collect();
        ids.sort();
        let value = serde_json::to_string(&ids)?;
        self.store.set(self.key, &value).await
    }

    #[must_use]
    pub fn key(&self) -> &'static str {
        self.key
    }
}
