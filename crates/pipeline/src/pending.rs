use std::future::Future;
use std::sync::{Mutex, PoisonError};

use tokio::task::JoinSet;

/// Tracks background work the pipeline has dispatched: classification
/// lookups and manual report submissions.
///
/// The pipeline never blocks on these itself; the tracker exists so a
/// shutdown (or a test) can drain them deterministically instead of
/// racing spawned tasks.
#[derive(Default)]
pub struct PendingWork {
    tasks: Mutex<JoinSet<()>>,
}

impl PendingWork {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&self, fut: impl Future<Output = ()> + Send + 'static) {
        self.tasks.lock().unwrap_or_else(PoisonError::into_inner).spawn(fut);
    }

    /// Await every task dispatched so far, including any spawned while
    /// draining.
    pub async fn drain(&self) {
        loop {
            let mut batch =
                std::mem::take(&mut *self.tasks.lock().unwrap_or_else(PoisonError::into_inner));
            if batch.is_empty() {
                return;
            }
            while batch.join_next().await.is_some() {}
        }
    }
}
