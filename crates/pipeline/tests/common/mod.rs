//! Shared harness for pipeline integration tests: a scripted remote
//! service and a fast-timing pipeline over the simulated feed.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use quietfeed_core::{FeedPollConfig, ModeratorConfig, PostId};
use quietfeed_gateway::{Ack, RelayRequest, RelayResponse, Transport, TransportError};
use quietfeed_pipeline::Moderator;
use quietfeed_sim::SimFeed;
use quietfeed_storage::{KvStore, MemoryKv};

/// Scripted per-id behavior for the fake service.
#[derive(Debug, Clone, Copy)]
pub enum Script {
    Verdict(bool),
    Fail,
}

/// Transport standing in for the remote service: answers from a script,
/// counts every call, and can delay replies to keep lookups in flight.
#[derive(Default)]
pub struct FakeService {
    scripts: Mutex<HashMap<PostId, Script>>,
    lookups: Mutex<Vec<PostId>>,
    reports: Mutex<Vec<PostId>>,
    fail_reports: Mutex<bool>,
    delay: Mutex<Option<Duration>>,
}

impl FakeService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn script(&self, id: &str, script: Script) {
        self.scripts.lock().unwrap().insert(PostId::from(id), script);
    }

    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn set_fail_reports(&self, fail: bool) {
        *self.fail_reports.lock().unwrap() = fail;
    }

    pub fn lookup_count(&self, id: &str) -> usize {
        let id = PostId::from(id);
        self.lookups.lock().unwrap().iter().filter(|seen| **seen == id).count()
    }

    pub fn total_lookups(&self) -> usize {
        self.lookups.lock().unwrap().len()
    }

    pub fn report_count(&self, id: &str) -> usize {
        let id = PostId::from(id);
        self.reports.lock().unwrap().iter().filter(|seen| **seen == id).count()
    }
}

#[async_trait]
impl Transport for FakeService {
    async fn send(&self, request: RelayRequest) -> Result<RelayResponse, TransportError> {
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match request {
            RelayRequest::Check { id, .. } => {
                self.lookups.lock().unwrap().push(id.clone());
                let script =
                    self.scripts.lock().unwrap().get(&id).copied().unwrap_or(Script::Verdict(false));
                match script {
                    Script::Verdict(verdict) => Ok(RelayResponse::Verdict(verdict)),
                    Script::Fail => Err(TransportError::Relay("service unreachable".to_owned())),
                }
            }
            RelayRequest::Report { id, .. } => {
                self.reports.lock().unwrap().push(id);
                if *self.fail_reports.lock().unwrap() {
                    Err(TransportError::Relay("service unreachable".to_owned()))
                } else {
                    Ok(RelayResponse::Ack(Ack(true)))
                }
            }
        }
    }
}

/// Pipeline config with timings suited to tests.
pub fn fast_config() -> ModeratorConfig {
    ModeratorConfig {
        fade: Duration::ZERO,
        control_cooldown: Duration::from_millis(50),
        feed_poll: FeedPollConfig {
            max_attempts: 10,
            interval: Duration::from_millis(10),
        },
        ..ModeratorConfig::default()
    }
}

pub struct Harness {
    pub feed: Arc<SimFeed>,
    pub service: Arc<FakeService>,
    pub store: Arc<MemoryKv>,
    pub moderator: Arc<Moderator<SimFeed>>,
}

pub async fn build(config: ModeratorConfig) -> Harness {
    build_with(Arc::new(SimFeed::new()), Arc::new(MemoryKv::new()), config).await
}

pub async fn build_with(
    feed: Arc<SimFeed>,
    store: Arc<MemoryKv>,
    config: ModeratorConfig,
) -> Harness {
    let service = Arc::new(FakeService::new());
    let moderator = Moderator::new(
        Arc::clone(&feed),
        Arc::clone(&service) as Arc<dyn Transport>,
        Arc::clone(&store) as Arc<dyn KvStore>,
        config,
    )
    .await
    .unwrap();
    Harness { feed, service, store, moderator: Arc::new(moderator) }
}

/// Poll `cond` until it holds or two seconds pass.
pub async fn wait_until(mut cond: impl FnMut() -> bool) {
    tokio::time::timeout(Duration::from_secs(2), async {
        while !cond() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not met in time");
}

/// The persisted decision set under `key`, or empty if never written.
pub async fn stored_ids(store: &MemoryKv, key: &str) -> Vec<String> {
    match store.get(key).await.unwrap() {
        Some(raw) => serde_json::from_str(&raw).unwrap(),
        None => Vec::new(),
    }
}
