use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use quietfeed_core::{
    ControlState, FeedAdapter, FeedEvent, Marker, PostId, EVENT_CHANNEL_CAPACITY,
};
use tokio::sync::broadcast;

use crate::post::{PostSnapshot, RegionKind, SimPost, SimRegion};

#[derive(Debug)]
struct SimDoc {
    next_key: u64,
    entries: Vec<SimEntry>,
}

#[derive(Debug)]
struct SimEntry {
    key: u64,
    kind: SimEntryKind,
}

#[derive(Debug)]
enum SimEntryKind {
    Post(SimPost),
    /// Non-post UI chrome; `children` are keys of entries it wraps.
    Chrome { label: String, children: Vec<u64> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Entry(u64),
    Region { post: u64, region: u64 },
}

/// Live handle into the simulated document.
///
/// Cheap to clone; dereferences lazily, so a handle to a detached or
/// replaced entry simply stops resolving, the same way a real host
/// invalidates elements.
#[derive(Clone)]
pub struct SimNode {
    doc: Arc<Mutex<SimDoc>>,
    target: Target,
}

impl fmt::Debug for SimNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimNode").field("target", &self.target).finish()
    }
}

/// In-memory feed document with a broadcast event stream.
pub struct SimFeed {
    doc: Arc<Mutex<SimDoc>>,
    events: broadcast::Sender<FeedEvent<SimNode>>,
}

impl Default for SimFeed {
    fn default() -> Self {
        Self::new()
    }
}

impl SimFeed {
    #[must_use]
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { doc: Arc::new(Mutex::new(SimDoc { next_key: 1, entries: Vec::new() })), events }
    }

    fn lock(&self) -> MutexGuard<'_, SimDoc> {
        self.doc.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn node(&self, target: Target) -> SimNode {
        SimNode { doc: Arc::clone(&self.doc), target }
    }

    fn emit(&self, event: FeedEvent<SimNode>) {
        if self.events.send(event).is_err() {
            tracing::debug!("no feed event subscribers");
        }
    }

    fn insert_post(&self, permalink: &str, kinds: &[RegionKind]) -> u64 {
        let mut doc = self.lock();
        let key = doc.next_key;
        doc.next_key += 1;
        let mut region_key = doc.next_key;
        let post = SimPost::new(permalink, kinds, &mut region_key);
        doc.next_key = region_key;
        doc.entries.push(SimEntry { key, kind: SimEntryKind::Post(post) });
        key
    }

    // ── Mutation helpers (each publishes what a host document would) ──

    /// Append a post and publish the child-list mutation for it.
    pub fn push_post(&self, permalink: &str, kinds: &[RegionKind]) -> SimNode {
        let key = self.insert_post(permalink, kinds);
        let node = self.node(Target::Entry(key));
        self.emit(FeedEvent::ChildList { added: vec![node.clone()] });
        node
    }

    /// Append a post without publishing anything, as if it was already
    /// rendered before the pipeline subscribed.
    pub fn seed_post(&self, permalink: &str, kinds: &[RegionKind]) -> SimNode {
        let key = self.insert_post(permalink, kinds);
        self.node(Target::Entry(key))
    }

    /// Append non-post chrome and publish the mutation.
    pub fn push_chrome(&self, label: &str) -> SimNode {
        let key = {
            let mut doc = self.lock();
            let key = doc.next_key;
            doc.next_key += 1;
            doc.entries.push(SimEntry {
                key,
                kind: SimEntryKind::Chrome { label: label.to_owned(), children: Vec::new() },
            });
            key
        };
        let node = self.node(Target::Entry(key));
        self.emit(FeedEvent::ChildList { added: vec![node.clone()] });
        node
    }

    /// Append a post inside a chrome wrapper; the published mutation
    /// carries only the wrapper node, so subscribers must look inside.
    pub fn push_wrapped_post(&self, permalink: &str, kinds: &[RegionKind]) -> SimNode {
        let post_key = self.insert_post(permalink, kinds);
        let wrapper_key = {
            let mut doc = self.lock();
            let key = doc.next_key;
            doc.next_key += 1;
            doc.entries.push(SimEntry {
                key,
                kind: SimEntryKind::Chrome {
                    label: "cellInnerDiv".to_owned(),
                    children: vec![post_key],
                },
            });
            key
        };
        let node = self.node(Target::Entry(wrapper_key));
        self.emit(FeedEvent::ChildList { added: vec![node.clone()] });
        node
    }

    pub fn touch_attributes(&self) {
        self.emit(FeedEvent::Attributes);
    }

    pub fn scroll(&self) {
        self.emit(FeedEvent::Scroll);
    }

    /// Replace the whole feed, as a single-page-app navigation does.
    pub fn navigate(&self) {
        self.lock().entries.clear();
        self.emit(FeedEvent::Navigation);
    }

    pub fn click_reveal(&self, id: &PostId) {
        self.emit(FeedEvent::Reveal(id.clone()));
    }

    pub fn click_report(&self, id: &PostId) {
        self.emit(FeedEvent::Report(id.clone()));
    }

    /// Number of live event subscribers; lets tests order emissions
    /// after the pipeline has subscribed.
    #[must_use]
    pub fn receiver_count(&self) -> usize {
        self.events.receiver_count()
    }

    // ── Inspection helpers ──

    fn with_post<T>(&self, id: &PostId, f: impl FnOnce(&SimPost) -> T) -> Option<T> {
        let doc = self.lock();
        let post = doc.entries.iter().find_map(|entry| match &entry.kind {
            SimEntryKind::Post(post)
                if PostId::from_permalink(&post.permalink).as_ref() == Some(id) =>
            {
                Some(post)
            }
            _ => None,
        })?;
        Some(f(post))
    }

    /// Whether the post is still attached to the document.
    #[must_use]
    pub fn is_rendered(&self, id: &PostId) -> bool {
        self.with_post(id, |post| !post.detached).unwrap_or(false)
    }

    #[must_use]
    pub fn banner_of(&self, id: &PostId) -> Option<String> {
        self.with_post(id, |post| post.banner.clone()).flatten()
    }

    #[must_use]
    pub fn marker_of(&self, id: &PostId) -> Option<Marker> {
        self.with_post(id, |post| post.marker).flatten()
    }

    #[must_use]
    pub fn control_of(&self, id: &PostId) -> Option<ControlState> {
        self.with_post(id, |post| post.control).flatten()
    }

    #[must_use]
    pub fn is_faded(&self, id: &PostId) -> bool {
        self.with_post(id, |post| post.faded).unwrap_or(false)
    }

    /// Region kinds currently hidden for the post.
    #[must_use]
    pub fn hidden_kinds(&self, id: &PostId) -> Vec<RegionKind> {
        self.with_post(id, |post| {
            post.regions.iter().filter(|r| r.hidden).map(|r| r.kind).collect()
        })
        .unwrap_or_default()
    }

    /// Region kinds currently visible for the post.
    #[must_use]
    pub fn visible_kinds(&self, id: &PostId) -> Vec<RegionKind> {
        self.with_post(id, |post| {
            post.regions.iter().filter(|r| !r.hidden).map(|r| r.kind).collect()
        })
        .unwrap_or_default()
    }
}

fn post_of(doc: &SimDoc, key: u64) -> Option<&SimPost> {
    doc.entries.iter().find(|e| e.key == key).and_then(|entry| match &entry.kind {
        SimEntryKind::Post(post) => Some(post),
        SimEntryKind::Chrome { .. } => None,
    })
}

fn post_of_mut(doc: &mut SimDoc, key: u64) -> Option<&mut SimPost> {
    doc.entries.iter_mut().find(|e| e.key == key).and_then(|entry| match &mut entry.kind {
        SimEntryKind::Post(post) => Some(post),
        SimEntryKind::Chrome { .. } => None,
    })
}

impl SimFeed {
    fn mutate_post(&self, node: &SimNode, f: impl FnOnce(&mut SimPost)) {
        let Target::Entry(key) = node.target else { return };
        let mut doc = self.lock();
        if let Some(post) = post_of_mut(&mut doc, key) {
            f(post);
        }
    }

    fn read_post<T>(&self, node: &SimNode, f: impl FnOnce(&SimPost) -> T) -> Option<T> {
        let Target::Entry(key) = node.target else { return None };
        let doc = self.lock();
        post_of(&doc, key).map(f)
    }
}

impl FeedAdapter for SimFeed {
    type Node = SimNode;

    fn post_containers(&self) -> Vec<SimNode> {
        let doc = self.lock();
        doc.entries
            .iter()
            .filter(|e| matches!(&e.kind, SimEntryKind::Post(post) if !post.detached))
            .map(|e| SimNode { doc: Arc::clone(&self.doc), target: Target::Entry(e.key) })
            .collect()
    }

    fn is_post_container(&self, node: &SimNode) -> bool {
        self.read_post(node, |post| !post.detached).unwrap_or(false)
    }

    fn contains_post(&self, node: &SimNode) -> bool {
        if self.is_post_container(node) {
            return true;
        }
        let Target::Entry(key) = node.target else { return false };
        let doc = self.lock();
        let Some(entry) = doc.entries.iter().find(|e| e.key == key) else { return false };
        match &entry.kind {
            SimEntryKind::Chrome { children, .. } => children
                .iter()
                .any(|&child| post_of(&doc, child).is_some_and(|post| !post.detached)),
            SimEntryKind::Post(_) => false,
        }
    }

    fn extract_post_id(&self, node: &SimNode) -> Option<PostId> {
        self.read_post(node, |post| PostId::from_permalink(&post.permalink)).flatten()
    }

    fn find_post(&self, id: &PostId) -> Option<SimNode> {
        let doc = self.lock();
        doc.entries.iter().find_map(|entry| match &entry.kind {
            SimEntryKind::Post(post)
                if !post.detached
                    && PostId::from_permalink(&post.permalink).as_ref() == Some(id) =>
            {
                Some(SimNode { doc: Arc::clone(&self.doc), target: Target::Entry(entry.key) })
            }
            _ => None,
        })
    }

    fn regions_to_hide(&self, node: &SimNode) -> Vec<SimNode> {
        let Target::Entry(key) = node.target else { return Vec::new() };
        let doc = self.lock();
        let Some(post) = post_of(&doc, key) else { return Vec::new() };
        post.regions
            .iter()
            .filter(|r| r.kind.hidden_by_collapse())
            .map(|r| SimNode {
                doc: Arc::clone(&self.doc),
                target: Target::Region { post: key, region: r.key },
            })
            .collect()
    }

    fn set_hidden(&self, node: &SimNode, hidden: bool) {
        let Target::Region { post, region } = node.target else {
            tracing::debug!(?node, "set_hidden on a non-region node ignored");
            return;
        };
        let mut doc = self.lock();
        if let Some(post) = post_of_mut(&mut doc, post) {
            if let Some(r) = post.regions.iter_mut().find(|r| r.key == region) {
                r.hidden = hidden;
            }
        }
    }

    fn snapshot(&self, node: &SimNode) {
        self.mutate_post(node, |post| {
            post.snapshot =
                Some(PostSnapshot { regions: post.regions.clone(), banner: post.banner.clone() });
        });
    }

    fn restore(&self, node: &SimNode) {
        self.mutate_post(node, |post| {
            if let Some(snapshot) = post.snapshot.take() {
                post.regions = snapshot.regions;
                post.banner = snapshot.banner;
                post.faded = false;
            }
        });
    }

    fn insert_banner(&self, node: &SimNode, text: &str) {
        self.mutate_post(node, |post| post.banner = Some(text.to_owned()));
    }

    fn begin_fade(&self, node: &SimNode) {
        self.mutate_post(node, |post| post.faded = true);
    }

    fn detach(&self, node: &SimNode) {
        self.mutate_post(node, |post| post.detached = true);
    }

    fn marker(&self, node: &SimNode) -> Option<Marker> {
        self.read_post(node, |post| post.marker).flatten()
    }

    fn set_marker(&self, node: &SimNode, marker: Marker) {
        self.mutate_post(node, |post| post.marker = Some(marker));
    }

    fn attach_control(&self, node: &SimNode) {
        self.mutate_post(node, |post| {
            if post.control.is_none() {
                post.control = Some(ControlState::Idle);
            }
        });
    }

    fn control_state(&self, node: &SimNode) -> Option<ControlState> {
        self.read_post(node, |post| post.control).flatten()
    }

    fn set_control_state(&self, node: &SimNode, state: ControlState) {
        self.mutate_post(node, |post| post.control = Some(state));
    }

    fn remove_control(&self, node: &SimNode) {
        self.mutate_post(node, |post| post.control = None);
    }

    fn subscribe(&self) -> broadcast::Receiver<FeedEvent<SimNode>> {
        self.events.subscribe()
    }
}
