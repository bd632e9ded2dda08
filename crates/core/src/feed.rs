use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::PostId;

/// How a flagged post is transformed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplyMode {
    /// Replace the rendered content with a banner plus a reveal
    /// affordance; the original markup is preserved for restore.
    Collapse,
    /// Fade the post out, then detach it from the document.
    Remove,
}

impl std::str::FromStr for ApplyMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "collapse" => Ok(Self::Collapse),
            "remove" => Ok(Self::Remove),
            _ => Err(format!("invalid apply mode: {s}")),
        }
    }
}

/// Per-element moderation state, recorded on the node itself.
///
/// Any marker makes a subsequent apply a no-op. `Revealed` keeps a post
/// the user restored from re-collapsing while the element survives; the
/// durable decision stays untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    Moderated,
    Revealed,
}

/// Visual state of the per-post manual report control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlState {
    Idle,
    Submitting,
    Success,
    Failed,
}

/// Events a host document publishes to the pipeline.
///
/// Structural events drive re-scans; `Reveal` and `Report` carry user
/// interactions back from affordances the pipeline installed.
#[derive(Debug, Clone)]
pub enum FeedEvent<N> {
    /// Nodes were added to the document.
    ChildList { added: Vec<N> },
    /// An attribute changed somewhere in the feed subtree.
    Attributes,
    Scroll,
    /// Single-page-app navigation (history push/replace/pop). The host
    /// replaces feed content without a full reload, so subscribers must
    /// re-initialize.
    Navigation,
    /// User clicked the reveal affordance on a collapsed post.
    Reveal(PostId),
    /// User clicked the manual report control.
    Report(PostId),
}

/// Capability seam between the pipeline and a concrete feed document.
///
/// `Node` is a live handle owned by the host; it may be destroyed and
/// recreated at any time, so identity must always be re-derived from
/// `PostId` via [`find_post`](FeedAdapter::find_post) rather than cached
/// across suspension points. All mutation methods are presentation-only
/// except [`detach`](FeedAdapter::detach).
pub trait FeedAdapter: Send + Sync + 'static {
    type Node: Clone + Send + Sync + 'static;

    // Structure
    /// Currently-rendered post containers, in document order.
    fn post_containers(&self) -> Vec<Self::Node>;
    fn is_post_container(&self, node: &Self::Node) -> bool;
    /// Whether `node` matches or contains a post container.
    fn contains_post(&self, node: &Self::Node) -> bool;
    /// Extract the post identity from the container's permalink.
    /// `None` is an expected miss (non-post chrome), not an error.
    fn extract_post_id(&self, node: &Self::Node) -> Option<PostId>;
    /// Re-derive the live handle for a post, if it is still rendered.
    fn find_post(&self, id: &PostId) -> Option<Self::Node>;

    // Presentation
    /// Regions inside a post that a collapse hides: body text, media,
    /// cards, social context, nested and quoted sub-posts.
    fn regions_to_hide(&self, node: &Self::Node) -> Vec<Self::Node>;
    fn set_hidden(&self, node: &Self::Node, hidden: bool);
    /// Record the post's current markup so a reveal can restore it
    /// verbatim.
    fn snapshot(&self, node: &Self::Node);
    /// Restore the markup recorded by [`snapshot`](FeedAdapter::snapshot).
    fn restore(&self, node: &Self::Node);
    fn insert_banner(&self, node: &Self::Node, text: &str);
    fn begin_fade(&self, node: &Self::Node);
    fn detach(&self, node: &Self::Node);

    // Markers
    fn marker(&self, node: &Self::Node) -> Option<Marker>;
    fn set_marker(&self, node: &Self::Node, marker: Marker);

    // Manual report control
    /// Install the control on a post, starting in
    /// [`ControlState::Idle`]. Installing twice is a no-op.
    fn attach_control(&self, node: &Self::Node);
    fn control_state(&self, node: &Self::Node) -> Option<ControlState>;
    fn set_control_state(&self, node: &Self::Node, state: ControlState);
    fn remove_control(&self, node: &Self::Node);

    // Events
    /// Subscribe to the host's event stream. Called again after a
    /// navigation, when the previous subtree (and its observers) are
    /// gone.
    fn subscribe(&self) -> broadcast::Receiver<FeedEvent<Self::Node>>;
}
